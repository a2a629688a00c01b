use clap::Parser;
use futures::StreamExt;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error};

use svsi_analyser::narration::{ChannelNarrator, Silent};
use svsi_analyser::render::Console;
use svsi_analyser::{Analysis, AnalyzerConfig, AnalyzerError};

/// Exit status when `--strict` is set and at least one stream is broken
const EXIT_BROKEN_STREAMS: u8 = 2;

/// Verify the continuity of SVSI multicast streams in a pcap capture
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Capture file in classic libpcap format
    capture: PathBuf,

    /// Narrate missing, duplicate and out-of-order packets as they are found
    #[arg(short, long)]
    verbose: bool,

    /// Live progress refresh interval in milliseconds
    #[arg(long, default_value_t = 500)]
    refresh_ms: u64,

    /// Disable coloured output
    #[arg(long)]
    no_color: bool,

    /// Exit with status 2 when any stream is broken
    #[arg(long)]
    strict: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_writer(io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install log subscriber: {e}");
    }

    let args = Args::parse();
    debug!("{:?}", args);

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<ExitCode> {
    let config = AnalyzerConfig::default()
        .with_verbose(args.verbose)
        .with_refresh_interval(Duration::from_millis(args.refresh_ms))
        .with_color(!args.no_color);

    let mut console = Console::new(io::stdout(), config.color);
    console.banner()?;

    if !args.capture.is_file() {
        console.startup_error("The specified file could not be found.")?;
        return Ok(ExitCode::FAILURE);
    }

    console.loading()?;

    let (narrator, mut events) = ChannelNarrator::channel();
    let started = if config.verbose {
        Analysis::open(&args.capture, &config, narrator)
    } else {
        // Closes `events` so its select branch is disabled
        drop(narrator);
        Analysis::open(&args.capture, &config, Silent)
    };

    let mut analysis = match started {
        Ok(analysis) => analysis,
        Err(e) => {
            console.startup_error(&e.to_string())?;
            print_suggestions(&e);
            return Ok(ExitCode::FAILURE);
        }
    };

    let progress = analysis.progress();
    tokio::pin!(progress);
    let finish = analysis.finish();
    tokio::pin!(finish);

    let outcome = loop {
        tokio::select! {
            biased;
            Some(event) = events.recv() => console.narrate(&event)?,
            Some(snapshot) = progress.next() => console.progress(snapshot)?,
            outcome = &mut finish => break outcome,
        }
    };

    while let Ok(event) = events.try_recv() {
        console.narrate(&event)?;
    }

    match outcome {
        Ok(snapshot) => {
            console.final_report(&snapshot)?;
            if args.strict && !snapshot.stats.all_ok() {
                Ok(ExitCode::from(EXIT_BROKEN_STREAMS))
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
        Err(e) => {
            console.fatal(&e)?;
            print_suggestions(&e);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_suggestions(error: &AnalyzerError) {
    for suggestion in error.recovery_suggestions() {
        eprintln!("  - {suggestion}");
    }
}
