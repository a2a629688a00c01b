//! Terminal rendering for live progress and the final report
//!
//! The progress block is two lines long and is redrawn in place: before each
//! redraw the cursor moves back up over the previous block and clears it.
//! Narrated events are printed above the block, which is then redrawn below
//! them.

use crossterm::cursor::{MoveToColumn, MoveUp};
use crossterm::queue;
use crossterm::style::{Color, Print, Stylize};
use crossterm::terminal::{Clear, ClearType};
use std::io::{self, Write};
use std::sync::Arc;

use crate::AnalyzerError;
use crate::narration::StreamEvent;
use crate::report::Snapshot;

/// Height of the progress block in lines
const PROGRESS_LINES: u16 = 2;

/// Colour-aware writer for the command-line tool
pub struct Console<W: Write> {
    out: W,
    color: bool,
    progress_drawn: bool,
    last_progress: Option<Arc<Snapshot>>,
}

impl<W: Write> Console<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color, progress_drawn: false, last_progress: None }
    }

    /// Startup banner
    pub fn banner(&mut self) -> io::Result<()> {
        let line = self.paint("# Welcome to the SVSI analyser.", Color::Blue);
        writeln!(self.out, "{line}")?;
        self.out.flush()
    }

    /// Announces that the capture is being read
    pub fn loading(&mut self) -> io::Result<()> {
        let line = self.paint("Loading PCAP file...", Color::Blue);
        writeln!(self.out, "\n{line}\n")?;
        self.out.flush()
    }

    /// Redraw the progress block from `snapshot`
    pub fn progress(&mut self, snapshot: Arc<Snapshot>) -> io::Result<()> {
        self.last_progress = Some(snapshot);
        self.clear_progress()?;
        self.draw_progress()
    }

    /// Print one narrated event above the progress block
    pub fn narrate(&mut self, event: &StreamEvent) -> io::Result<()> {
        self.clear_progress()?;
        let line = self.paint(&event.to_string(), Color::Red);
        writeln!(self.out, "{line}")?;
        self.draw_progress()
    }

    /// Final progress block followed by one verdict line per stream
    pub fn final_report(&mut self, snapshot: &Arc<Snapshot>) -> io::Result<()> {
        self.progress(Arc::clone(snapshot))?;
        writeln!(self.out)?;

        for summary in snapshot.final_report() {
            let color = if summary.healthy { Color::Green } else { Color::Red };
            let line = self.paint(&summary.to_string(), color);
            writeln!(self.out, "{line}")?;
        }

        self.out.flush()
    }

    /// Report the error that ended the run
    pub fn fatal(&mut self, error: &AnalyzerError) -> io::Result<()> {
        let message = match error {
            AnalyzerError::SnapLengthTooShort { .. } => {
                "!!! Capture snap length too short !!!".to_string()
            }
            other => format!("> {other}"),
        };
        let line = self.paint(&message, Color::Red);
        writeln!(self.out, "{line}")?;
        self.out.flush()
    }

    /// Report an error that prevented the run from starting
    pub fn startup_error(&mut self, message: &str) -> io::Result<()> {
        let line = self.paint(&format!("> {message}"), Color::Red);
        writeln!(self.out, "{line}")?;
        self.out.flush()
    }

    /// Consume the console and return the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn clear_progress(&mut self) -> io::Result<()> {
        if self.progress_drawn {
            queue!(
                self.out,
                MoveUp(PROGRESS_LINES),
                MoveToColumn(0),
                Clear(ClearType::FromCursorDown)
            )?;
            self.progress_drawn = false;
        }
        Ok(())
    }

    fn draw_progress(&mut self) -> io::Result<()> {
        let Some(snapshot) = self.last_progress.clone() else {
            return self.out.flush();
        };

        let progress = snapshot.progress();
        let streams_line = match progress.broken_summary() {
            None => progress.streams_line(),
            Some(broken) => format!(
                "Streams: {}, {}",
                snapshot.stats.stream_count,
                self.paint(&broken, Color::Red)
            ),
        };

        queue!(
            self.out,
            Print(progress.frames_line()),
            Print("\n"),
            Print(streams_line),
            Print("\n")
        )?;
        self.progress_drawn = true;
        self.out.flush()
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.color { text.with(color).to_string() } else { text.to_string() }
    }
}
