//! Analysis session over a frame source

use futures::Stream;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::AnalyzerConfig;
use crate::driver::{Driver, Outcome};
use crate::engine::ContinuityEngine;
use crate::narration::{Narrator, Silent};
use crate::report::Snapshot;
use crate::source::FrameSource;
use crate::sources::CaptureSource;
use crate::stream::ThrottleExt;
use crate::{AnalyzerError, Result};

/// A running continuity analysis
///
/// Frames are processed on a background task; the handle exposes live
/// progress and the final verdict. Dropping the handle cancels the run.
pub struct Analysis {
    /// Snapshot watch receiver
    snapshots: watch::Receiver<Arc<Snapshot>>,

    /// Final outcome, taken by `finish`
    outcome: Option<oneshot::Receiver<Outcome>>,

    /// Progress refresh cadence
    refresh_interval: Duration,

    /// Cancellation token for stopping the driver
    cancel: CancellationToken,
}

impl Analysis {
    /// Open a capture file and start analysing it.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, or if the file does
    /// not exist or is not a classic pcap capture.
    pub fn open<P, N>(path: P, config: &AnalyzerConfig, narrator: N) -> Result<Self>
    where
        P: AsRef<Path>,
        N: Narrator + 'static,
    {
        let path = path.as_ref();
        info!("Opening capture: {}", path.display());

        let source = CaptureSource::open(path)?;
        Self::start(source, config, narrator)
    }

    /// Start analysing frames from any source
    pub fn start<S, N>(source: S, config: &AnalyzerConfig, narrator: N) -> Result<Self>
    where
        S: FrameSource,
        N: Narrator + 'static,
    {
        config.validate()?;

        let engine = ContinuityEngine::with_narrator(narrator);
        let channels = Driver::spawn(source, engine, config.publish_every);

        Ok(Self {
            snapshots: channels.snapshots,
            outcome: Some(channels.outcome),
            refresh_interval: config.refresh_interval,
            cancel: channels.cancel,
        })
    }

    /// Start a silent analysis with default settings
    pub fn start_default<S: FrameSource>(source: S) -> Result<Self> {
        Self::start(source, &AnalyzerConfig::default(), Silent)
    }

    /// Live snapshots, at most one per refresh interval
    ///
    /// The stream ends after the final snapshot of the run has been yielded.
    pub fn progress(&self) -> impl Stream<Item = Arc<Snapshot>> + use<> {
        WatchStream::new(self.snapshots.clone()).throttle(self.refresh_interval)
    }

    /// Most recently published snapshot
    pub fn latest(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshots.borrow())
    }

    /// Wait for the run to end and return the final snapshot
    ///
    /// # Errors
    ///
    /// [`AnalyzerError::SnapLengthTooShort`] or a capture error when the run
    /// was aborted; [`AnalyzerError::Cancelled`] when called twice or when the
    /// run was cancelled.
    pub async fn finish(&mut self) -> Result<Arc<Snapshot>> {
        let outcome = self.outcome.take().ok_or(AnalyzerError::Cancelled)?;
        outcome.await.map_err(|_| AnalyzerError::Cancelled)?
    }

    /// Stop the run early
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Drop for Analysis {
    fn drop(&mut self) {
        debug!("Dropping analysis");
        self.cancel.cancel();
    }
}
