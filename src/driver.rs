//! Driver spawns and manages the frame processing task

use std::sync::Arc;
use tokio::sync::{oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

use crate::engine::ContinuityEngine;
use crate::report::Snapshot;
use crate::source::FrameSource;
use crate::{AnalyzerError, Result};

/// Outcome of a completed run: the final snapshot, or the error that stopped it
pub type Outcome = Result<Arc<Snapshot>>;

/// Result of spawning the driver task
pub struct DriverChannels {
    /// Latest published snapshot
    pub snapshots: watch::Receiver<Arc<Snapshot>>,
    /// Resolves once the run ends
    pub outcome: oneshot::Receiver<Outcome>,
    /// Cancellation token for graceful shutdown
    pub cancel: CancellationToken,
}

/// Driver spawns and manages the frame processing task
///
/// A single task owns both the frame source and the engine, so frames are
/// processed strictly one after another and every published snapshot is
/// consistent. Snapshots are published every `publish_every` frames and once
/// more at end of input; after each publication the task yields so that
/// consumers on the same runtime get to run.
pub struct Driver;

impl Driver {
    /// Spawn the processing task for the given source and engine
    pub fn spawn<S>(source: S, engine: ContinuityEngine, publish_every: u64) -> DriverChannels
    where
        S: FrameSource,
    {
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(engine.snapshot()));
        let (outcome_tx, outcome_rx) = oneshot::channel();
        let cancel = CancellationToken::new();
        let cancel_task = cancel.clone();

        tokio::spawn(async move {
            let outcome =
                Self::frame_task(source, engine, snapshot_tx, publish_every.max(1), cancel_task)
                    .await;
            if outcome_tx.send(outcome).is_err() {
                debug!("Outcome receiver dropped before the run finished");
            }
        });

        DriverChannels { snapshots: snapshot_rx, outcome: outcome_rx, cancel }
    }

    /// Frame task - pulls frames through the engine until end of input
    async fn frame_task<S>(
        mut source: S,
        mut engine: ContinuityEngine,
        snapshot_tx: watch::Sender<Arc<Snapshot>>,
        publish_every: u64,
        cancel: CancellationToken,
    ) -> Outcome
    where
        S: FrameSource,
    {
        info!("Frame task started for {}", source.describe());

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Frame task cancelled after {} frames", engine.frames_seen());
                    return Err(AnalyzerError::Cancelled);
                }
                next = source.next_frame() => next,
            };

            let frame = match next {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    let snapshot = Arc::new(engine.snapshot());
                    snapshot_tx.send_replace(Arc::clone(&snapshot));
                    info!(
                        "End of input after {} frames ({} classified, {} streams, {} lost)",
                        snapshot.stats.frames_seen,
                        snapshot.stats.frames_classified,
                        snapshot.stats.stream_count,
                        snapshot.stats.total_lost_units
                    );
                    for summary in snapshot.streams.iter().filter(|s| s.lost_units > 0) {
                        info!(
                            stream = %summary.key,
                            lost = summary.lost_units,
                            "Stream lost packets"
                        );
                    }
                    return Ok(snapshot);
                }
                Err(e) => {
                    error!("Frame source failed after {} frames: {}", engine.frames_seen(), e);
                    return Err(e);
                }
            };

            trace!("Processing frame {}", frame.index);
            if let Err(e) = engine.process(&frame.data) {
                error!("Stopping at frame {}: {}", frame.index, e);
                return Err(e);
            }

            if engine.frames_seen() % publish_every == 0 {
                snapshot_tx.send_replace(Arc::new(engine.snapshot()));
                tokio::task::yield_now().await;
            }
        }
    }
}
