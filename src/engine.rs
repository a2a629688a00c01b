//! Stream continuity engine
//!
//! Runs every captured frame through the pipeline
//! filter → extract → classify → registry update, and keeps the frame
//! counters the reporter needs. The engine is a plain single-writer value:
//! whoever owns it (normally the [`Driver`](crate::driver::Driver) task)
//! processes frames one at a time, so a [`Snapshot`] taken between two calls
//! never sees a half-applied update.

use tracing::{debug, error, trace};

use crate::narration::{Narrator, Silent, StreamEvent};
use crate::registry::StreamRegistry;
use crate::report::Snapshot;
use crate::svsi;
use crate::types::Classification;
use crate::{AnalyzerError, Result};

/// Single-writer owner of the stream registry
pub struct ContinuityEngine {
    registry: StreamRegistry,
    frames_seen: u64,
    frames_classified: u64,
    narrator: Box<dyn Narrator>,
}

impl Default for ContinuityEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ContinuityEngine {
    /// Create an engine that narrates nothing
    pub fn new() -> Self {
        Self::with_narrator(Silent)
    }

    /// Create an engine that reports anomalies to `narrator`
    pub fn with_narrator<N: Narrator + 'static>(narrator: N) -> Self {
        Self {
            registry: StreamRegistry::new(),
            frames_seen: 0,
            frames_classified: 0,
            narrator: Box::new(narrator),
        }
    }

    /// Processes one captured frame.
    ///
    /// Returns `Ok(None)` when the frame does not carry SVSI, and the
    /// transition class otherwise.
    ///
    /// # Errors
    ///
    /// [`AnalyzerError::SnapLengthTooShort`] when a qualifying frame was cut
    /// before the rolling counter. The registry is left untouched and the
    /// run must stop.
    pub fn process(&mut self, frame: &[u8]) -> Result<Option<Classification>> {
        self.frames_seen += 1;

        let Some(offset) = svsi::filter(frame) else {
            trace!(frame = self.frames_seen, len = frame.len(), "Frame filtered out");
            return Ok(None);
        };

        let (key, rolling) = svsi::extract(frame, offset).map_err(|truncated| {
            error!(frame = self.frames_seen, %truncated, "Capture snap length too short");
            AnalyzerError::snap_length_too_short(
                self.frames_seen,
                truncated.required,
                truncated.actual,
            )
        })?;

        let previous = self.registry.last_rolling(&key);
        let classification = self.registry.update(key, rolling);
        self.frames_classified += 1;

        if classification == Classification::Initial {
            debug!(stream = %key, rolling, "New stream");
        }

        if let (true, Some(previous)) = (classification.is_anomaly(), previous) {
            let event = StreamEvent { key, previous, current: rolling, classification };
            if let Some((first, last)) = event.lost_span() {
                debug!(
                    stream = %key,
                    frame = self.frames_seen,
                    lost = event.lost(),
                    first,
                    last,
                    "Packets lost"
                );
            }
            self.narrator.narrate(&event);
        }

        Ok(Some(classification))
    }

    /// Read-only view of the registry
    pub fn registry(&self) -> &StreamRegistry {
        &self.registry
    }

    /// Total frames handed to [`process`](Self::process)
    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }

    /// Frames that passed the filter and were classified
    pub fn frames_classified(&self) -> u64 {
        self.frames_classified
    }

    /// Copy of the current state for reporting
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narration::ChannelNarrator;
    use crate::test_utils::{SvsiFrameBuilder, capture_logs};
    use crate::types::StreamKey;
    use tracing::level_filters::LevelFilter;

    const GROUP: [u8; 4] = [239, 255, 1, 1];

    fn frame(rolling: u8) -> Vec<u8> {
        SvsiFrameBuilder::new(GROUP).rolling(rolling).build()
    }

    #[test]
    fn counts_every_frame_but_classifies_only_svsi() {
        let mut engine = ContinuityEngine::new();
        let mut unicast = frame(1);
        unicast[0] = 0x00;

        assert_eq!(engine.process(&unicast).expect("not fatal"), None);
        assert_eq!(engine.process(&frame(1)).expect("not fatal"), Some(Classification::Initial));
        assert_eq!(engine.process(&frame(2)).expect("not fatal"), Some(Classification::Ok));

        assert_eq!(engine.frames_seen(), 3);
        assert_eq!(engine.frames_classified(), 2);
        assert_eq!(engine.registry().len(), 1);
    }

    #[test]
    fn non_multicast_frame_never_touches_registry() {
        let mut engine = ContinuityEngine::new();
        let mut unicast = frame(1);
        unicast[..3].copy_from_slice(&[0x00, 0x1b, 0x21]);

        engine.process(&unicast).expect("not fatal");
        assert!(engine.registry().is_empty());
    }

    #[test]
    fn truncated_frame_is_fatal_and_leaves_registry_alone() {
        let mut engine = ContinuityEngine::new();
        engine.process(&frame(1)).expect("not fatal");

        let full = frame(2);
        let err = engine.process(&full[..50]).expect_err("truncated frame must be fatal");
        match err {
            AnalyzerError::SnapLengthTooShort { frame_index, required, actual } => {
                assert_eq!(frame_index, 2);
                assert_eq!(required, 52);
                assert_eq!(actual, 50);
            }
            other => panic!("unexpected error {other:?}"),
        }

        let key = StreamKey::new(GROUP);
        assert_eq!(engine.registry().last_rolling(&key), Some(1));
        assert_eq!(engine.frames_classified(), 1);
    }

    #[test]
    fn narration_reports_anomalies_without_changing_counts() {
        let (narrator, mut events) = ChannelNarrator::channel();
        let mut narrated = ContinuityEngine::with_narrator(narrator);
        let mut quiet = ContinuityEngine::new();

        for rolling in [5, 6, 7, 9, 9] {
            narrated.process(&frame(rolling)).expect("not fatal");
            quiet.process(&frame(rolling)).expect("not fatal");
        }

        let mut received = Vec::new();
        while let Ok(event) = events.try_recv() {
            received.push(event);
        }

        assert_eq!(received.len(), 2);
        assert_eq!(received[0].classification, Classification::Missing { lost: 1 });
        assert_eq!((received[0].previous, received[0].current), (7, 9));
        assert_eq!(received[1].classification, Classification::Duplicate);

        assert_eq!(narrated.snapshot().streams, quiet.snapshot().streams);
    }

    #[test]
    fn gap_logs_lost_counter_values() {
        let mut engine = ContinuityEngine::new();
        let logged = capture_logs(LevelFilter::DEBUG, || {
            for rolling in [253, 254, 2] {
                engine.process(&frame(rolling)).expect("not fatal");
            }
        });

        assert!(logged.contains("Packets lost"));
        assert!(logged.contains("lost=3"));
        assert!(logged.contains("first=255"));
        assert!(logged.contains("last=1"));

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.streams[0].lost_units, 3);
        assert_eq!(snapshot.stats.total_lost_units, 3);
    }
}
