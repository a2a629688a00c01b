//! Narration of continuity anomalies as they happen
//!
//! The engine hands every missing, duplicate or reordered transition to a
//! [`Narrator`]. Narration never influences the counters; swapping
//! [`Silent`] for another narrator changes only what gets printed.

use std::fmt;
use tokio::sync::mpsc;
use tracing::warn;

use crate::types::{Classification, StreamKey};

/// One anomalous counter transition on one stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamEvent {
    pub key: StreamKey,
    pub previous: u8,
    pub current: u8,
    pub classification: Classification,
}

impl StreamEvent {
    /// Counter values skipped by a `Missing` transition, zero otherwise
    pub fn lost(&self) -> u8 {
        match self.classification {
            Classification::Missing { lost } => lost,
            _ => 0,
        }
    }

    /// First and last skipped counter values, as they would have appeared on
    /// the wire
    pub fn lost_span(&self) -> Option<(u8, u8)> {
        self.classification
            .lost_range(self.previous)
            .map(|range| ((*range.start() % 256) as u8, (*range.end() % 256) as u8))
    }
}

impl fmt::Display for StreamEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.classification {
            Classification::Missing { .. } => write!(
                f,
                "> Missed chunk between packets {} and {} in stream {}",
                self.previous, self.current, self.key
            ),
            Classification::Duplicate => {
                write!(f, "> Duplicate packet {} in stream {}", self.current, self.key)
            }
            Classification::Reordered => write!(
                f,
                "> Out of order packet {} after {} in stream {}",
                self.current, self.previous, self.key
            ),
            Classification::Ok => write!(f, "> OK"),
            Classification::Initial => write!(f, "> New stream {}", self.key),
        }
    }
}

/// Sink for anomaly events
pub trait Narrator: Send {
    fn narrate(&mut self, event: &StreamEvent);
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Narrator for Silent {
    fn narrate(&mut self, _event: &StreamEvent) {}
}

/// Emits every event as a `tracing` warning
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNarrator;

impl Narrator for TracingNarrator {
    fn narrate(&mut self, event: &StreamEvent) {
        warn!(
            stream = %event.key,
            previous = event.previous,
            current = event.current,
            lost = event.lost(),
            "{}",
            event
        );
    }
}

/// Forwards every event to an unbounded channel, typically drained by a
/// terminal renderer running next to the analysis
#[derive(Debug, Clone)]
pub struct ChannelNarrator {
    tx: mpsc::UnboundedSender<StreamEvent>,
}

impl ChannelNarrator {
    /// Create a narrator and the receiving end of its channel
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<StreamEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Narrator for ChannelNarrator {
    fn narrate(&mut self, event: &StreamEvent) {
        // Receiver gone means nobody is listening any more
        let _ = self.tx.send(*event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::capture_logs;
    use tracing::level_filters::LevelFilter;

    const KEY: StreamKey = StreamKey::new([239, 0, 0, 9]);

    fn event(previous: u8, current: u8, classification: Classification) -> StreamEvent {
        StreamEvent { key: KEY, previous, current, classification }
    }

    #[test]
    fn event_messages() {
        assert_eq!(
            event(7, 9, Classification::Missing { lost: 1 }).to_string(),
            "> Missed chunk between packets 7 and 9 in stream 239.0.0.9"
        );
        assert_eq!(
            event(9, 9, Classification::Duplicate).to_string(),
            "> Duplicate packet 9 in stream 239.0.0.9"
        );
        assert_eq!(
            event(9, 4, Classification::Reordered).to_string(),
            "> Out of order packet 4 after 9 in stream 239.0.0.9"
        );
    }

    #[test]
    fn lost_span_wraps_past_255() {
        let missing = event(254, 2, Classification::Missing { lost: 3 });
        assert_eq!(missing.lost(), 3);
        assert_eq!(missing.lost_span(), Some((255, 1)));

        let duplicate = event(9, 9, Classification::Duplicate);
        assert_eq!(duplicate.lost(), 0);
        assert_eq!(duplicate.lost_span(), None);
    }

    #[test]
    fn channel_narrator_forwards_events() {
        let (mut narrator, mut rx) = ChannelNarrator::channel();
        let sent = event(1, 1, Classification::Duplicate);
        narrator.narrate(&sent);
        assert_eq!(rx.try_recv().ok(), Some(sent));

        drop(rx);
        narrator.narrate(&sent);
    }

    #[tokio::test]
    async fn dropping_the_narrator_closes_the_channel() {
        let (narrator, mut rx) = ChannelNarrator::channel();
        drop(narrator);
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn tracing_narrator_logs_a_warning() {
        let logged = capture_logs(LevelFilter::WARN, || {
            TracingNarrator.narrate(&event(3, 5, Classification::Missing { lost: 1 }));
        });

        assert!(logged.contains("WARN"));
        assert!(logged.contains("Missed chunk between packets 3 and 5 in stream 239.0.0.9"));
        assert!(logged.contains("lost=1"));
    }
}
