//! Raw captured frame type

use std::sync::Arc;
use std::time::Duration;

/// One captured link-layer frame as delivered by a frame source
///
/// This is the fundamental data unit that flows from the capture reader to the
/// continuity engine. The engine only ever reads `data`; the remaining fields
/// exist for diagnostics.
#[derive(Debug, Clone)]
pub struct RawFrame {
    /// Captured bytes (zero-copy via Arc)
    pub data: Arc<[u8]>,

    /// 1-based position of the frame in the capture
    pub index: u64,

    /// Capture timestamp relative to the Unix epoch
    pub timestamp: Duration,

    /// Length of the frame on the wire, which exceeds `data.len()` when the
    /// capture snap length truncated it
    pub original_len: usize,
}

impl RawFrame {
    /// Create a new frame
    pub fn new(data: Vec<u8>, index: u64, timestamp: Duration, original_len: usize) -> Self {
        Self { data: data.into(), index, timestamp, original_len }
    }

    /// Create an untimed frame whose wire length equals its captured length
    pub fn from_bytes(data: Vec<u8>, index: u64) -> Self {
        let original_len = data.len();
        Self::new(data, index, Duration::ZERO, original_len)
    }

    /// Whether the capture mechanism cut this frame short
    pub fn is_truncated(&self) -> bool {
        self.original_len > self.data.len()
    }
}
