//! Field extractor: reads the stream key and rolling counter

use super::{HeaderOffset, ROLLING_OFFSET, STREAM_KEY_LEN, STREAM_KEY_OFFSET};
use crate::types::StreamKey;
use thiserror::Error;

/// A qualifying frame was cut short before the fields the analyser reads
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("frame holds {actual} bytes, {required} required")]
pub struct TruncatedFrame {
    /// Bytes needed to read both the stream key and the rolling counter
    pub required: usize,
    /// Bytes actually captured
    pub actual: usize,
}

/// Reads the stream key and rolling counter from a frame accepted by
/// [`filter`](super::filter).
///
/// The key sits at a fixed absolute position in the IPv4 header; the counter
/// sits at a fixed displacement past `offset`.
pub fn extract(frame: &[u8], offset: HeaderOffset) -> Result<(StreamKey, u8), TruncatedFrame> {
    let rolling_at = offset + ROLLING_OFFSET;
    let required = (rolling_at + 1).max(STREAM_KEY_OFFSET + STREAM_KEY_LEN);

    if frame.len() < required {
        return Err(TruncatedFrame { required, actual: frame.len() });
    }

    let key = StreamKey::new([
        frame[STREAM_KEY_OFFSET],
        frame[STREAM_KEY_OFFSET + 1],
        frame[STREAM_KEY_OFFSET + 2],
        frame[STREAM_KEY_OFFSET + 3],
    ]);

    Ok((key, frame[rolling_at]))
}
