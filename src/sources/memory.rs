//! Frame source over frames already held in memory

use std::collections::VecDeque;

use crate::Result;
use crate::source::FrameSource;
use crate::types::RawFrame;

/// Frame source that replays a fixed list of frames
///
/// Useful when frames come from somewhere other than a capture file, such as
/// a live tap that has already stripped its own container format.
#[derive(Debug, Default)]
pub struct MemorySource {
    frames: VecDeque<RawFrame>,
    next_index: u64,
}

impl MemorySource {
    /// Create a source from raw frame bytes, numbering frames from 1
    pub fn new<I>(frames: I) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        let mut source = Self::default();
        for frame in frames {
            source.push(frame);
        }
        source
    }

    /// Append a frame to the end of the queue
    pub fn push(&mut self, data: Vec<u8>) {
        self.next_index += 1;
        self.frames.push_back(RawFrame::from_bytes(data, self.next_index));
    }

    /// Frames not yet delivered
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

#[async_trait::async_trait]
impl FrameSource for MemorySource {
    async fn next_frame(&mut self) -> Result<Option<RawFrame>> {
        Ok(self.frames.pop_front())
    }

    fn describe(&self) -> String {
        format!("<{} in-memory frames>", self.frames.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_in_order() {
        let mut source = MemorySource::new(vec![vec![1], vec![2]]);
        source.push(vec![3]);
        assert_eq!(source.remaining(), 3);

        let mut seen = Vec::new();
        while let Some(frame) = source.next_frame().await.expect("infallible") {
            seen.push((frame.index, frame.data[0]));
        }
        assert_eq!(seen, vec![(1, 1), (2, 2), (3, 3)]);
    }
}
