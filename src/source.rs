//! Frame source trait

use crate::Result;
use crate::types::RawFrame;

/// Trait for sources of captured frames
///
/// Sources abstract over where frames come from (a capture file, an
/// in-memory list, a live tap) and deliver them one at a time in capture
/// order.
#[async_trait::async_trait]
pub trait FrameSource: Send + 'static {
    /// Get the next captured frame
    ///
    /// Returns:
    /// - `Ok(Some(frame))` - Next frame in capture order
    /// - `Ok(None)` - End of input (normal termination)
    /// - `Err(e)` - The source cannot continue
    async fn next_frame(&mut self) -> Result<Option<RawFrame>>;

    /// Short description of the source for log messages
    fn describe(&self) -> String;
}
