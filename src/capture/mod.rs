//! Capture file reading
//!
//! This module decodes classic libpcap captures into raw frames. It knows
//! nothing about SVSI; the continuity engine only ever sees frame bytes.

pub mod reader;

pub use reader::{CaptureHeader, CaptureReader};
