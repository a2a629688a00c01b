//! Core types shared by the capture reader, the continuity engine and the
//! reporter.
//!
//! - [`RawFrame`] is one captured link-layer frame, shared zero-copy via `Arc`
//! - [`StreamKey`] identifies a stream by its destination IPv4 address
//! - [`Classification`] is the outcome of one rolling-counter transition
//!
//! ```rust
//! use svsi_analyser::types::{Classification, StreamKey};
//!
//! let key = StreamKey::new([239, 10, 0, 2]);
//! assert_eq!(key.label(), "239.10.0.2");
//! assert!(Classification::Duplicate.is_anomaly());
//! ```

mod classification;
mod frame;
mod stream_key;

pub use classification::Classification;
pub use frame::RawFrame;
pub use stream_key::StreamKey;
