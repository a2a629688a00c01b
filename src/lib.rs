//! Continuity analysis for SVSI multicast media streams.
//!
//! The analyser reads a classic libpcap capture, picks out multicast frames
//! that carry an SVSI header and tracks the one-byte rolling counter of every
//! stream, keyed by destination IPv4 address. Gaps, duplicates and reordered
//! packets are counted per stream and reported live and at the end of the run.
//!
//! # Features
//!
//! - **Streaming**: frames are read and classified one at a time, so captures
//!   of any size run in constant memory
//! - **Live progress**: consistent snapshots published while the run is going
//! - **Pluggable sources**: anything implementing [`FrameSource`] can be analysed
//!
//! ## Example
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use svsi_analyser::{Analysis, AnalyzerConfig, narration::Silent};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> svsi_analyser::Result<()> {
//!     let config = AnalyzerConfig::default();
//!     let mut analysis = Analysis::open("capture.pcap", &config, Silent)?;
//!
//!     let mut progress = Box::pin(analysis.progress());
//!     while let Some(snapshot) = progress.next().await {
//!         println!("{}", snapshot.progress());
//!     }
//!
//!     for summary in analysis.finish().await?.final_report() {
//!         println!("{summary}");
//!     }
//!     Ok(())
//! }
//! ```

// Core types and error handling
mod error;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Packet decoding and classification
pub mod continuity;
pub mod engine;
pub mod narration;
pub mod registry;
pub mod report;
pub mod svsi;

// Frame sources
pub mod capture;
pub mod source;
pub mod sources;

// Running an analysis
pub mod analysis;
pub mod config;
pub mod driver;
pub mod render;
pub mod stream;

// Core exports
pub use error::*;
pub use types::*;

// Main API exports
pub use analysis::Analysis;
pub use capture::{CaptureHeader, CaptureReader};
pub use config::AnalyzerConfig;
pub use engine::ContinuityEngine;
pub use narration::{ChannelNarrator, Narrator, StreamEvent};
pub use report::{Progress, RunStats, Snapshot, StreamSummary};
pub use source::FrameSource;
pub use sources::{CaptureSource, MemorySource};
