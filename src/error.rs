//! Error types for capture analysis.
//!
//! All errors implement `std::error::Error` and carry enough structured context
//! to explain what stopped a run.
//!
//! ## Error Categories
//!
//! - **File Errors**: the capture file is missing or unreadable
//! - **Capture Errors**: the capture container could not be decoded
//! - **Snap Length Errors**: a qualifying frame was truncated by the capture
//!   mechanism, which is fatal for the whole run
//! - **Config Errors**: invalid analyser settings
//!
//! Frames that simply do not carry SVSI traffic are never errors; they are
//! dropped by the frame filter.
//!
//! ```rust
//! use svsi_analyser::AnalyzerError;
//!
//! let error = AnalyzerError::snap_length_too_short(42, 52, 48);
//! assert!(error.is_fatal());
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for analyser operations.
pub type Result<T, E = AnalyzerError> = std::result::Result<T, E>;

/// Main error type for analyser operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AnalyzerError {
    #[error("Capture file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Capture decode error in {context}: {details}")]
    Capture { context: String, details: String },

    #[error(
        "Capture snap length too short: frame {frame_index} has {actual} bytes, {required} required"
    )]
    SnapLengthTooShort { frame_index: u64, required: usize, actual: usize },

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    #[error("Analysis cancelled before end of capture")]
    Cancelled,
}

impl AnalyzerError {
    /// Returns whether this error aborts an analysis that is already running.
    ///
    /// Startup failures (missing file, bad configuration) are not fatal in this
    /// sense because no frame has been processed yet.
    pub fn is_fatal(&self) -> bool {
        match self {
            AnalyzerError::SnapLengthTooShort { .. } => true,
            AnalyzerError::Capture { .. } => true,
            AnalyzerError::File { .. } => false,
            AnalyzerError::Config { .. } => false,
            AnalyzerError::Cancelled => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            AnalyzerError::File { .. } => vec![
                "Check the capture file exists and is readable",
                "Check file permissions",
            ],
            AnalyzerError::Capture { .. } => vec![
                "Verify the file is a classic libpcap capture (not pcapng)",
                "Convert pcapng captures with `editcap -F pcap`",
                "Check the capture was not cut short while being written",
            ],
            AnalyzerError::SnapLengthTooShort { .. } => vec![
                "Capture again with a larger snap length (e.g. `tcpdump -s 0`)",
                "At least 52 bytes per frame are needed to read the rolling counter",
            ],
            AnalyzerError::Config { .. } => vec![
                "Use a refresh interval greater than zero",
                "Use a snapshot cadence greater than zero",
            ],
            AnalyzerError::Cancelled => vec!["Let the analysis run to the end of the capture"],
        }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        AnalyzerError::File { path, source }
    }

    /// Helper constructor for capture decode errors.
    pub fn capture(context: impl Into<String>, details: impl Into<String>) -> Self {
        AnalyzerError::Capture { context: context.into(), details: details.into() }
    }

    /// Helper constructor for the fatal truncated-frame condition.
    pub fn snap_length_too_short(frame_index: u64, required: usize, actual: usize) -> Self {
        AnalyzerError::SnapLengthTooShort { frame_index, required, actual }
    }

    /// Helper constructor for configuration errors.
    pub fn config(reason: impl Into<String>) -> Self {
        AnalyzerError::Config { reason: reason.into() }
    }
}

impl From<std::io::Error> for AnalyzerError {
    fn from(err: std::io::Error) -> Self {
        AnalyzerError::File { path: PathBuf::from("<unknown>"), source: err }
    }
}
