//! Analyser configuration

use std::time::Duration;

use crate::{AnalyzerError, Result};

/// Default live progress refresh cadence
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(500);

/// Default number of frames between published snapshots
pub const DEFAULT_PUBLISH_EVERY: u64 = 1024;

/// Settings for one analysis run
///
/// ```rust
/// use std::time::Duration;
/// use svsi_analyser::AnalyzerConfig;
///
/// let config = AnalyzerConfig::default()
///     .with_verbose(true)
///     .with_refresh_interval(Duration::from_millis(250));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Narrate missing, duplicate and reordered packets as they are found
    pub verbose: bool,
    /// How often live progress is redrawn
    pub refresh_interval: Duration,
    /// Frames processed between two published snapshots
    pub publish_every: u64,
    /// Colour terminal output
    pub color: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            publish_every: DEFAULT_PUBLISH_EVERY,
            color: true,
        }
    }
}

impl AnalyzerConfig {
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_refresh_interval(mut self, refresh_interval: Duration) -> Self {
        self.refresh_interval = refresh_interval;
        self
    }

    pub fn with_publish_every(mut self, publish_every: u64) -> Self {
        self.publish_every = publish_every;
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Check the settings can drive a run
    pub fn validate(&self) -> Result<()> {
        if self.refresh_interval.is_zero() {
            return Err(AnalyzerError::config("refresh interval must be greater than zero"));
        }

        if self.publish_every == 0 {
            return Err(AnalyzerError::config("snapshot cadence must be at least one frame"));
        }

        Ok(())
    }
}
