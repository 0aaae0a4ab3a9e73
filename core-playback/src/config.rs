//! # Playback Configuration

use crate::error::{PlaybackError, Result};
use core_runtime::config::{AppConfig, DEFAULT_PROGRESS_INTERVAL};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback controller settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// How often the backend position is sampled while playing.
    ///
    /// Default: 500ms.
    pub progress_interval: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl PlaybackConfig {
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.progress_interval.is_zero() {
            return Err(PlaybackError::Config(
                "progress_interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<&AppConfig> for PlaybackConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            progress_interval: config.progress_interval,
        }
    }
}
