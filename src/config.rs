//! Configuration for the DoseWatch daemon and CLI.
//!
//! Configuration comes from environment variables with sensible defaults.
//!
//! # Environment Variables
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `DOSEWATCH_DATA_DIR` | No | `~/.dosewatch` | Directory holding the JSON state files |
//! | `DOSEWATCH_TICK_SECS` | No | 60 | Seconds between scheduler ticks |

use std::env;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use thiserror::Error;

use crate::store::{ReminderStore, SettingsStore, TrackerStore};

/// Default data directory name relative to home.
const DEFAULT_DATA_DIR: &str = ".dosewatch";

/// Default scheduler tick period in seconds.
///
/// The scheduler matches occurrences to the exact minute, so a period above
/// 60 seconds can skip a match window entirely.
pub const DEFAULT_TICK_SECS: u64 = 60;

/// Errors that can occur during configuration parsing.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment variable has an invalid value.
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to determine home directory.
    #[error("failed to determine home directory")]
    NoHomeDirectory,
}

/// Configuration for DoseWatch.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding `reminders.json`, `tracker.json`, and
    /// `settings.json`.
    pub data_dir: PathBuf,

    /// Seconds between scheduler ticks.
    pub tick_secs: u64,
}

impl Config {
    /// Creates a `Config` by parsing environment variables.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if:
    /// - `DOSEWATCH_TICK_SECS` is set but is not a positive integer
    /// - The home directory cannot be determined (needed for the default
    ///   data directory)
    pub fn from_env() -> Result<Self, ConfigError> {
        // Optional: DOSEWATCH_DATA_DIR (default: ~/.dosewatch)
        let data_dir = match env::var("DOSEWATCH_DATA_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => {
                let base_dirs = BaseDirs::new().ok_or(ConfigError::NoHomeDirectory)?;
                base_dirs.home_dir().join(DEFAULT_DATA_DIR)
            }
        };

        // Optional: DOSEWATCH_TICK_SECS (default: 60, must be > 0)
        let tick_secs = match env::var("DOSEWATCH_TICK_SECS") {
            Ok(val) => {
                let secs = val.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                    key: "DOSEWATCH_TICK_SECS".to_string(),
                    message: format!("expected positive integer, got '{val}'"),
                })?;
                if secs == 0 {
                    return Err(ConfigError::InvalidValue {
                        key: "DOSEWATCH_TICK_SECS".to_string(),
                        message: "tick period must be at least 1 second".to_string(),
                    });
                }
                secs
            }
            Err(_) => DEFAULT_TICK_SECS,
        };

        Ok(Self {
            data_dir,
            tick_secs,
        })
    }

    /// Reminder store rooted in the configured data directory.
    #[must_use]
    pub fn reminder_store(&self) -> ReminderStore {
        ReminderStore::in_dir(&self.data_dir)
    }

    /// Tracker store rooted in the configured data directory.
    #[must_use]
    pub fn tracker_store(&self) -> TrackerStore {
        TrackerStore::in_dir(&self.data_dir)
    }

    /// Settings store rooted in the configured data directory.
    #[must_use]
    pub fn settings_store(&self) -> SettingsStore {
        SettingsStore::in_dir(&self.data_dir)
    }

    /// Returns the configured data directory.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
