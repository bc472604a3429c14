//! Settings record persistence.
//!
//! Settings live in `settings.json` as a flat object of booleans. Loading is
//! defaulting rather than failing: missing fields, a missing file, or a
//! corrupt file all resolve to [`Settings::default`], so the engine always
//! has a usable record.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{write_atomic, Result};
use crate::types::Settings;

/// Default file name for the settings record.
pub const SETTINGS_FILE: &str = "settings.json";

/// Durable store for user settings.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Creates a store backed by the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store at the default file name inside `dir`.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(SETTINGS_FILE))
    }

    /// Loads settings, falling back to defaults on any failure.
    #[must_use]
    pub fn load(&self) -> Settings {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "No settings file, using defaults");
                return Settings::default();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Settings file is corrupt, using defaults"
                );
                Settings::default()
            }
        }
    }

    /// Persists the settings record atomically.
    ///
    /// # Errors
    ///
    /// Returns a store error if serialization or the file write fails.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        let contents = serde_json::to_string_pretty(settings)?;
        write_atomic(&self.path, &contents)?;
        Ok(())
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
