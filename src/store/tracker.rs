//! Adherence tracker map persistence.
//!
//! The tracker is a JSON object in `tracker.json` mapping occurrence keys
//! (`"<medicine>_<date>"`) to a terminal [`DoseStatus`]. Two invariants are
//! enforced here:
//!
//! - **First-write-wins**: [`TrackerStore::set_if_absent`] is the only
//!   mutation; an existing entry is never overwritten.
//! - **Reserved keys are stripped**: a legacy format persisted running
//!   `taken`/`missed` totals alongside the per-occurrence entries. Those
//!   pseudo-keys are removed on load and excluded on save so they can never
//!   collide with a medicine actually named "taken" or "missed". Aggregates
//!   are always recomputed from the per-occurrence entries instead.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{write_atomic, Result};
use crate::types::DoseStatus;

/// Default file name for the tracker map.
pub const TRACKER_FILE: &str = "tracker.json";

/// Legacy aggregate pseudo-keys excluded from per-occurrence semantics.
pub const RESERVED_KEYS: [&str; 2] = ["taken", "missed"];

/// Durable store for the adherence map.
#[derive(Debug, Clone)]
pub struct TrackerStore {
    path: PathBuf,
}

impl TrackerStore {
    /// Creates a store backed by the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store at the default file name inside `dir`.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(TRACKER_FILE))
    }

    /// Loads the adherence map.
    ///
    /// An absent or corrupt file yields an empty map (logged, never raised).
    /// Reserved aggregate keys and entries whose value is not a valid status
    /// string are dropped.
    #[must_use]
    pub fn load(&self) -> BTreeMap<String, DoseStatus> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "No tracker file, starting empty");
                return BTreeMap::new();
            }
        };

        let raw: BTreeMap<String, serde_json::Value> = match serde_json::from_str(&contents) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Tracker file is corrupt, treating as empty"
                );
                return BTreeMap::new();
            }
        };

        raw.into_iter()
            .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
            .filter_map(|(key, value)| {
                match serde_json::from_value::<DoseStatus>(value.clone()) {
                    Ok(status) => Some((key, status)),
                    Err(_) => {
                        debug!(%key, %value, "Dropping tracker entry with non-status value");
                        None
                    }
                }
            })
            .collect()
    }

    /// Persists the full map atomically, excluding reserved keys.
    ///
    /// # Errors
    ///
    /// Returns a store error if serialization or the file write fails; the
    /// previously persisted map is preserved on failure.
    pub fn save(&self, entries: &BTreeMap<String, DoseStatus>) -> Result<()> {
        let filtered: BTreeMap<&str, DoseStatus> = entries
            .iter()
            .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
            .map(|(key, status)| (key.as_str(), *status))
            .collect();
        let contents = serde_json::to_string_pretty(&filtered)?;
        write_atomic(&self.path, &contents)?;
        Ok(())
    }

    /// Sets `key` to `status` only if no entry exists yet, then persists.
    ///
    /// Returns `true` if the entry was newly set, `false` if the key was
    /// already present (first-write-wins: the stored value is untouched).
    ///
    /// # Errors
    ///
    /// Returns a store error only if persisting a newly set entry fails.
    pub fn set_if_absent(
        &self,
        entries: &mut BTreeMap<String, DoseStatus>,
        key: &str,
        status: DoseStatus,
    ) -> Result<bool> {
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.to_string(), status);
        self.save(entries)?;
        debug!(key, %status, "Recorded adherence entry");
        Ok(true)
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
