//! Whole-file JSON stores for the durable engine state.
//!
//! Three records persist: the ordered reminder list, the adherence tracker
//! map, and the settings record. All three share the same contract:
//!
//! - **Corruption tolerance**: an absent or unreadable file loads as the
//!   empty/default value, logged but never propagated to the caller.
//! - **Atomic writes**: saves write the full serialized document to a
//!   temporary file and rename it into place, so a failed write preserves
//!   the prior state (no partial file).
//!
//! There is no incremental append and no external concurrent writer; reads
//! and writes are synchronous whole-file operations.

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;
use uuid::Uuid;

mod reminders;
mod settings;
mod tracker;

pub use reminders::ReminderStore;
pub use settings::SettingsStore;
pub use tracker::{TrackerStore, RESERVED_KEYS};

/// Errors that can occur during store operations.
///
/// Load paths never produce these (corruption degrades to empty); they are
/// raised by saves and by mutations referencing stale identity.
#[derive(Error, Debug)]
pub enum StoreError {
    /// File system I/O error while persisting.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error while persisting.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A positional reference into the reminder list is out of bounds.
    ///
    /// Positions shift when earlier entries are removed, so cached indices
    /// must be re-resolved before use.
    #[error("index {index} out of bounds for list of {len} reminders")]
    IndexOutOfBounds { index: usize, len: usize },

    /// No reminder with the given stable id exists.
    #[error("no reminder with id {0}")]
    UnknownId(Uuid),
}

/// A specialized `Result` type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Writes `contents` to `path` atomically via a temporary file and rename.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)
}
