//! Ordered reminder list persistence.
//!
//! Reminders are stored as a JSON array in `reminders.json`, in insertion
//! order. Mutations resolve by the stable reminder id; the positional
//! variants (`update_at`/`remove_at`) exist for display-ordered callers and
//! fail with [`StoreError::IndexOutOfBounds`] when handed a stale index.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use super::{write_atomic, Result, StoreError};
use crate::types::Reminder;

/// Default file name for the reminder list.
pub const REMINDERS_FILE: &str = "reminders.json";

/// Durable store for the ordered reminder list.
#[derive(Debug, Clone)]
pub struct ReminderStore {
    path: PathBuf,
}

impl ReminderStore {
    /// Creates a store backed by the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store at the default file name inside `dir`.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(REMINDERS_FILE))
    }

    /// Loads the full reminder list.
    ///
    /// An absent file or invalid JSON yields an empty list; the failure is
    /// logged, never raised. Legacy records without a stable id are assigned
    /// one during deserialization and keep it once the list is next saved.
    #[must_use]
    pub fn load(&self) -> Vec<Reminder> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "No reminder file, starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(reminders) => reminders,
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Reminder file is corrupt, treating as empty"
                );
                Vec::new()
            }
        }
    }

    /// Persists the full list atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if serialization or the file write fails; on
    /// failure the previously persisted list is preserved.
    pub fn save(&self, reminders: &[Reminder]) -> Result<()> {
        let contents = serde_json::to_string_pretty(reminders)?;
        write_atomic(&self.path, &contents)?;
        Ok(())
    }

    /// Appends a reminder to the end of the list and persists.
    pub fn append(&self, reminder: Reminder) -> Result<()> {
        let mut reminders = self.load();
        reminders.push(reminder);
        self.save(&reminders)
    }

    /// Replaces the reminder with the given id and persists.
    ///
    /// The stored id is preserved regardless of the id on `reminder`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownId`] if no reminder has that id.
    pub fn update(&self, id: Uuid, reminder: Reminder) -> Result<()> {
        let mut reminders = self.load();
        let slot = reminders
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::UnknownId(id))?;
        *slot = Reminder { id, ..reminder };
        self.save(&reminders)
    }

    /// Removes the reminder with the given id, compacts, and persists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownId`] if no reminder has that id.
    pub fn remove(&self, id: Uuid) -> Result<Reminder> {
        let mut reminders = self.load();
        let position = reminders
            .iter()
            .position(|r| r.id == id)
            .ok_or(StoreError::UnknownId(id))?;
        let removed = reminders.remove(position);
        self.save(&reminders)?;
        Ok(removed)
    }

    /// Replaces the reminder at a list position and persists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IndexOutOfBounds`] if `index` is outside the
    /// current list.
    pub fn update_at(&self, index: usize, reminder: Reminder) -> Result<()> {
        let reminders = self.load();
        let id = reminders
            .get(index)
            .map(|r| r.id)
            .ok_or(StoreError::IndexOutOfBounds {
                index,
                len: reminders.len(),
            })?;
        self.update(id, reminder)
    }

    /// Removes the reminder at a list position, compacts, and persists.
    ///
    /// Later entries shift down by one, so any cached positional reference
    /// past `index` is invalid afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IndexOutOfBounds`] if `index` is outside the
    /// current list.
    pub fn remove_at(&self, index: usize) -> Result<Reminder> {
        let reminders = self.load();
        let id = reminders
            .get(index)
            .map(|r| r.id)
            .ok_or(StoreError::IndexOutOfBounds {
                index,
                len: reminders.len(),
            })?;
        self.remove(id)
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> ReminderStore {
        ReminderStore::in_dir(dir.path())
    }

    #[test]
    fn load_missing_file_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store_in(&dir).load().is_empty());
    }

    #[test]
    fn load_corrupt_file_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "{ not json").unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn append_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store
            .append(Reminder::new("Aspirin", "8:00 AM", "2024-01-01"))
            .unwrap();
        store
            .append(Reminder::new("Ibuprofen", "9:00 PM", "2024-01-02"))
            .unwrap();

        let reminders = store.load();
        assert_eq!(reminders.len(), 2);
        assert_eq!(reminders[0].medicine, "Aspirin");
        assert_eq!(reminders[1].medicine, "Ibuprofen");
    }

    #[test]
    fn save_load_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .append(Reminder::new("Aspirin", "8:00 AM", "2024-01-01"))
            .unwrap();

        let first = store.load();
        store.save(&first).unwrap();
        assert_eq!(store.load(), first);
    }

    #[test]
    fn update_by_id_preserves_stored_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .append(Reminder::new("Aspirin", "8:00 AM", "2024-01-01"))
            .unwrap();
        let id = store.load()[0].id;

        store
            .update(id, Reminder::new("Aspirin 100mg", "8:00 AM", "2024-01-01"))
            .unwrap();

        let reminders = store.load();
        assert_eq!(reminders[0].id, id);
        assert_eq!(reminders[0].medicine, "Aspirin 100mg");
    }

    #[test]
    fn update_unknown_id_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let err = store
            .update(Uuid::new_v4(), Reminder::new("X", "8:00 AM", "2024-01-01"))
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownId(_)));
    }

    #[test]
    fn remove_compacts_and_shifts_positions() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        for name in ["A", "B", "C"] {
            store
                .append(Reminder::new(name, "8:00 AM", "2024-01-01"))
                .unwrap();
        }

        let removed = store.remove_at(1).unwrap();
        assert_eq!(removed.medicine, "B");

        let reminders = store.load();
        assert_eq!(reminders.len(), 2);
        assert_eq!(reminders[0].medicine, "A");
        // C moved from position 2 to position 1; a cached index 2 is stale.
        assert_eq!(reminders[1].medicine, "C");
        assert!(matches!(
            store.remove_at(2).unwrap_err(),
            StoreError::IndexOutOfBounds { index: 2, len: 2 }
        ));
    }

    #[test]
    fn stable_id_survives_position_shift() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        for name in ["A", "B", "C"] {
            store
                .append(Reminder::new(name, "8:00 AM", "2024-01-01"))
                .unwrap();
        }
        let c_id = store.load()[2].id;

        store.remove_at(0).unwrap();

        // The id still resolves even though C's position changed.
        let removed = store.remove(c_id).unwrap();
        assert_eq!(removed.medicine, "C");
    }

    #[test]
    fn legacy_records_are_assigned_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(
            store.path(),
            r#"[{"medicine": "Aspirin", "time": "8:00 AM", "date": "2024-01-01"}]"#,
        )
        .unwrap();

        let reminders = store.load();
        assert_eq!(reminders.len(), 1);
        assert!(!reminders[0].id.is_nil());
    }
}
