//! Tests for loading state files written by the legacy implementation.
//!
//! The legacy app persisted reminders without stable ids and wrote running
//! `taken`/`missed` totals directly into the tracker map. Loading must
//! migrate both shapes: ids are assigned on load, and aggregate pseudo-keys
//! are stripped and recomputed rather than trusted.

use std::fs;

use chrono::NaiveDateTime;

use dosewatch::engine::AdherenceEngine;
use dosewatch::occurrence::parse_occurrence;
use dosewatch::store::{ReminderStore, TrackerStore};
use dosewatch::types::DoseStatus;

fn ts(date: &str, time: &str) -> NaiveDateTime {
    parse_occurrence(date, time).unwrap()
}

#[test]
fn legacy_reminders_without_ids_load_and_resolve() {
    let dir = tempfile::tempdir().unwrap();
    let store = ReminderStore::in_dir(dir.path());
    fs::write(
        store.path(),
        r#"[
            {"medicine": "Aspirin", "time": "8:00 AM", "date": "2024-01-01"},
            {"medicine": "Ibuprofen", "time": "9:00 PM", "date": "2024-01-01"}
        ]"#,
    )
    .unwrap();

    let reminders = store.load();
    assert_eq!(reminders.len(), 2);
    assert_ne!(reminders[0].id, reminders[1].id);

    // Once saved, the assigned ids are durable.
    store.save(&reminders).unwrap();
    let reloaded = store.load();
    assert_eq!(reloaded[0].id, reminders[0].id);
    assert_eq!(reloaded[1].id, reminders[1].id);
}

#[test]
fn legacy_tracker_totals_are_discarded_and_recomputed() {
    let dir = tempfile::tempdir().unwrap();
    let tracker = TrackerStore::in_dir(dir.path());
    // Legacy files carried running totals under reserved keys, which would
    // collide with a medicine literally named "taken" or "missed".
    fs::write(
        tracker.path(),
        r#"{
            "Aspirin_2024-01-01": "taken",
            "Ibuprofen_2024-01-01": "missed",
            "Vitamin C_2023-12-31": "taken",
            "taken": 7,
            "missed": 12
        }"#,
    )
    .unwrap();

    let reminders = ReminderStore::in_dir(dir.path());
    let mut engine = AdherenceEngine::new(reminders, tracker.clone());
    let view = engine.tracker_view(ts("2024-01-01", "9:00 AM"));

    // Counts come from today's per-occurrence entries, not the stale totals.
    assert_eq!(view.taken_count, 1);
    assert_eq!(view.missed_count, 1);

    // Persisting strips the reserved keys for good.
    let entries = tracker.load();
    tracker.save(&entries).unwrap();
    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(tracker.path()).unwrap()).unwrap();
    let object = raw.as_object().unwrap();
    assert!(!object.contains_key("taken"));
    assert!(!object.contains_key("missed"));
    assert_eq!(object.len(), 3);
}

#[test]
fn save_of_loaded_state_is_content_equal() {
    let dir = tempfile::tempdir().unwrap();
    let tracker = TrackerStore::in_dir(dir.path());
    let mut entries = std::collections::BTreeMap::new();
    entries.insert("Aspirin_2024-01-01".to_string(), DoseStatus::Taken);
    tracker.save(&entries).unwrap();

    let loaded = tracker.load();
    tracker.save(&loaded).unwrap();
    assert_eq!(tracker.load(), loaded);
}

#[test]
fn corrupt_state_files_degrade_to_empty_not_errors() {
    let dir = tempfile::tempdir().unwrap();
    let reminders = ReminderStore::in_dir(dir.path());
    let tracker = TrackerStore::in_dir(dir.path());
    fs::write(reminders.path(), "<<<").unwrap();
    fs::write(tracker.path(), "[1, 2, 3]").unwrap();

    let mut engine = AdherenceEngine::new(reminders, tracker);
    let dashboard = engine.dashboard_view(ts("2024-01-01", "9:00 AM"));
    assert_eq!(dashboard.active_count, 0);
    assert!(dashboard.today_meds.is_empty());
    assert!(dashboard.next_reminder.is_none());
}
