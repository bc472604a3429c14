//! Adherence engine: reconciles reminders against tracker state.
//!
//! This is the core of DoseWatch. Given the current time, the reminder list,
//! and the adherence map, the engine classifies every reminder occurrence as
//! pending, taken, or missed, commits implicit misses back to the tracker,
//! and derives the read-only views consumed by the UI layer.
//!
//! # Status resolution
//!
//! For each reminder, first match wins:
//!
//! 1. A tracker entry for `"<medicine>_<date>"` exists: the stored status is
//!    terminal and never changes again for that occurrence.
//! 2. The date is strictly before today: implicitly **missed**, written back
//!    via first-write-wins so the classification persists across reloads.
//! 3. The date is today and the scheduled time is more than the grace window
//!    (2 hours) in the past: implicitly **missed**, same write-back.
//! 4. Otherwise **pending** (not yet due, or due but still inside the grace
//!    window and unacted-on).
//!
//! A reminder whose occurrence fails to parse is excluded from every
//! aggregate but stays visible in [`AdherenceEngine::raw_list`].
//!
//! # Aggregates are derived
//!
//! The dashboard and tracker views are recomputed from the stores on every
//! call and never persisted. Any aggregate totals found in a legacy tracker
//! file are discarded by the store layer.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::occurrence::{self, parse_occurrence};
use crate::store::{ReminderStore, TrackerStore};
use crate::types::{dose_key, DoseStatus, Reminder};

/// Grace window after the scheduled time during which an unacknowledged
/// reminder stays pending instead of being auto-missed.
pub const GRACE_WINDOW_HOURS: i64 = 2;

/// Display format for times shown in views.
const DISPLAY_TIME_FORMAT: &str = "%I:%M %p";

/// Resolved status of a reminder occurrence, including the transient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedStatus {
    /// Not yet due, or due but inside the grace window and unacted-on.
    Pending,
    /// Terminal: the dose was taken.
    Taken,
    /// Terminal: the dose was missed (explicitly or auto-classified).
    Missed,
}

impl From<DoseStatus> for ResolvedStatus {
    fn from(status: DoseStatus) -> Self {
        match status {
            DoseStatus::Taken => Self::Taken,
            DoseStatus::Missed => Self::Missed,
        }
    }
}

/// The next strictly-future reminder shown on the dashboard banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextReminder {
    /// Medicine name.
    pub medicine: String,
    /// Scheduled time formatted for display (`HH:MM AM|PM`).
    pub time: String,
}

/// Dashboard summary, recomputed on each call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    /// Today's reminders that are past due and not taken.
    pub active_count: usize,
    /// All of today's reminders as display strings, regardless of status.
    pub today_meds: Vec<String>,
    /// The nearest strictly-future reminder across all dates, if any.
    pub next_reminder: Option<NextReminder>,
}

/// One row of the tracker screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackerItem {
    /// Medicine name.
    pub medicine: String,
    /// ISO date of the occurrence.
    pub date: String,
    /// Resolved status at evaluation time.
    pub status: ResolvedStatus,
    /// Whether the user can still mark this occurrence (unmarked and inside
    /// the grace window).
    pub actionable: bool,
}

/// Tracker screen summary, recomputed on each call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackerView {
    /// Tracker entries for today with status `taken`.
    pub taken_count: usize,
    /// Tracker entries for today with status `missed`.
    pub missed_count: usize,
    /// Today's and future occurrences (past dates are committed as missed
    /// but not listed).
    pub items: Vec<TrackerItem>,
}

/// Outcome of evaluating a single reminder.
struct Evaluation {
    occurrence: NaiveDateTime,
    status: ResolvedStatus,
}

/// The reminder evaluation and adherence-tracking engine.
///
/// Owns the in-memory tracker map and mediates every mutation through the
/// store's first-write-wins `set_if_absent`, which is the sole safety
/// mechanism needed under the single-threaded cooperative model: an entry is
/// never overwritten once set, so the tick path and the query path can only
/// race on who writes an identical auto-miss value first.
pub struct AdherenceEngine {
    reminders: ReminderStore,
    tracker: TrackerStore,
    entries: BTreeMap<String, DoseStatus>,
}

impl AdherenceEngine {
    /// Creates an engine over the given stores, loading the adherence map.
    #[must_use]
    pub fn new(reminders: ReminderStore, tracker: TrackerStore) -> Self {
        let entries = tracker.load();
        Self {
            reminders,
            tracker,
            entries,
        }
    }

    /// Re-reads the adherence map from durable storage.
    pub fn reload(&mut self) {
        self.entries = self.tracker.load();
    }

    /// Read-only access to the in-memory adherence map.
    #[must_use]
    pub fn entries(&self) -> &BTreeMap<String, DoseStatus> {
        &self.entries
    }

    /// Computes the dashboard summary for `now`.
    ///
    /// Evaluating has the documented side effect of committing implicit
    /// misses to the tracker (first-write-wins); a write-back failure is
    /// logged and evaluation continues.
    pub fn dashboard_view(&mut self, now: NaiveDateTime) -> DashboardView {
        let reminders = self.reminders.load();
        let today = now.date();

        let mut active_count = 0;
        let mut today_meds = Vec::new();
        let mut next: Option<(NaiveDateTime, NextReminder)> = None;

        for reminder in &reminders {
            let Some(eval) = self.resolve(now, reminder) else {
                continue;
            };

            if eval.occurrence.date() == today {
                today_meds.push(format!("{} at {}", reminder.medicine, reminder.time));

                // Outstanding: already past due today and not taken. Covers
                // both committed misses and unmarked doses inside the grace
                // window.
                if eval.occurrence < now && eval.status != ResolvedStatus::Taken {
                    active_count += 1;
                }
            }

            // Strictly-less-than replacement: ties keep the first encountered.
            if eval.occurrence > now
                && next.as_ref().map_or(true, |(best, _)| eval.occurrence < *best)
            {
                next = Some((
                    eval.occurrence,
                    NextReminder {
                        medicine: reminder.medicine.clone(),
                        time: eval.occurrence.format(DISPLAY_TIME_FORMAT).to_string(),
                    },
                ));
            }
        }

        DashboardView {
            active_count,
            today_meds,
            next_reminder: next.map(|(_, reminder)| reminder),
        }
    }

    /// Computes the tracker screen view for `now`.
    ///
    /// Past-date occurrences are committed as missed but omitted from the
    /// item list; today's counts are derived from tracker entries whose key
    /// carries today's date suffix.
    pub fn tracker_view(&mut self, now: NaiveDateTime) -> TrackerView {
        let reminders = self.reminders.load();
        let today = now.date();

        let mut items = Vec::new();
        for reminder in &reminders {
            let Some(eval) = self.resolve(now, reminder) else {
                continue;
            };
            if eval.occurrence.date() < today {
                continue;
            }
            items.push(TrackerItem {
                medicine: reminder.medicine.clone(),
                date: reminder.date.clone(),
                status: eval.status,
                actionable: eval.status == ResolvedStatus::Pending,
            });
        }

        let today_suffix = format!("_{}", occurrence::date_key(today));
        let mut taken_count = 0;
        let mut missed_count = 0;
        for (key, status) in &self.entries {
            if !key.ends_with(&today_suffix) {
                continue;
            }
            match status {
                DoseStatus::Taken => taken_count += 1,
                DoseStatus::Missed => missed_count += 1,
            }
        }

        TrackerView {
            taken_count,
            missed_count,
            items,
        }
    }

    /// Records a user-initiated taken/missed decision for an occurrence.
    ///
    /// Returns `true` if the entry was recorded, `false` if the occurrence
    /// was already marked (first-write-wins: the existing status stands and
    /// the call is a silent no-op).
    ///
    /// # Errors
    ///
    /// Returns a store error only if persisting a new entry fails.
    pub fn mark(
        &mut self,
        medicine: &str,
        date: &str,
        status: DoseStatus,
    ) -> crate::store::Result<bool> {
        let key = dose_key(medicine, date);
        let recorded = self.tracker.set_if_absent(&mut self.entries, &key, status)?;
        if recorded {
            info!(medicine, date, %status, "Marked occurrence");
        } else {
            debug!(medicine, date, "Occurrence already marked, ignoring");
        }
        Ok(recorded)
    }

    /// Returns the full reminder list sorted by occurrence for display.
    ///
    /// Parse failures do not disqualify a record here: unparseable
    /// occurrences sort first and remain visible.
    #[must_use]
    pub fn raw_list(&self) -> Vec<Reminder> {
        let mut reminders = self.reminders.load();
        reminders.sort_by_key(|r| {
            parse_occurrence(&r.date, &r.time).unwrap_or(NaiveDateTime::MIN)
        });
        reminders
    }

    /// Evaluates one reminder against the tracker map at `now`.
    ///
    /// Returns `None` when the occurrence cannot be parsed; such records are
    /// excluded from all aggregation.
    fn resolve(&mut self, now: NaiveDateTime, reminder: &Reminder) -> Option<Evaluation> {
        let occurrence = match parse_occurrence(&reminder.date, &reminder.time) {
            Ok(occurrence) => occurrence,
            Err(e) => {
                debug!(
                    medicine = %reminder.medicine,
                    error = %e,
                    "Skipping reminder with unparseable occurrence"
                );
                return None;
            }
        };

        let key = reminder.dose_key();
        let today = now.date();

        let status = if let Some(stored) = self.entries.get(&key) {
            ResolvedStatus::from(*stored)
        } else if occurrence.date() < today {
            // Past unacknowledged reminders are committed as missed the next
            // time they are evaluated.
            self.auto_miss(&key);
            ResolvedStatus::Missed
        } else if occurrence.date() == today
            && occurrence + Duration::hours(GRACE_WINDOW_HOURS) < now
        {
            self.auto_miss(&key);
            ResolvedStatus::Missed
        } else {
            ResolvedStatus::Pending
        };

        Some(Evaluation { occurrence, status })
    }

    /// Commits an implicit miss. Persistence failures are non-fatal: the
    /// in-memory classification stands and the write is retried on the next
    /// evaluation pass.
    fn auto_miss(&mut self, key: &str) {
        match self
            .tracker
            .set_if_absent(&mut self.entries, key, DoseStatus::Missed)
        {
            Ok(true) => info!(key, "Auto-classified occurrence as missed"),
            Ok(false) => {}
            Err(e) => warn!(key, error = %e, "Failed to persist auto-miss"),
        }
    }
}
