//! Core record types for reminders, adherence, and notifications.
//!
//! These are the durable and wire-facing shapes of the engine: the reminder
//! record, the adherence status enum stored in the tracker map, the typed
//! settings record, and the notification event handed to delivery sinks.
//! All persisted types serialize to snake_case JSON.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::occurrence;

/// A single scheduled medicine reminder.
///
/// Each reminder is one date+time occurrence (no recurrence rules). The
/// stable `id` is generated at creation time and is the identity used for
/// edits and deletes; the position in the stored list is only a display/sort
/// artifact and shifts when earlier entries are removed.
///
/// Legacy records persisted without an `id` are assigned a fresh one on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// Stable identifier, generated at creation time.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    /// Medicine name (non-empty).
    pub medicine: String,

    /// 12-hour clock time string, e.g. `8:00 AM`.
    pub time: String,

    /// ISO calendar date string, e.g. `2024-01-01`.
    pub date: String,
}

impl Reminder {
    /// Creates a reminder with a freshly generated id.
    #[must_use]
    pub fn new(medicine: impl Into<String>, time: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            medicine: medicine.into(),
            time: time.into(),
            date: date.into(),
        }
    }

    /// Validates user input at creation/edit time.
    ///
    /// All three fields must be non-empty and the date must be a strict
    /// `YYYY-MM-DD` calendar date. A malformed time is tolerated here (the
    /// record saves but is excluded from time-based aggregation downstream).
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] describing the first failing field; the
    /// caller surfaces it to the user and blocks the save.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.medicine.trim().is_empty() {
            return Err(ValidationError::EmptyField("medicine"));
        }
        if self.time.trim().is_empty() {
            return Err(ValidationError::EmptyField("time"));
        }
        if self.date.trim().is_empty() {
            return Err(ValidationError::EmptyField("date"));
        }
        if !occurrence::is_valid_date(&self.date) {
            return Err(ValidationError::InvalidDate(self.date.clone()));
        }
        Ok(())
    }

    /// Returns the tracker-map key for this reminder's occurrence.
    #[must_use]
    pub fn dose_key(&self) -> String {
        dose_key(&self.medicine, &self.date)
    }

    /// Returns the finer-grained key used to de-duplicate notifications.
    #[must_use]
    pub fn alert_key(&self) -> String {
        format!("{}_{}_{}", self.medicine, self.date, self.time)
    }
}

/// Builds the tracker-map key `"<medicine>_<date>"`.
#[must_use]
pub fn dose_key(medicine: &str, date: &str) -> String {
    format!("{medicine}_{date}")
}

/// Terminal adherence status stored in the tracker map.
///
/// Once a key is set to either value it is never overwritten
/// (first-write-wins).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoseStatus {
    /// The user confirmed taking the dose.
    Taken,
    /// The dose was missed, either explicitly or via the auto-miss rule.
    Missed,
}

impl fmt::Display for DoseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Taken => write!(f, "taken"),
            Self::Missed => write!(f, "missed"),
        }
    }
}

impl FromStr for DoseStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "taken" => Ok(Self::Taken),
            "missed" => Ok(Self::Missed),
            other => Err(ValidationError::InvalidStatus(other.to_string())),
        }
    }
}

/// User preferences gating notification delivery.
///
/// Missing fields default on load, so older settings files (and an absent
/// file) deserialize cleanly. The booleans gate whether audible/haptic
/// effects accompany a notification; the visual badge always updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Play a sound when a reminder fires.
    pub sound: bool,

    /// Vibrate when a reminder fires.
    pub vibration: bool,

    /// Master switch for handing events to the delivery sink.
    pub notifications: bool,

    /// Dark mode preference (consumed by the UI layer only).
    pub dark_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound: true,
            vibration: true,
            notifications: true,
            dark_mode: false,
        }
    }
}

/// A notification raised by the scheduler for a due reminder.
///
/// Delivery is fire-and-forget; the event also carries the settings-derived
/// flags so a sink can decide which effects to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    /// Medicine the reminder is for.
    pub medicine: String,

    /// Notification title.
    pub title: String,

    /// Notification body.
    pub body: String,

    /// Whether an audible effect should accompany delivery.
    pub sound: bool,

    /// Whether a haptic effect should accompany delivery.
    pub vibration: bool,
}
