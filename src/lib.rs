//! DoseWatch - medicine reminder and adherence tracking engine.
//!
//! This crate is the reminder evaluation core of a personal medicine
//! tracker: it decides which reminders are due, upcoming, or overdue,
//! derives dashboard aggregates, auto-classifies unacknowledged reminders as
//! missed after a grace window, and persists adherence state as whole-file
//! JSON records. UI concerns (screens, dialogs, theming) live outside this
//! crate and call into the views it exposes.
//!
//! # Overview
//!
//! - [`engine::AdherenceEngine`] reconciles the reminder list against the
//!   adherence map and produces the dashboard and tracker views.
//! - [`scheduler::NotificationScheduler`] runs on a fixed tick and raises at
//!   most one notification per reminder occurrence.
//! - [`store`] holds the three durable records (reminders, tracker map,
//!   settings), all corruption-tolerant whole-file JSON.
//! - [`occurrence`] parses the stored date and 12-hour time strings into
//!   orderable timestamps.
//!
//! # Modules
//!
//! - [`types`]: Reminder, adherence status, settings, and notification types
//! - [`occurrence`]: Date/time parsing and validation
//! - [`store`]: Whole-file JSON persistence
//! - [`engine`]: Status resolution and derived views
//! - [`scheduler`]: Due-notification state machine
//! - [`config`]: Configuration from environment variables
//! - [`error`]: Error types for engine operations

pub mod config;
pub mod engine;
pub mod error;
pub mod occurrence;
pub mod scheduler;
pub mod store;
pub mod types;

pub use config::Config;
pub use engine::{
    AdherenceEngine, DashboardView, NextReminder, ResolvedStatus, TrackerItem, TrackerView,
    GRACE_WINDOW_HOURS,
};
pub use error::{DoseWatchError, Result, ValidationError};
pub use occurrence::{is_valid_date, parse_occurrence, ParseError};
pub use scheduler::{LogSink, NotificationScheduler, NotificationSink};
pub use store::{ReminderStore, SettingsStore, StoreError, TrackerStore};
pub use types::{DoseStatus, NotificationEvent, Reminder, Settings};
