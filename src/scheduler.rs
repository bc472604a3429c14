//! Notification scheduler: decides when a reminder should fire.
//!
//! Each occurrence key (`"<medicine>_<date>_<time>"`) moves through a small
//! state machine: **unseen** until its minute arrives, **pending-ack** once a
//! notification has been raised, and **acknowledged** when the user clears
//! the notification list.
//!
//! # Exact-minute matching
//!
//! A tick fires a reminder only when its occurrence equals the tick time
//! truncated to the minute. The pending set de-duplicates repeat ticks inside
//! the same minute, and an occurrence whose minute elapses between ticks
//! (interval longer than a minute, or a suspended process) never fires. That
//! is an accepted limitation of the design, kept deliberately over a
//! catch-up window.
//!
//! # Settings gating
//!
//! The `notifications` setting gates the delivery sink call entirely; the
//! `sound`/`vibration` settings only flag the produced event. The pending set
//! and badge counter always update so the visual badge stays accurate.

use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::occurrence::{minute_of, parse_occurrence};
use crate::types::{NotificationEvent, Reminder, Settings};

/// Title used for every reminder notification.
pub const NOTIFICATION_TITLE: &str = "Medicine Reminder";

/// Body used for every reminder notification.
pub const NOTIFICATION_BODY: &str = "You have a medicine to take!";

/// Fire-and-forget delivery of a notification to the user.
///
/// The engine only decides *when* a notification fires; the transport (toast,
/// desktop notification, log line) is the caller's concern and failures are
/// not observed.
pub trait NotificationSink {
    /// Delivers one notification.
    fn deliver(&self, title: &str, body: &str);
}

/// A sink that emits notifications as log lines.
///
/// Used by the daemon binary, and a reasonable default anywhere a real
/// transport is unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn deliver(&self, title: &str, body: &str) {
        info!(title, body, "Notification");
    }
}

/// Recurring-tick scheduler that raises at most one notification per
/// reminder occurrence.
///
/// Process-local and transient: the pending set is not persisted and resets
/// when the process restarts.
pub struct NotificationScheduler {
    settings: Settings,
    /// Occurrence keys surfaced this run and not yet acknowledged, in the
    /// order they fired.
    pending: Vec<String>,
}

impl NotificationScheduler {
    /// Creates a scheduler honoring the given settings.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            pending: Vec::new(),
        }
    }

    /// Evaluates one tick at `now` against the reminder list.
    ///
    /// For every reminder scheduled today whose occurrence matches `now`
    /// truncated to the minute and which has not already fired, transitions
    /// it to pending-ack, hands it to `sink` (unless notifications are
    /// disabled), and returns the raised events.
    pub fn tick(
        &mut self,
        now: NaiveDateTime,
        reminders: &[Reminder],
        sink: &dyn NotificationSink,
    ) -> Vec<NotificationEvent> {
        let this_minute = minute_of(now);
        let today = this_minute.date();
        let mut events = Vec::new();

        for reminder in reminders {
            let Ok(occurrence) = parse_occurrence(&reminder.date, &reminder.time) else {
                continue;
            };
            if occurrence.date() != today {
                continue;
            }
            // Exact-minute match, not ">=".
            if occurrence != this_minute {
                continue;
            }

            let key = reminder.alert_key();
            if self.pending.iter().any(|k| k == &key) {
                debug!(%key, "Occurrence already pending, skipping");
                continue;
            }

            self.pending.push(key);
            let event = NotificationEvent {
                medicine: reminder.medicine.clone(),
                title: NOTIFICATION_TITLE.to_string(),
                body: NOTIFICATION_BODY.to_string(),
                sound: self.settings.sound,
                vibration: self.settings.vibration,
            };

            if self.settings.notifications {
                sink.deliver(&event.title, &event.body);
            } else {
                debug!(medicine = %reminder.medicine, "Notifications disabled, badge only");
            }

            info!(medicine = %reminder.medicine, "Reminder due");
            events.push(event);
        }

        events
    }

    /// Acknowledges all pending notifications.
    ///
    /// Clears the pending set, resets the badge counter to zero, and returns
    /// the acknowledged occurrence keys in firing order.
    pub fn acknowledge(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending)
    }

    /// Number of notifications awaiting acknowledgment (the badge count).
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Medicine names for the pending notifications, in firing order.
    ///
    /// Occurrence keys are `"<medicine>_<date>_<time>"`; the name is
    /// everything before the first underscore.
    #[must_use]
    pub fn pending_medicines(&self) -> Vec<String> {
        self.pending
            .iter()
            .map(|key| key.split('_').next().unwrap_or(key).to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Sink that records every delivery for assertions.
    #[derive(Default)]
    struct RecordingSink {
        delivered: RefCell<Vec<(String, String)>>,
    }

    impl NotificationSink for RecordingSink {
        fn deliver(&self, title: &str, body: &str) {
            self.delivered
                .borrow_mut()
                .push((title.to_string(), body.to_string()));
        }
    }

    fn ts(date: &str, time: &str) -> NaiveDateTime {
        parse_occurrence(date, time).unwrap()
    }

    fn aspirin() -> Vec<Reminder> {
        vec![Reminder::new("Aspirin", "8:00 AM", "2024-01-01")]
    }

    #[test]
    fn fires_exactly_once_on_the_matching_minute() {
        let mut scheduler = NotificationScheduler::new(Settings::default());
        let sink = RecordingSink::default();
        let reminders = aspirin();

        let events = scheduler.tick(ts("2024-01-01", "8:00 AM"), &reminders, &sink);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].medicine, "Aspirin");
        assert_eq!(events[0].title, NOTIFICATION_TITLE);
        assert_eq!(scheduler.pending_count(), 1);
        assert_eq!(sink.delivered.borrow().len(), 1);

        // Same minute again: de-duplicated by the pending set.
        let events = scheduler.tick(ts("2024-01-01", "8:00 AM"), &reminders, &sink);
        assert!(events.is_empty());
        assert_eq!(scheduler.pending_count(), 1);
    }

    #[test]
    fn a_minute_elapsed_between_ticks_never_fires() {
        let mut scheduler = NotificationScheduler::new(Settings::default());
        let sink = RecordingSink::default();
        let reminders = aspirin();

        // The 8:00 minute passed while no tick ran; 8:01 does not match.
        let events = scheduler.tick(ts("2024-01-01", "8:01 AM"), &reminders, &sink);
        assert!(events.is_empty());
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn seconds_are_ignored_in_the_match() {
        let mut scheduler = NotificationScheduler::new(Settings::default());
        let sink = RecordingSink::default();

        let now = ts("2024-01-01", "8:00 AM") + chrono::Duration::seconds(42);
        let events = scheduler.tick(now, &aspirin(), &sink);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn other_dates_do_not_fire() {
        let mut scheduler = NotificationScheduler::new(Settings::default());
        let sink = RecordingSink::default();
        let reminders = vec![Reminder::new("Aspirin", "8:00 AM", "2024-01-02")];

        let events = scheduler.tick(ts("2024-01-01", "8:00 AM"), &reminders, &sink);
        assert!(events.is_empty());
    }

    #[test]
    fn unparseable_reminders_are_skipped() {
        let mut scheduler = NotificationScheduler::new(Settings::default());
        let sink = RecordingSink::default();
        let reminders = vec![Reminder::new("Mystery", "soon", "2024-01-01")];

        let events = scheduler.tick(ts("2024-01-01", "8:00 AM"), &reminders, &sink);
        assert!(events.is_empty());
    }

    #[test]
    fn disabled_notifications_skip_the_sink_but_update_the_badge() {
        let settings = Settings {
            notifications: false,
            ..Settings::default()
        };
        let mut scheduler = NotificationScheduler::new(settings);
        let sink = RecordingSink::default();

        let events = scheduler.tick(ts("2024-01-01", "8:00 AM"), &aspirin(), &sink);
        assert_eq!(events.len(), 1);
        assert_eq!(scheduler.pending_count(), 1);
        assert!(sink.delivered.borrow().is_empty());
    }

    #[test]
    fn sound_and_vibration_flags_follow_settings() {
        let settings = Settings {
            sound: false,
            vibration: true,
            ..Settings::default()
        };
        let mut scheduler = NotificationScheduler::new(settings);
        let sink = RecordingSink::default();

        let events = scheduler.tick(ts("2024-01-01", "8:00 AM"), &aspirin(), &sink);
        assert!(!events[0].sound);
        assert!(events[0].vibration);
    }

    #[test]
    fn acknowledge_clears_pending_and_returns_keys() {
        let mut scheduler = NotificationScheduler::new(Settings::default());
        let sink = RecordingSink::default();
        let reminders = vec![
            Reminder::new("Aspirin", "8:00 AM", "2024-01-01"),
            Reminder::new("Ibuprofen", "8:00 AM", "2024-01-01"),
        ];

        scheduler.tick(ts("2024-01-01", "8:00 AM"), &reminders, &sink);
        assert_eq!(scheduler.pending_count(), 2);
        assert_eq!(scheduler.pending_medicines(), vec!["Aspirin", "Ibuprofen"]);

        let keys = scheduler.acknowledge();
        assert_eq!(
            keys,
            vec![
                "Aspirin_2024-01-01_8:00 AM",
                "Ibuprofen_2024-01-01_8:00 AM"
            ]
        );
        assert_eq!(scheduler.pending_count(), 0);
        assert!(scheduler.acknowledge().is_empty());
    }

    #[test]
    fn distinct_occurrences_fire_independently() {
        let mut scheduler = NotificationScheduler::new(Settings::default());
        let sink = RecordingSink::default();
        let reminders = vec![
            Reminder::new("Aspirin", "8:00 AM", "2024-01-01"),
            Reminder::new("Aspirin", "8:00 PM", "2024-01-01"),
        ];

        let morning = scheduler.tick(ts("2024-01-01", "8:00 AM"), &reminders, &sink);
        assert_eq!(morning.len(), 1);

        let evening = scheduler.tick(ts("2024-01-01", "8:00 PM"), &reminders, &sink);
        assert_eq!(evening.len(), 1);
        assert_eq!(scheduler.pending_count(), 2);
    }
}
