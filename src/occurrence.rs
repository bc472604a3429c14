//! Date and time parsing for reminder occurrences.
//!
//! Reminders store their schedule as two human-entered strings: an ISO date
//! (`YYYY-MM-DD`) and a 12-hour clock time (`H:MM AM|PM`). This module
//! combines them into a single orderable [`NaiveDateTime`] and provides the
//! strict date check used at creation time.
//!
//! # Lenient vs. strict parsing
//!
//! Downstream consumers (dashboard, tracker, scheduler) treat a
//! [`ParseError`] as non-fatal: the record is skipped for time-based logic
//! but remains visible in raw listings. Creation-time validation uses
//! [`is_valid_date`] instead, where a malformed date rejects the save
//! outright.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use thiserror::Error;

/// Storage format for reminder dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Storage format for reminder times (12-hour clock).
pub const TIME_FORMAT: &str = "%I:%M %p";

/// Errors that can occur when parsing a stored occurrence.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The date string is not a valid `YYYY-MM-DD` calendar date.
    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    /// The time string is not a valid 12-hour clock time.
    #[error("invalid time '{0}': expected H:MM AM|PM")]
    InvalidTime(String),
}

/// Combines a date string and a 12-hour time string into one timestamp.
///
/// # Errors
///
/// Returns [`ParseError`] on a malformed date, a malformed time, or a
/// semantically invalid calendar date (e.g. month 13). Callers hitting this
/// must skip the record for time-based logic while still allowing it to
/// display in raw lists.
///
/// # Examples
///
/// ```
/// use dosewatch::occurrence::parse_occurrence;
///
/// let ts = parse_occurrence("2024-01-01", "8:00 AM").unwrap();
/// assert_eq!(ts.to_string(), "2024-01-01 08:00:00");
///
/// assert!(parse_occurrence("2024-13-01", "8:00 AM").is_err());
/// assert!(parse_occurrence("2024-01-01", "25:00").is_err());
/// ```
pub fn parse_occurrence(date: &str, time: &str) -> Result<NaiveDateTime, ParseError> {
    let date = NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map_err(|_| ParseError::InvalidDate(date.to_string()))?;
    let time = NaiveTime::parse_from_str(time, TIME_FORMAT)
        .map_err(|_| ParseError::InvalidTime(time.to_string()))?;
    Ok(NaiveDateTime::new(date, time))
}

/// Strict `YYYY-MM-DD` check used at reminder creation and edit time.
///
/// A date that fails this check rejects the save with a user-facing
/// validation error, unlike the lenient skip-on-parse-failure behavior used
/// downstream.
#[must_use]
pub fn is_valid_date(text: &str) -> bool {
    NaiveDate::parse_from_str(text, DATE_FORMAT).is_ok()
}

/// Formats a date using the storage format.
#[must_use]
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Truncates a timestamp to the start of its minute.
///
/// The notification scheduler matches occurrences against the current minute
/// exactly, so seconds and sub-second precision are dropped before
/// comparison.
#[must_use]
pub fn minute_of(ts: NaiveDateTime) -> NaiveDateTime {
    ts.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}
