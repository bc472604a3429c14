//! Error types for the DoseWatch engine.
//!
//! Nothing in this crate is fatal to the process: malformed stored records
//! are skipped, corrupt storage degrades to an empty collection, and stale
//! references surface as recoverable errors. This module defines the
//! user-facing validation errors and the top-level aggregate error used by
//! the binary.

use thiserror::Error;

use crate::config::ConfigError;
use crate::occurrence::ParseError;
use crate::store::StoreError;

/// Bad user input at reminder creation or edit time.
///
/// Surfaced directly to the user and blocks the save, unlike [`ParseError`]
/// which is logged and skipped downstream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was left empty.
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    /// The date is not a strict `YYYY-MM-DD` calendar date.
    #[error("invalid date format '{0}': use YYYY-MM-DD")]
    InvalidDate(String),

    /// The status string is neither `taken` nor `missed`.
    #[error("invalid status '{0}': expected 'taken' or 'missed'")]
    InvalidStatus(String),
}

/// Errors that can occur during engine operations.
#[derive(Error, Debug)]
pub enum DoseWatchError {
    /// User input failed creation/edit validation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A stored occurrence could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// A store operation failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// A specialized `Result` type for engine operations.
pub type Result<T> = std::result::Result<T, DoseWatchError>;
