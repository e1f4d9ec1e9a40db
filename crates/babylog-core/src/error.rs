//! Core error types for babylog-core.
//!
//! Every error here is local and recoverable: a failed load falls back to
//! defaults, a failed save is surfaced to the user as retryable, a rejected
//! import leaves the current state untouched, and a pathological recurrence
//! deactivates the offending reminder. There is no fatal class.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for babylog-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to read the persisted document
    #[error("Failed to read state from {path}: {message}")]
    ReadFailed { path: PathBuf, message: String },

    /// Failed to write the persisted document
    #[error("Failed to write state to {path}: {message}")]
    WriteFailed { path: PathBuf, message: String },

    /// The storage medium is full
    #[error("Storage quota exceeded writing to {path}")]
    QuotaExceeded { path: PathBuf },

    /// The data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDirUnavailable(String),
}

/// Validation errors for imported documents and record mutations.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// The import document is not a JSON object
    #[error("Import document is not an object")]
    NotAnObject,

    /// The import document carries neither records nor reminders
    #[error("Import document has neither a records nor a reminders array")]
    NoImportableData,

    /// A record entry is structurally invalid
    #[error("Record at index {index} is missing '{field}'")]
    BadRecord { index: usize, field: &'static str },

    /// A reminder entry is structurally invalid
    #[error("Reminder at index {index} is missing '{field}'")]
    BadReminder { index: usize, field: &'static str },

    /// A sleep interval is already open; it must be completed first
    #[error("A sleep started at {start_time} is still in progress")]
    OpenSleepExists { start_time: i64 },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
