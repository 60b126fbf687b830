//! Error types for lhetab

use thiserror::Error;

/// lhetab error type
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration or schema
    #[error("Validation error: {0}")]
    Validation(String),

    /// Event reader fault (malformed or truncated input)
    #[error("Input error: {0}")]
    Input(String),

    /// Event-record store fault
    #[error("Store error: {0}")]
    Store(String),

    /// A species bucket holds more particles than one row can carry.
    #[error(
        "event {event}: species '{species}' has {count} particles, row capacity is {capacity}"
    )]
    CapacityExceeded {
        /// 1-based event ordinal.
        event: u64,
        /// Species name.
        species: String,
        /// Number of particles classified into the bucket.
        count: usize,
        /// Configured per-species row capacity.
        capacity: usize,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
