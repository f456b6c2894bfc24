//! Error types for the domain layer

use thiserror::Error;

/// Errors raised by domain constructors and staging helpers
#[derive(Error, Debug)]
pub enum DomainError {
    /// Subject identifiers must be positive
    #[error("Invalid subject id: {0}")]
    InvalidSubject(i64),

    /// Score outside [1, 5]
    #[error("Score {0} out of range [1, 5]")]
    InvalidScore(i64),

    /// Unknown time-slot token
    #[error("Invalid time slot: {0}")]
    InvalidTimeSlot(String),

    /// Date window with start after end
    #[error("Invalid date window: {start} is after {end}")]
    InvalidWindow {
        /// First day of the window
        start: chrono::NaiveDate,
        /// Last day of the window
        end: chrono::NaiveDate,
    },

    /// Batch artifact is not a JSON array
    #[error("Invalid batch artifact: {0}")]
    InvalidBatch(String),

    /// File system error while staging or relocating an artifact
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
