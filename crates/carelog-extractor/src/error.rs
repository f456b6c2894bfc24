//! Error types for the Extractor

use carelog_domain::DomainError;
use carelog_gatekeeper::GatekeeperError;
use thiserror::Error;

/// Errors that stop an extraction run
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Oracle provider error
    #[error("Oracle error: {0}")]
    Oracle(String),

    /// Page image could not be read
    #[error("Cannot read page image {path}: {source}")]
    Image {
        /// Image path
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Page image exceeds the configured size
    #[error("Image too large: {0} bytes (max: {1})")]
    ImageTooLarge(usize, usize),

    /// Oracle call exceeded its time budget
    #[error("Oracle timeout")]
    Timeout,

    /// Oracle output is not a JSON array of records
    #[error("Invalid oracle output: {0}")]
    InvalidFormat(String),

    /// Validation error from Gatekeeper
    #[error("Validation error: {0}")]
    Validation(#[from] GatekeeperError),

    /// Staged artifact could not be written
    #[error("Staging error: {0}")]
    Staging(#[from] DomainError),

    /// Saved oracle output and staged batch are the same file
    #[error("Refusing to stage {0} over its own unvalidated input")]
    InPlace(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::InvalidFormat(e.to_string())
    }
}
