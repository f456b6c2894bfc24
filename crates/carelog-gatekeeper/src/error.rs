//! Gatekeeper error types

use thiserror::Error;

/// Errors that stop validation of a whole batch
///
/// Problems with individual records are never errors; they end up in
/// [`crate::ValidationReport::rejected`].
#[derive(Error, Debug)]
pub enum GatekeeperError {
    /// Oracle output is not a JSON array
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
