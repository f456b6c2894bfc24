//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Page extraction failed
    #[error(transparent)]
    Page(#[from] carelog_pages::PageError),

    /// Record extraction or validation failed
    #[error(transparent)]
    Extractor(#[from] carelog_extractor::ExtractorError),

    /// Oracle provider could not be created
    #[error("Oracle error: {0}")]
    Oracle(#[from] carelog_llm::LlmError),

    /// Record store client could not be created
    #[error("Store client error: {0}")]
    Sdk(#[from] carelog_sdk::SdkError),

    /// Registration run halted
    #[error(transparent)]
    Registrar(#[from] carelog_registrar::RegistrarError),

    /// Staging watcher failed
    #[error(transparent)]
    Watcher(#[from] carelog_watcher::WatcherError),

    /// Registration finished without persisting any record
    #[error("Registration failed: {0}")]
    RunFailed(String),

    /// Domain error
    #[error(transparent)]
    Domain(#[from] carelog_domain::DomainError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}
