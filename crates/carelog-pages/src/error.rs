//! Page extraction errors

use carelog_domain::DomainError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that stop a page extraction run
///
/// Every variant is fatal: the source stays where it is for a manual retry.
#[derive(Error, Debug)]
pub enum PageError {
    /// Source document does not exist
    #[error("Source not found: {0}")]
    SourceMissing(PathBuf),

    /// Source exists but cannot be opened
    #[error("Cannot read source {path}: {source}")]
    Unreadable {
        /// Source path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Source extension is not accepted
    #[error("Unsupported file type for {path}: expected one of {expected}")]
    UnsupportedExtension {
        /// Source path
        path: PathBuf,
        /// Accepted extensions, comma separated
        expected: String,
    },

    /// Renderer executable missing
    #[error("Renderer '{0}' not found; is poppler-utils installed?")]
    RendererNotFound(String),

    /// Renderer exited unsuccessfully
    #[error("Conversion failed ({status}): {stderr}")]
    ConversionFailed {
        /// Exit status description
        status: String,
        /// Renderer diagnostics
        stderr: String,
    },

    /// Renderer exceeded its time budget
    #[error("Conversion timed out after {0:?}")]
    Timeout(Duration),

    /// Renderer reported success without producing an image
    #[error("Renderer produced no image at {0}")]
    NoOutput(PathBuf),

    /// Staging I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Archiving error
    #[error("Archive error: {0}")]
    Archive(#[from] DomainError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
