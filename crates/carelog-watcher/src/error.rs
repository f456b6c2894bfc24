//! Error types for the staging watcher

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while watching the staging area
#[derive(Error, Debug)]
pub enum WatcherError {
    /// Staging root does not exist
    #[error("Staging root not found: {0}")]
    RootMissing(PathBuf),

    /// Trigger pattern failed to compile
    #[error("Invalid trigger pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// Pattern as configured
        pattern: String,
        /// Compiler message
        reason: String,
    },

    /// File system notification backend error
    #[error("Watch error: {0}")]
    Notify(#[from] notify::Error),

    /// A phase handler failed for one file
    #[error("Dispatch failed: {0}")]
    Dispatch(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
