//! Error types for registrar runs

use carelog_domain::traits::StoreError;
use carelog_domain::{RegistrationOutcome, SubjectId};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that halt a registration run
///
/// Per-record problems are never errors; they are collected in the
/// [`RegistrationOutcome`]. When one of these is returned before any record
/// was attempted, nothing was persisted and the artifact is left in place.
#[derive(Error, Debug)]
pub enum RegistrarError {
    /// Artifact missing, unreadable or not a JSON array
    #[error("Unreadable batch {path}: {reason}")]
    UnreadableBatch {
        /// Artifact path
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// Artifact name does not declare a subject and date window
    #[error("Batch {0} is not named <subject>_<start>_<end>.json; stage it with `carelog validate` or `carelog extract`")]
    UndeclaredBatch(PathBuf),

    /// Records for more than one subject in one artifact
    #[error("Batch mixes subjects {0:?}; one batch must target one subject")]
    MixedSubjects(Vec<SubjectId>),

    /// Store refused the operator credentials
    #[error("Authentication failed: {0}")]
    Authentication(StoreError),

    /// Batch subject does not exist in the store
    #[error("Unknown subject {0}")]
    UnknownSubject(SubjectId),

    /// Subject lookup call failed
    #[error("Subject lookup failed: {0}")]
    SubjectLookup(StoreError),

    /// Every record was attempted but the artifact could not be archived
    #[error("Batch registered ({}) but not archived: {reason}", outcome.summary())]
    Archive {
        /// Result of the completed run
        outcome: Box<RegistrationOutcome>,
        /// What went wrong
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
