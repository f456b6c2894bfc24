//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the pipeline and its external
//! collaborators. Implementations live in other crates.

use crate::{CareLogCandidate, SubjectId};
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Operator credentials for the record store
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account name
    pub username: String,
    /// Account password
    pub password: String,
}

impl Credentials {
    /// Create a credential pair
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Bearer credential returned by authentication, valid for one run
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wrap a raw bearer token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token for an `Authorization: Bearer` header
    pub fn bearer(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// A subject known to the record store
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Subject {
    /// Subject identifier
    pub id: u64,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
}

/// Acknowledgement of a created record
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedRecord {
    /// Store-assigned identifier
    pub id: Option<u64>,
}

/// Errors reported by a record store
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Credentials rejected or bearer token refused
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Store reports an existing conflicting record
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Store rejected the payload
    #[error("Rejected (HTTP {status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Body or message returned by the store
        message: String,
    },

    /// Network failure or server-side error that may succeed on retry
    #[error("Transient failure: {0}")]
    Transient(String),

    /// Request exceeded its time budget
    #[error("Request timed out")]
    Timeout,

    /// Response body did not match the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl StoreError {
    /// Whether a retry may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Transient(_) | StoreError::Timeout)
    }
}

/// The external record store the registrar commits batches to
///
/// Implemented by `carelog-sdk` over HTTP.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Exchange operator credentials for a bearer credential
    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthToken, StoreError>;

    /// List every subject the store knows about
    async fn list_subjects(&self, token: &AuthToken) -> Result<Vec<Subject>, StoreError>;

    /// Create one care-log record
    async fn create_record(
        &self,
        token: &AuthToken,
        record: &CareLogCandidate,
    ) -> Result<CreatedRecord, StoreError>;

    /// Whether `subject` exists in the store
    async fn subject_exists(&self, token: &AuthToken, subject: SubjectId) -> Result<bool, StoreError> {
        let subjects = self.list_subjects(token).await?;
        Ok(subjects.iter().any(|s| s.id == subject.value()))
    }
}

/// The external multimodal extraction oracle
///
/// Implemented by the infrastructure layer (`carelog-llm`)
#[async_trait]
pub trait OracleProvider: Send + Sync {
    /// Error type for oracle operations
    type Error: fmt::Display + Send;

    /// Analyse `image` under the instructions in `prompt`, returning raw text
    async fn analyze(&self, prompt: &str, image: &[u8]) -> Result<String, Self::Error>;

    /// Name of the model behind the oracle, for logs
    fn model_name(&self) -> &str;
}
