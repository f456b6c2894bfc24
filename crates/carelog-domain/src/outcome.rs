//! Registration outcome - the in-memory result of one registrar run

use crate::TimeSlot;
use chrono::NaiveDate;
use std::fmt;
use std::path::PathBuf;

/// Category of a per-record failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Record did not satisfy the batch schema
    Validation,

    /// Store rejected the payload
    Rejected,

    /// Store reported a conflicting existing record
    Conflict,

    /// Network failure that persisted through every retry
    Network,

    /// Attempt exceeded its time budget on every retry
    Timeout,

    /// Store refused the cached credential
    Unauthorized,
}

impl FailureKind {
    /// Short lowercase name for logs and tables
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Validation => "validation",
            FailureKind::Rejected => "rejected",
            FailureKind::Conflict => "conflict",
            FailureKind::Network => "network",
            FailureKind::Timeout => "timeout",
            FailureKind::Unauthorized => "unauthorized",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptor of one record that was attempted and not persisted
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFailure {
    /// Zero-based position in the artifact
    pub index: usize,

    /// Record date, when the entry was readable
    pub log_date: Option<NaiveDate>,

    /// Record slot, when the entry was readable
    pub time_slot: Option<TimeSlot>,

    /// Failure category
    pub kind: FailureKind,

    /// Underlying message
    pub message: String,
}

/// Overall status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Batch had no entries
    Empty,

    /// Every record persisted
    Succeeded,

    /// Some records persisted, some failed
    Partial,

    /// Nothing persisted from a non-empty batch
    Failed,
}

impl RunStatus {
    /// Short lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Empty => "empty",
            RunStatus::Succeeded => "succeeded",
            RunStatus::Partial => "partial",
            RunStatus::Failed => "failed",
        }
    }
}

/// Counts and failure detail for one batch run
#[derive(Debug, Clone, Default)]
pub struct RegistrationOutcome {
    /// Identifier of the run, for correlating logs
    pub run_id: String,

    /// Artifact the batch was read from
    pub artifact: Option<PathBuf>,

    /// Records attempted (every entry in the artifact)
    pub attempted: usize,

    /// Records the store accepted
    pub succeeded: usize,

    /// Records that were attempted and not persisted
    pub failures: Vec<RecordFailure>,

    /// Where the artifact was moved after the run
    pub archived_to: Option<PathBuf>,

    /// Whether record creation was skipped
    pub dry_run: bool,
}

impl RegistrationOutcome {
    /// Create an empty outcome for a run
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            ..Self::default()
        }
    }

    /// Record a successful attempt
    pub fn record_success(&mut self) {
        self.attempted += 1;
        self.succeeded += 1;
    }

    /// Record a failed attempt
    pub fn record_failure(&mut self, failure: RecordFailure) {
        self.attempted += 1;
        self.failures.push(failure);
    }

    /// Number of failed records
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Overall status
    pub fn status(&self) -> RunStatus {
        if self.attempted == 0 {
            RunStatus::Empty
        } else if self.failures.is_empty() {
            RunStatus::Succeeded
        } else if self.succeeded == 0 {
            RunStatus::Failed
        } else {
            RunStatus::Partial
        }
    }

    /// One-line summary, e.g. `4 attempted, 3 succeeded, 1 failed (partial)`
    pub fn summary(&self) -> String {
        let mut line = format!(
            "{} attempted, {} succeeded, {} failed ({})",
            self.attempted,
            self.succeeded,
            self.failed(),
            self.status().as_str()
        );
        if self.dry_run {
            line.push_str(" [dry run]");
        }
        line
    }
}
