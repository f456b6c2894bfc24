//! Request and response types for extraction

use carelog_domain::{BatchDeclaration, DateWindow, SubjectId};
use carelog_gatekeeper::{RejectedRecord, ValidationContext, ValidationReport};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

/// Request to extract care-log records from one page image
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    /// Page image produced by the page extractor
    pub image_path: PathBuf,

    /// Operator-supplied subject
    pub subject: SubjectId,

    /// Operator-supplied inclusive date window
    pub window: DateWindow,

    /// Where the staged batch is written
    pub output_path: PathBuf,
}

impl ExtractionRequest {
    /// Validation constants for this request
    pub fn context(&self) -> ValidationContext {
        ValidationContext::new(self.subject, self.window)
    }
}

/// Result of an extraction operation
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Valid, rejected and ambiguous records
    pub report: ValidationReport,

    /// Staged batch artifact, when one was written
    pub staged_path: Option<PathBuf>,

    /// Rejected-records report, when one was written
    pub rejected_path: Option<PathBuf>,

    /// Metadata about the extraction
    pub metadata: ExtractionMetadata,
}

/// Metadata about an extraction operation
#[derive(Debug, Clone)]
pub struct ExtractionMetadata {
    /// Image or oracle-output file the records came from
    pub source: PathBuf,

    /// When extraction finished
    pub timestamp: DateTime<Utc>,

    /// Name of the oracle model, `None` when validating saved output
    pub model_name: Option<String>,

    /// Elements returned by the oracle
    pub total_records: usize,

    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

/// Default staged batch file name: `<subject>_<start>_<end>.json`
pub fn default_batch_name(subject: SubjectId, window: &DateWindow) -> String {
    BatchDeclaration::new(subject, *window).file_name()
}

/// Default file for raw oracle output: `<subject>_<start>_<end>.oracle.json`
///
/// Kept out of the staged-batch naming scheme so nothing registers it.
pub fn oracle_output_name(subject: SubjectId, window: &DateWindow) -> String {
    format!("{}.oracle.json", BatchDeclaration::new(subject, *window).stem())
}

/// Path of the rejected-records report for a staged batch
pub fn rejected_path(batch_path: &Path, dir: &Path) -> PathBuf {
    let stem = batch_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "batch".to_string());
    dir.join(format!("{}.rejected.json", stem))
}

/// JSON form of the rejected records, for operator review
pub(crate) fn rejected_to_json(rejected: &[RejectedRecord]) -> Value {
    Value::Array(
        rejected
            .iter()
            .map(|r| {
                json!({
                    "index": r.index,
                    "reasons": r.reasons.iter().map(|reason| reason.to_string()).collect::<Vec<_>>(),
                    "record": r.raw,
                })
            })
            .collect(),
    )
}
