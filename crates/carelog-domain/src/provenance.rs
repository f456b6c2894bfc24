//! Provenance markers for paper-derived records

/// Recorder label stamped on every record produced by OCR import.
///
/// This is a sentinel, never a real operator's identity.
pub const OCR_RECORDER_LABEL: &str = "OCR Import";

/// Reasons a record's provenance fields are not what this pipeline emits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvenanceIssue {
    /// `from_paper` was not `true`
    NotFromPaper,

    /// `recorder_label` differs from [`OCR_RECORDER_LABEL`]
    WrongRecorderLabel(String),

    /// A linkage field (recorder id, network or device metadata) was populated
    LinkageFieldSet(&'static str),
}

impl std::fmt::Display for ProvenanceIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProvenanceIssue::NotFromPaper => write!(f, "from_paper must be true"),
            ProvenanceIssue::WrongRecorderLabel(label) => write!(
                f,
                "recorder_label '{}' must be '{}'",
                label, OCR_RECORDER_LABEL
            ),
            ProvenanceIssue::LinkageFieldSet(field) => write!(f, "{} must be null", field),
        }
    }
}
