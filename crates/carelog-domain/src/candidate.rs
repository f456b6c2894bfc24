//! Care-log candidate - the unit the pipeline manipulates end to end

use crate::provenance::{ProvenanceIssue, OCR_RECORDER_LABEL};
use crate::{DomainError, Score, TimeSlot};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the animal a record belongs to
///
/// Always supplied by the operator, never read from the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u64")]
pub struct SubjectId(u64);

impl SubjectId {
    /// Create a subject id; zero is not a valid id
    pub fn new(value: u64) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    /// Get the raw value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl TryFrom<i64> for SubjectId {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u64::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or(DomainError::InvalidSubject(value))
    }
}

impl From<SubjectId> for u64 {
    fn from(id: SubjectId) -> Self {
        id.0
    }
}

impl std::str::FromStr for SubjectId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| format!("Invalid subject id: {}", s))
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One proposed daily-care entry in batch wire format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareLogCandidate {
    /// Animal this entry belongs to
    pub subject_id: SubjectId,

    /// Day of the care round (`YYYY-MM-DD` on the wire)
    pub log_date: NaiveDate,

    /// Care round within the day
    pub time_slot: TimeSlot,

    /// Appetite score in [1, 5]
    pub appetite_score: Score,

    /// Energy score in [1, 5]
    pub energy_score: Score,

    /// Whether the animal urinated
    pub urinated: bool,

    /// Whether the enclosure was cleaned
    pub cleaned: bool,

    /// Labelled sub-observations and free handwriting
    #[serde(default)]
    pub notes: Option<String>,

    /// Provenance label, always [`OCR_RECORDER_LABEL`]
    pub recorder_label: String,

    /// Provenance flag, always `true` for this pipeline
    pub from_paper: bool,

    /// Linked operator account; never populated by this pipeline
    #[serde(default)]
    pub recorder_id: Option<u64>,

    /// Network metadata; never populated by this pipeline
    #[serde(default)]
    pub ip_address: Option<String>,

    /// Device metadata; never populated by this pipeline
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl CareLogCandidate {
    /// Create a candidate carrying OCR provenance
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        subject_id: SubjectId,
        log_date: NaiveDate,
        time_slot: TimeSlot,
        appetite_score: Score,
        energy_score: Score,
        urinated: bool,
        cleaned: bool,
        notes: Option<String>,
    ) -> Self {
        Self {
            subject_id,
            log_date,
            time_slot,
            appetite_score,
            energy_score,
            urinated,
            cleaned,
            notes,
            recorder_label: OCR_RECORDER_LABEL.to_string(),
            from_paper: true,
            recorder_id: None,
            ip_address: None,
            user_agent: None,
        }
    }

    /// Check the provenance fields; returns the first problem found
    pub fn provenance_issue(&self) -> Option<ProvenanceIssue> {
        if !self.from_paper {
            return Some(ProvenanceIssue::NotFromPaper);
        }
        if self.recorder_label != OCR_RECORDER_LABEL {
            return Some(ProvenanceIssue::WrongRecorderLabel(self.recorder_label.clone()));
        }
        if self.recorder_id.is_some() {
            return Some(ProvenanceIssue::LinkageFieldSet("recorder_id"));
        }
        if self.ip_address.is_some() {
            return Some(ProvenanceIssue::LinkageFieldSet("ip_address"));
        }
        if self.user_agent.is_some() {
            return Some(ProvenanceIssue::LinkageFieldSet("user_agent"));
        }
        None
    }

    /// Short human-readable key: `<date> <slot>`
    pub fn key(&self) -> String {
        format!("{} {}", self.log_date.format("%Y-%m-%d"), self.time_slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CareLogCandidate {
        CareLogCandidate::new(
            SubjectId::new(12).unwrap(),
            NaiveDate::from_ymd_opt(2024, 11, 14).unwrap(),
            TimeSlot::Morning,
            Score::PRESENT,
            Score::PARTIAL,
            true,
            false,
            Some("Stool: yes".to_string()),
        )
    }

    #[test]
    fn test_new_sets_provenance() {
        let record = sample();
        assert!(record.from_paper);
        assert_eq!(record.recorder_label, OCR_RECORDER_LABEL);
        assert!(record.provenance_issue().is_none());
    }

    #[test]
    fn test_wire_format_keeps_null_keys() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["subject_id"], 12);
        assert_eq!(json["log_date"], "2024-11-14");
        assert_eq!(json["time_slot"], "morning");
        assert_eq!(json["appetite_score"], 5);
        assert_eq!(json["from_paper"], true);
        assert!(json["recorder_id"].is_null());
        assert!(json.as_object().unwrap().contains_key("user_agent"));
    }

    #[test]
    fn test_provenance_issues() {
        let mut record = sample();
        record.from_paper = false;
        assert_eq!(record.provenance_issue(), Some(ProvenanceIssue::NotFromPaper));

        let mut record = sample();
        record.recorder_label = "alice".to_string();
        assert!(matches!(
            record.provenance_issue(),
            Some(ProvenanceIssue::WrongRecorderLabel(_))
        ));

        let mut record = sample();
        record.ip_address = Some("10.0.0.1".to_string());
        assert_eq!(
            record.provenance_issue(),
            Some(ProvenanceIssue::LinkageFieldSet("ip_address"))
        );
    }

    #[test]
    fn test_subject_id_rejects_zero_and_negative() {
        assert!(SubjectId::new(0).is_none());
        assert!(serde_json::from_str::<SubjectId>("-3").is_err());
        assert!("0".parse::<SubjectId>().is_err());
        assert_eq!("12".parse::<SubjectId>().unwrap().value(), 12);
    }
}
