//! Import batch artifacts exchanged between pipeline phases

use crate::{CareLogCandidate, DateWindow, DomainError, SubjectId};
use chrono::NaiveDate;
use serde_json::Value;
use std::path::Path;

const NAME_DATE_FORMAT: &str = "%Y-%m-%d";

/// Subject and date window a staged batch was validated against
///
/// Carried in the artifact name, `<subject>_<start>_<end>.json`, so the
/// registrar can re-check records against what the operator declared
/// rather than against whatever the records themselves claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchDeclaration {
    /// Operator-supplied subject
    pub subject: SubjectId,
    /// Operator-supplied inclusive window
    pub window: DateWindow,
}

impl BatchDeclaration {
    /// Create a declaration
    pub fn new(subject: SubjectId, window: DateWindow) -> Self {
        Self { subject, window }
    }

    /// File stem encoding this declaration
    pub fn stem(&self) -> String {
        format!(
            "{}_{}_{}",
            self.subject,
            self.window.start().format(NAME_DATE_FORMAT),
            self.window.end().format(NAME_DATE_FORMAT)
        )
    }

    /// Staged artifact file name
    pub fn file_name(&self) -> String {
        format!("{}.json", self.stem())
    }

    /// Read the declaration back from an artifact path
    ///
    /// Returns `None` unless the stem is exactly a positive subject id and
    /// two ordered dates.
    pub fn from_path(path: &Path) -> Option<Self> {
        let stem = path.file_stem()?.to_str()?;
        let mut parts = stem.split('_');
        let subject = parts.next()?.parse::<SubjectId>().ok()?;
        let start = NaiveDate::parse_from_str(parts.next()?, NAME_DATE_FORMAT).ok()?;
        let end = NaiveDate::parse_from_str(parts.next()?, NAME_DATE_FORMAT).ok()?;
        if parts.next().is_some() {
            return None;
        }
        let window = DateWindow::new(start, end).ok()?;
        Some(Self { subject, window })
    }
}

/// One element of a staged batch artifact
///
/// A staged batch can be hand-edited by an operator, so each element is
/// parsed independently and a malformed element never hides the others.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEntry {
    /// Element matched the wire schema
    Record(CareLogCandidate),

    /// Element could not be read as a care-log record
    Malformed {
        /// Why deserialization failed
        reason: String,
        /// The element as found in the artifact
        raw: Value,
    },
}

impl BatchEntry {
    /// The parsed record, if any
    pub fn record(&self) -> Option<&CareLogCandidate> {
        match self {
            BatchEntry::Record(record) => Some(record),
            BatchEntry::Malformed { .. } => None,
        }
    }
}

/// A JSON array of care-log records for one subject and one date window
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportBatch {
    entries: Vec<BatchEntry>,
}

impl ImportBatch {
    /// Build a batch from already-validated records
    pub fn from_records(records: Vec<CareLogCandidate>) -> Self {
        Self {
            entries: records.into_iter().map(BatchEntry::Record).collect(),
        }
    }

    /// Parse an artifact. Fails only when the text is not a JSON array.
    pub fn from_json(json: &str) -> Result<Self, DomainError> {
        let value: Value = serde_json::from_str(json)?;
        let items = match value {
            Value::Array(items) => items,
            other => {
                return Err(DomainError::InvalidBatch(format!(
                    "expected a JSON array, found {}",
                    json_kind(&other)
                )))
            }
        };

        let entries = items
            .into_iter()
            .map(|item| match serde_json::from_value::<CareLogCandidate>(item.clone()) {
                Ok(record) => BatchEntry::Record(record),
                Err(e) => BatchEntry::Malformed {
                    reason: e.to_string(),
                    raw: item,
                },
            })
            .collect();

        Ok(Self { entries })
    }

    /// Read and parse an artifact from disk
    pub fn load(path: &Path) -> Result<Self, DomainError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Serialize the well-formed records as a pretty JSON array
    pub fn to_json_pretty(&self) -> Result<String, DomainError> {
        let records: Vec<&CareLogCandidate> = self.records().collect();
        Ok(serde_json::to_string_pretty(&records)?)
    }

    /// All entries in artifact order
    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    /// Well-formed records in artifact order
    pub fn records(&self) -> impl Iterator<Item = &CareLogCandidate> {
        self.entries.iter().filter_map(BatchEntry::record)
    }

    /// Number of entries, malformed ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the artifact holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct subject ids across well-formed records, in first-seen order
    pub fn subjects(&self) -> Vec<SubjectId> {
        let mut subjects: Vec<SubjectId> = Vec::new();
        for record in self.records() {
            if !subjects.contains(&record.subject_id) {
                subjects.push(record.subject_id);
            }
        }
        subjects
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Score, TimeSlot};
    use chrono::NaiveDate;

    fn record(day: u32, slot: TimeSlot) -> CareLogCandidate {
        CareLogCandidate::new(
            SubjectId::new(12).unwrap(),
            NaiveDate::from_ymd_opt(2024, 11, day).unwrap(),
            slot,
            Score::PRESENT,
            Score::PRESENT,
            true,
            true,
            None,
        )
    }

    #[test]
    fn test_round_trip_keeps_order() {
        let batch = ImportBatch::from_records(vec![
            record(14, TimeSlot::Morning),
            record(14, TimeSlot::Evening),
        ]);
        let json = batch.to_json_pretty().unwrap();
        let parsed = ImportBatch::from_json(&json).unwrap();
        assert_eq!(parsed, batch);
        assert_eq!(parsed.records().nth(1).unwrap().time_slot, TimeSlot::Evening);
    }

    #[test]
    fn test_malformed_entry_does_not_hide_others() {
        let json = r#"[
            {"subject_id": 12, "log_date": "2024-11-14", "time_slot": "morning",
             "appetite_score": 5, "energy_score": 5, "urinated": true, "cleaned": true,
             "notes": null, "recorder_label": "OCR Import", "from_paper": true},
            {"subject_id": 12, "log_date": "2024-11-14", "time_slot": "noon",
             "appetite_score": 9, "energy_score": 5, "urinated": true, "cleaned": true,
             "notes": null, "recorder_label": "OCR Import", "from_paper": true}
        ]"#;
        let batch = ImportBatch::from_json(json).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.records().count(), 1);
        assert!(matches!(batch.entries()[1], BatchEntry::Malformed { .. }));
    }

    #[test]
    fn test_non_array_is_rejected() {
        let err = ImportBatch::from_json(r#"{"subject_id": 12}"#).unwrap_err();
        assert!(err.to_string().contains("an object"));
        assert!(ImportBatch::from_json("not json").is_err());
    }

    #[test]
    fn test_declaration_from_path() {
        let declared = BatchDeclaration::from_path(Path::new("staged-batches/12_2024-11-14_2024-11-20.json")).unwrap();
        assert_eq!(declared.subject.value(), 12);
        assert_eq!(declared.window.days(), 7);
        assert_eq!(declared.file_name(), "12_2024-11-14_2024-11-20.json");
    }

    #[test]
    fn test_undeclared_names() {
        for name in [
            "batch.json",
            "0_2024-11-14_2024-11-20.json",
            "12_2024-11-20_2024-11-14.json",
            "12_2024-11-14.json",
            "12_2024-11-14_2024-11-20_copy.json",
            "12_14-11-2024_20-11-2024.json",
        ] {
            assert_eq!(BatchDeclaration::from_path(Path::new(name)), None, "{}", name);
        }
    }

    #[test]
    fn test_subjects() {
        let mut other = record(15, TimeSlot::Noon);
        other.subject_id = SubjectId::new(7).unwrap();
        let batch = ImportBatch::from_records(vec![
            record(14, TimeSlot::Morning),
            other,
            record(15, TimeSlot::Morning),
        ]);
        let ids: Vec<u64> = batch.subjects().iter().map(|s| s.value()).collect();
        assert_eq!(ids, vec![12, 7]);
    }
}
