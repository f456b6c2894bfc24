//! Record validation and mapping logic

use crate::mapping::{
    has_note_labels, mark_to_bool, mark_to_score, observation_value, read_mark, time_label_to_slot,
    MarkReading, NoteBuilder, FREE_NOTE_LABEL, MEDICATION_LABEL, STOOL_LABEL, VOMIT_LABEL,
};
use crate::{GatekeeperError, ValidationConfig};
use carelog_domain::{BatchDeclaration, CareLogCandidate, DateWindow, Score, SubjectId, TimeSlot};
use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info, warn};

const DATE_KEYS: &[&str] = &["log_date", "date"];
const SLOT_KEYS: &[&str] = &["time_slot", "time_label"];
const APPETITE_KEYS: &[&str] = &["appetite_score", "appetite"];
const ENERGY_KEYS: &[&str] = &["energy_score", "energy"];
const URINATED_KEYS: &[&str] = &["urinated", "urination"];
const CLEANED_KEYS: &[&str] = &["cleaned", "cleaning"];
const FREE_TEXT_KEYS: &[&str] = &["memo", "free_note"];
const NOTES_KEYS: &[&str] = &["notes"];

const OBSERVATIONS: [(&str, &[&str]); 3] = [
    (STOOL_LABEL, &["defecation", "stool"]),
    (VOMIT_LABEL, &["vomiting", "vomit"]),
    (MEDICATION_LABEL, &["medication"]),
];

/// Operator-supplied constants for one run
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext {
    /// Subject every record is attributed to
    pub subject: SubjectId,

    /// Inclusive window every record date must fall in
    pub window: DateWindow,
}

impl ValidationContext {
    /// Create a context
    pub fn new(subject: SubjectId, window: DateWindow) -> Self {
        Self { subject, window }
    }
}

/// Reasons for rejecting a record
#[derive(Debug, Clone, PartialEq)]
pub enum RejectionReason {
    /// Element is not a JSON object
    NotAnObject,

    /// Required field absent
    MissingField(&'static str),

    /// Date not parseable as a calendar date
    InvalidDate(String),

    /// Date outside the declared window
    OutOfWindow {
        /// Proposed date
        date: NaiveDate,
        /// Declared window
        window: DateWindow,
    },

    /// Time label outside the three known labels
    UnknownTimeLabel(String),

    /// Score not an integer in [1, 5]
    ScoreOutOfRange {
        /// Offending field
        field: &'static str,
        /// Value as found
        value: String,
    },

    /// Value of the wrong JSON type for a boolean field
    NotBoolean {
        /// Offending field
        field: &'static str,
        /// Value as found
        value: String,
    },

    /// Aggregated notes longer than allowed
    NotesTooLong {
        /// Actual length in characters
        length: usize,
        /// Configured maximum
        max: usize,
    },

    /// Same date and slot already present earlier in the batch
    DuplicateSlot {
        /// Date of the duplicate
        date: NaiveDate,
        /// Slot of the duplicate
        slot: TimeSlot,
    },

    /// Staged record attributed to another subject than the batch
    SubjectMismatch {
        /// Subject of the batch
        expected: SubjectId,
        /// Subject found on the record
        found: SubjectId,
    },

    /// Provenance fields altered on a staged record
    Provenance(String),
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::NotAnObject => write!(f, "record is not a JSON object"),
            RejectionReason::MissingField(field) => write!(f, "missing required field '{}'", field),
            RejectionReason::InvalidDate(value) => write!(f, "'{}' is not a calendar date", value),
            RejectionReason::OutOfWindow { date, window } => {
                write!(f, "date {} is outside {}", date.format("%Y-%m-%d"), window)
            }
            RejectionReason::UnknownTimeLabel(label) => write!(f, "unrecognised time label '{}'", label),
            RejectionReason::ScoreOutOfRange { field, value } => {
                write!(f, "{} '{}' is not an integer in [1, 5]", field, value)
            }
            RejectionReason::NotBoolean { field, value } => {
                write!(f, "{} '{}' is not a boolean mark", field, value)
            }
            RejectionReason::NotesTooLong { length, max } => {
                write!(f, "notes are {} characters (max {})", length, max)
            }
            RejectionReason::DuplicateSlot { date, slot } => {
                write!(f, "duplicate entry for {} {}", date.format("%Y-%m-%d"), slot)
            }
            RejectionReason::SubjectMismatch { expected, found } => {
                write!(f, "subject {} does not match batch subject {}", found, expected)
            }
            RejectionReason::Provenance(issue) => write!(f, "provenance: {}", issue),
        }
    }
}

/// A record that failed one or more checks
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRecord {
    /// Zero-based index in the oracle output
    pub index: usize,

    /// Every check the record failed
    pub reasons: Vec<RejectionReason>,

    /// The record as proposed by the oracle
    pub raw: Value,
}

impl RejectedRecord {
    /// All reasons joined into one line
    pub fn reason_text(&self) -> String {
        self.reasons
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// An ambiguity resolved by a conservative default
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingWarning {
    /// Zero-based index in the oracle output
    pub index: usize,

    /// Field the ambiguity was found in
    pub field: &'static str,

    /// What was found and what was assumed
    pub message: String,
}

/// Result of validating an oracle batch
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Records satisfying the full schema, in input order
    pub valid: Vec<CareLogCandidate>,

    /// Records moved aside with reasons, in input order
    pub rejected: Vec<RejectedRecord>,

    /// Ambiguities mapped to defaults
    pub warnings: Vec<MappingWarning>,
}

impl ValidationReport {
    /// Number of records examined
    pub fn total(&self) -> usize {
        self.valid.len() + self.rejected.len()
    }

    /// Whether every record passed without ambiguity
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty() && self.warnings.is_empty()
    }
}

/// The Gatekeeper maps and validates oracle records before staging
pub struct Gatekeeper {
    config: ValidationConfig,
}

impl Gatekeeper {
    /// Create a new Gatekeeper with the given configuration
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Create a Gatekeeper with default configuration
    pub fn default_config() -> Self {
        Self::new(ValidationConfig::default())
    }

    /// Active configuration
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate an oracle response that must be a JSON array
    pub fn validate_json(
        &self,
        raw: &Value,
        context: &ValidationContext,
    ) -> Result<ValidationReport, GatekeeperError> {
        let items = raw
            .as_array()
            .ok_or_else(|| GatekeeperError::InvalidInput("expected a JSON array of records".to_string()))?;
        Ok(self.validate_batch(items, context))
    }

    /// Validate every record independently
    ///
    /// A failing record is moved to the rejected set; the remaining records
    /// are still processed.
    pub fn validate_batch(&self, items: &[Value], context: &ValidationContext) -> ValidationReport {
        let mut report = ValidationReport::default();
        let mut seen: HashSet<(NaiveDate, TimeSlot)> = HashSet::new();

        for (index, item) in items.iter().enumerate() {
            let mut warnings = Vec::new();
            match self.validate_record(index, item, context, &mut warnings) {
                Ok(record) => {
                    let key = (record.log_date, record.time_slot);
                    if !seen.insert(key) {
                        if self.config.reject_duplicate_slots {
                            warn!("Record {} rejected: duplicate {}", index, record.key());
                            report.rejected.push(RejectedRecord {
                                index,
                                reasons: vec![RejectionReason::DuplicateSlot {
                                    date: record.log_date,
                                    slot: record.time_slot,
                                }],
                                raw: item.clone(),
                            });
                            report.warnings.extend(warnings);
                            continue;
                        }
                        warn!("Record {} repeats {}", index, record.key());
                        warnings.push(MappingWarning {
                            index,
                            field: "time_slot",
                            message: format!("{} appears more than once in the batch", record.key()),
                        });
                    }
                    report.valid.push(record);
                }
                Err(reasons) => {
                    let rejected = RejectedRecord {
                        index,
                        reasons,
                        raw: item.clone(),
                    };
                    warn!("Record {} rejected: {}", index, rejected.reason_text());
                    report.rejected.push(rejected);
                }
            }
            report.warnings.extend(warnings);
        }

        info!(
            "Validated {} records for subject {} over {}: {} valid, {} rejected, {} warnings",
            report.total(),
            context.subject,
            context.window,
            report.valid.len(),
            report.rejected.len(),
            report.warnings.len()
        );

        report
    }

    /// Map and validate a single oracle record
    fn validate_record(
        &self,
        index: usize,
        item: &Value,
        context: &ValidationContext,
        warnings: &mut Vec<MappingWarning>,
    ) -> Result<CareLogCandidate, Vec<RejectionReason>> {
        let obj = item.as_object().ok_or_else(|| vec![RejectionReason::NotAnObject])?;
        let mut reasons = Vec::new();

        // 1. Identity is never taken from the oracle
        self.check_oracle_subject(index, obj, context, warnings);
        if obj.get("from_paper").and_then(Value::as_bool) == Some(false) {
            debug!("Record {}: oracle set from_paper=false, overriding", index);
        }

        // 2. Date and window
        let log_date = match required(obj, DATE_KEYS, "log_date") {
            Ok(value) => match self.read_date(value) {
                Ok(date) if context.window.contains(date) => Some(date),
                Ok(date) => {
                    reasons.push(RejectionReason::OutOfWindow {
                        date,
                        window: context.window,
                    });
                    None
                }
                Err(reason) => {
                    reasons.push(reason);
                    None
                }
            },
            Err(reason) => {
                reasons.push(reason);
                None
            }
        };

        // 3. Time slot
        let time_slot = match required(obj, SLOT_KEYS, "time_slot") {
            Ok(value) => {
                let label = value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string());
                match time_label_to_slot(&label) {
                    Some(slot) => Some(slot),
                    None => {
                        reasons.push(RejectionReason::UnknownTimeLabel(label));
                        None
                    }
                }
            }
            Err(reason) => {
                reasons.push(reason);
                None
            }
        };

        // 4. Scores and flags
        let appetite = collect(
            &mut reasons,
            required(obj, APPETITE_KEYS, "appetite_score")
                .and_then(|v| self.read_score(index, "appetite_score", v, warnings)),
        );
        let energy = collect(
            &mut reasons,
            required(obj, ENERGY_KEYS, "energy_score")
                .and_then(|v| self.read_score(index, "energy_score", v, warnings)),
        );
        let urinated = collect(
            &mut reasons,
            required(obj, URINATED_KEYS, "urinated").and_then(|v| read_flag(index, "urinated", v, warnings)),
        );
        let cleaned = collect(
            &mut reasons,
            required(obj, CLEANED_KEYS, "cleaned").and_then(|v| read_flag(index, "cleaned", v, warnings)),
        );

        // 5. Notes
        let notes = aggregate_notes(obj);
        if let Some(text) = &notes {
            let length = text.chars().count();
            if length > self.config.max_notes_length {
                reasons.push(RejectionReason::NotesTooLong {
                    length,
                    max: self.config.max_notes_length,
                });
            }
        }

        match (log_date, time_slot, appetite, energy, urinated, cleaned) {
            (Some(log_date), Some(time_slot), Some(appetite), Some(energy), Some(urinated), Some(cleaned))
                if reasons.is_empty() =>
            {
                Ok(CareLogCandidate::new(
                    context.subject,
                    log_date,
                    time_slot,
                    appetite,
                    energy,
                    urinated,
                    cleaned,
                    notes,
                ))
            }
            _ => Err(reasons),
        }
    }

    /// Re-check a record read back from a staged artifact
    ///
    /// Types are already enforced by deserialization; this covers the
    /// invariants an operator could break by hand-editing the file, or that
    /// an artifact written straight into the staging area never went through.
    pub fn check_staged(&self, record: &CareLogCandidate, declared: &BatchDeclaration) -> Vec<RejectionReason> {
        let mut reasons = Vec::new();
        if record.subject_id != declared.subject {
            reasons.push(RejectionReason::SubjectMismatch {
                expected: declared.subject,
                found: record.subject_id,
            });
        }
        if !declared.window.contains(record.log_date) {
            reasons.push(RejectionReason::OutOfWindow {
                date: record.log_date,
                window: declared.window,
            });
        }
        if let Some(issue) = record.provenance_issue() {
            reasons.push(RejectionReason::Provenance(issue.to_string()));
        }
        if let Some(notes) = &record.notes {
            let length = notes.chars().count();
            if length > self.config.max_notes_length {
                reasons.push(RejectionReason::NotesTooLong {
                    length,
                    max: self.config.max_notes_length,
                });
            }
        }
        reasons
    }

    fn check_oracle_subject(
        &self,
        index: usize,
        obj: &Map<String, Value>,
        context: &ValidationContext,
        warnings: &mut Vec<MappingWarning>,
    ) {
        let Some(proposed) = obj.get("subject_id").filter(|v| !v.is_null()) else {
            return;
        };
        let matches = proposed.as_u64() == Some(context.subject.value())
            || proposed.as_str().map(str::trim) == Some(context.subject.to_string().as_str());
        if !matches {
            let message = format!(
                "oracle proposed subject {}, using operator-supplied {}",
                proposed, context.subject
            );
            warn!("Record {}: {}", index, message);
            warnings.push(MappingWarning {
                index,
                field: "subject_id",
                message,
            });
        }
    }

    fn read_date(&self, value: &Value) -> Result<NaiveDate, RejectionReason> {
        let text = value
            .as_str()
            .ok_or_else(|| RejectionReason::InvalidDate(value.to_string()))?
            .trim();
        self.config
            .date_formats
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
            .ok_or_else(|| RejectionReason::InvalidDate(text.to_string()))
    }

    fn read_score(
        &self,
        index: usize,
        field: &'static str,
        value: &Value,
        warnings: &mut Vec<MappingWarning>,
    ) -> Result<Score, RejectionReason> {
        let out_of_range = || RejectionReason::ScoreOutOfRange {
            field,
            value: display_value(value),
        };

        match numeric(value) {
            Some(Numeric::Integer(n)) => {
                if !self.config.accept_numeric_scores {
                    return Err(out_of_range());
                }
                return Score::new(n).ok_or_else(out_of_range);
            }
            Some(Numeric::Fractional) => return Err(out_of_range()),
            None => {}
        }

        match read_mark(value) {
            MarkReading::Mark(mark) => Ok(mark_to_score(mark)),
            MarkReading::Unreadable(text) => {
                let message = format!("unreadable mark '{}', using default score {}", text, Score::DEFAULT);
                warn!("Record {} {}: {}", index, field, message);
                warnings.push(MappingWarning { index, field, message });
                Ok(Score::DEFAULT)
            }
        }
    }
}

enum Numeric {
    Integer(i64),
    Fractional,
}

fn numeric(value: &Value) -> Option<Numeric> {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(Numeric::Integer(i)),
            None => match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Some(Numeric::Integer(f as i64)),
                _ => Some(Numeric::Fractional),
            },
        },
        Value::String(s) => s.trim().parse::<i64>().ok().map(Numeric::Integer),
        _ => None,
    }
}

fn read_flag(
    index: usize,
    field: &'static str,
    value: &Value,
    warnings: &mut Vec<MappingWarning>,
) -> Result<bool, RejectionReason> {
    if matches!(value, Value::Number(_) | Value::Array(_) | Value::Object(_)) {
        return Err(RejectionReason::NotBoolean {
            field,
            value: display_value(value),
        });
    }

    match read_mark(value) {
        MarkReading::Mark(mark) => {
            let (flag, ambiguous) = mark_to_bool(mark);
            if ambiguous {
                let message = format!("partial mark has no yes/no meaning, using {}", flag);
                warn!("Record {} {}: {}", index, field, message);
                warnings.push(MappingWarning { index, field, message });
            }
            Ok(flag)
        }
        MarkReading::Unreadable(text) => {
            let message = format!("unreadable mark '{}', using false", text);
            warn!("Record {} {}: {}", index, field, message);
            warnings.push(MappingWarning { index, field, message });
            Ok(false)
        }
    }
}

/// Build `notes` from the labelled observation cells
///
/// When the oracle returns only a ready-made `notes` string it is kept as is.
/// Alongside structured cells, a `notes` string is used as the free note only
/// if it carries no labels of its own; otherwise the cells win.
fn aggregate_notes(obj: &Map<String, Value>) -> Option<String> {
    let structured = OBSERVATIONS.iter().any(|(_, keys)| lookup(obj, keys).is_some())
        || lookup(obj, FREE_TEXT_KEYS).is_some();

    if !structured {
        return lookup(obj, NOTES_KEYS).and_then(free_text);
    }

    let mut notes = NoteBuilder::new();
    for (label, keys) in OBSERVATIONS {
        notes.push(label, lookup(obj, keys).and_then(observation_value));
    }
    let free = lookup(obj, FREE_TEXT_KEYS).or_else(|| {
        lookup(obj, NOTES_KEYS).filter(|notes| !notes.as_str().is_some_and(has_note_labels))
    });
    notes.push(FREE_NOTE_LABEL, free.and_then(free_text));
    notes.build()
}

fn free_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        other => Some(other.to_string()),
    }
}

fn lookup<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| obj.get(*key))
}

fn required<'a>(
    obj: &'a Map<String, Value>,
    keys: &[&str],
    name: &'static str,
) -> Result<&'a Value, RejectionReason> {
    lookup(obj, keys).ok_or(RejectionReason::MissingField(name))
}

fn collect<T>(reasons: &mut Vec<RejectionReason>, result: Result<T, RejectionReason>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(reason) => {
            reasons.push(reason);
            None
        }
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::split_notes;
    use carelog_domain::OCR_RECORDER_LABEL;
    use proptest::prelude::*;
    use serde_json::json;

    fn context() -> ValidationContext {
        ValidationContext::new(
            SubjectId::new(12).unwrap(),
            DateWindow::new(
                NaiveDate::from_ymd_opt(2024, 11, 14).unwrap(),
                NaiveDate::from_ymd_opt(2024, 11, 15).unwrap(),
            )
            .unwrap(),
        )
    }

    fn row(date: &str, slot: &str) -> Value {
        json!({
            "subject_id": 12,
            "log_date": date,
            "time_slot": slot,
            "appetite_score": "○",
            "energy_score": "△",
            "urinated": "○",
            "cleaned": "×",
            "notes": null,
            "recorder_label": OCR_RECORDER_LABEL,
            "from_paper": true
        })
    }

    fn clean_sheet() -> Vec<Value> {
        vec![
            row("2024-11-14", "morning"),
            row("2024-11-14", "evening"),
            row("2024-11-15", "morning"),
            row("2024-11-15", "evening"),
        ]
    }

    #[test]
    fn test_clean_sheet_is_fully_valid() {
        let report = Gatekeeper::default_config().validate_batch(&clean_sheet(), &context());

        assert_eq!(report.valid.len(), 4);
        assert!(report.rejected.is_empty());
        assert!(report.is_clean());
        let first = &report.valid[0];
        assert_eq!(first.appetite_score.value(), 5);
        assert_eq!(first.energy_score.value(), 3);
        assert!(first.urinated);
        assert!(!first.cleaned);
        assert_eq!(first.time_slot, TimeSlot::Morning);
    }

    #[test]
    fn test_out_of_window_row_is_excluded() {
        let mut rows = clean_sheet();
        rows[2] = row("2024-12-01", "morning");

        let report = Gatekeeper::default_config().validate_batch(&rows, &context());

        assert_eq!(report.valid.len(), 3);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].index, 2);
        assert!(matches!(
            report.rejected[0].reasons[0],
            RejectionReason::OutOfWindow { .. }
        ));
        assert!(report
            .valid
            .iter()
            .all(|r| context().window.contains(r.log_date)));
    }

    #[test]
    fn test_unreadable_appetite_defaults_with_warning() {
        let mut rows = clean_sheet();
        rows[1]["appetite_score"] = json!("~smear~");

        let report = Gatekeeper::default_config().validate_batch(&rows, &context());

        assert_eq!(report.valid.len(), 4);
        assert_eq!(report.valid[1].appetite_score.value(), 3);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].index, 1);
        assert_eq!(report.warnings[0].field, "appetite_score");
    }

    #[test]
    fn test_unknown_time_label_is_rejected_not_defaulted() {
        let rows = vec![row("2024-11-14", "afternoon")];
        let report = Gatekeeper::default_config().validate_batch(&rows, &context());

        assert!(report.valid.is_empty());
        assert_eq!(
            report.rejected[0].reasons,
            vec![RejectionReason::UnknownTimeLabel("afternoon".to_string())]
        );
    }

    #[test]
    fn test_named_score_marks() {
        let mut rows = vec![row("2024-11-14", "morning"), row("2024-11-14", "noon")];
        rows[0]["appetite_score"] = json!("partial");
        rows[0]["energy_score"] = json!(null);
        rows[1]["appetite_score"] = json!("good");
        rows[1]["energy_score"] = json!("absent");

        let report = Gatekeeper::default_config().validate_batch(&rows, &context());

        assert_eq!(report.valid[0].appetite_score.value(), 3);
        assert_eq!(report.valid[0].energy_score.value(), 3);
        assert_eq!(report.valid[1].appetite_score.value(), 5);
        assert_eq!(report.valid[1].energy_score.value(), 1);
    }

    #[test]
    fn test_numeric_scores() {
        let mut rows = vec![row("2024-11-14", "morning"), row("2024-11-14", "noon")];
        rows[0]["appetite_score"] = json!(4);
        rows[1]["appetite_score"] = json!(7);

        let report = Gatekeeper::default_config().validate_batch(&rows, &context());
        assert_eq!(report.valid.len(), 1);
        assert_eq!(report.valid[0].appetite_score.value(), 4);
        assert!(matches!(
            report.rejected[0].reasons[0],
            RejectionReason::ScoreOutOfRange { field: "appetite_score", .. }
        ));

        let strict = Gatekeeper::new(ValidationConfig::strict());
        let report = strict.validate_batch(&rows[..1], &context());
        assert_eq!(report.rejected.len(), 1);
    }

    #[test]
    fn test_fractional_score_rejected() {
        let mut rows = vec![row("2024-11-14", "morning")];
        rows[0]["energy_score"] = json!(2.5);
        let report = Gatekeeper::default_config().validate_batch(&rows, &context());
        assert_eq!(report.rejected.len(), 1);
    }

    #[test]
    fn test_numeric_boolean_rejected() {
        let mut rows = vec![row("2024-11-14", "morning")];
        rows[0]["cleaned"] = json!(1);
        let report = Gatekeeper::default_config().validate_batch(&rows, &context());
        assert!(matches!(
            report.rejected[0].reasons[0],
            RejectionReason::NotBoolean { field: "cleaned", .. }
        ));
    }

    #[test]
    fn test_blank_booleans_default_to_false() {
        let mut rows = vec![row("2024-11-14", "morning")];
        rows[0]["urinated"] = json!("");
        rows[0]["cleaned"] = json!(null);
        let report = Gatekeeper::default_config().validate_batch(&rows, &context());
        assert!(!report.valid[0].urinated);
        assert!(!report.valid[0].cleaned);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_missing_fields_all_reported() {
        let rows = vec![json!({"log_date": "2024-11-14"})];
        let report = Gatekeeper::default_config().validate_batch(&rows, &context());
        let reasons = &report.rejected[0].reasons;
        assert!(reasons.contains(&RejectionReason::MissingField("time_slot")));
        assert!(reasons.contains(&RejectionReason::MissingField("appetite_score")));
        assert!(reasons.contains(&RejectionReason::MissingField("cleaned")));
    }

    #[test]
    fn test_invalid_calendar_date() {
        let rows = vec![row("2024-02-30", "morning"), json!("not an object")];
        let report = Gatekeeper::default_config().validate_batch(&rows, &context());
        assert_eq!(
            report.rejected[0].reasons,
            vec![RejectionReason::InvalidDate("2024-02-30".to_string())]
        );
        assert_eq!(report.rejected[1].reasons, vec![RejectionReason::NotAnObject]);
    }

    #[test]
    fn test_provenance_and_subject_forced() {
        let mut rows = vec![row("2024-11-14", "morning")];
        rows[0]["from_paper"] = json!(false);
        rows[0]["recorder_label"] = json!("Alice");
        rows[0]["subject_id"] = json!(2);

        let report = Gatekeeper::default_config().validate_batch(&rows, &context());
        let record = &report.valid[0];

        assert!(record.from_paper);
        assert_eq!(record.recorder_label, OCR_RECORDER_LABEL);
        assert_eq!(record.subject_id.value(), 12);
        assert_eq!(report.warnings[0].field, "subject_id");
    }

    #[test]
    fn test_note_aggregation_keeps_every_observation() {
        let mut rows = vec![row("2024-11-14", "morning")];
        rows[0]["defecation"] = json!("○");
        rows[0]["vomiting"] = json!("");
        rows[0]["medication"] = json!("×");
        rows[0]["memo"] = json!("ate well");

        let report = Gatekeeper::default_config().validate_batch(&rows, &context());
        let notes = report.valid[0].notes.clone().unwrap();

        let pairs = split_notes(&notes);
        assert_eq!(pairs.len(), 3);
        assert!(pairs.contains(&("Stool".to_string(), "yes".to_string())));
        assert!(pairs.contains(&("Medication".to_string(), "no".to_string())));
        assert!(pairs.contains(&("Note".to_string(), "ate well".to_string())));
    }

    #[test]
    fn test_ready_made_notes_kept_verbatim() {
        let mut rows = vec![row("2024-11-14", "morning")];
        rows[0]["notes"] = json!("Stool: yes / Note: quiet day");
        let report = Gatekeeper::default_config().validate_batch(&rows, &context());
        assert_eq!(
            report.valid[0].notes.as_deref(),
            Some("Stool: yes / Note: quiet day")
        );
    }

    #[test]
    fn test_labelled_notes_not_wrapped_beside_cells() {
        let mut rows = vec![row("2024-11-14", "morning")];
        rows[0]["defecation"] = json!("○");
        rows[0]["notes"] = json!("Stool: yes / Note: quiet day");
        let report = Gatekeeper::default_config().validate_batch(&rows, &context());
        assert_eq!(report.valid[0].notes.as_deref(), Some("Stool: yes"));

        rows[0]["notes"] = json!("quiet day");
        let report = Gatekeeper::default_config().validate_batch(&rows, &context());
        assert_eq!(report.valid[0].notes.as_deref(), Some("Stool: yes / Note: quiet day"));
    }

    #[test]
    fn test_notes_too_long() {
        let mut config = ValidationConfig::default();
        config.max_notes_length = 10;
        let mut rows = vec![row("2024-11-14", "morning")];
        rows[0]["memo"] = json!("a very long handwritten remark");
        let report = Gatekeeper::new(config).validate_batch(&rows, &context());
        assert!(matches!(
            report.rejected[0].reasons[0],
            RejectionReason::NotesTooLong { .. }
        ));
    }

    #[test]
    fn test_duplicate_slots() {
        let rows = vec![row("2024-11-14", "morning"), row("2024-11-14", "朝")];

        let report = Gatekeeper::default_config().validate_batch(&rows, &context());
        assert_eq!(report.valid.len(), 2);
        assert_eq!(report.warnings.len(), 1);

        let report = Gatekeeper::new(ValidationConfig::strict()).validate_batch(&rows, &context());
        assert_eq!(report.valid.len(), 1);
        assert!(matches!(
            report.rejected[0].reasons[0],
            RejectionReason::DuplicateSlot { .. }
        ));
    }

    #[test]
    fn test_validate_json_requires_array() {
        let gatekeeper = Gatekeeper::default_config();
        assert!(gatekeeper.validate_json(&json!({"a": 1}), &context()).is_err());
        let report = gatekeeper.validate_json(&json!([]), &context()).unwrap();
        assert_eq!(report.total(), 0);
    }

    #[test]
    fn test_check_staged() {
        let gatekeeper = Gatekeeper::default_config();
        let report = gatekeeper.validate_batch(&clean_sheet(), &context());
        let declared = BatchDeclaration::new(context().subject, context().window);
        let mut record = report.valid[0].clone();
        assert!(gatekeeper.check_staged(&record, &declared).is_empty());

        record.from_paper = false;
        record.subject_id = SubjectId::new(3).unwrap();
        let reasons = gatekeeper.check_staged(&record, &declared);
        assert_eq!(reasons.len(), 2);
    }

    #[test]
    fn test_check_staged_enforces_declared_window() {
        let gatekeeper = Gatekeeper::default_config();
        let declared = BatchDeclaration::new(context().subject, context().window);
        let mut record = gatekeeper.validate_batch(&clean_sheet(), &context()).valid[0].clone();
        record.log_date = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();

        let reasons = gatekeeper.check_staged(&record, &declared);
        assert_eq!(
            reasons,
            vec![RejectionReason::OutOfWindow {
                date: record.log_date,
                window: context().window,
            }]
        );
    }

    fn any_mark() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(json!("○")),
            Just(json!("△")),
            Just(json!("×")),
            Just(json!("")),
            Just(json!(null)),
            Just(json!("good")),
            Just(json!("partial")),
            "[a-z]{1,6}".prop_map(Value::String),
            (1i64..=5).prop_map(|n| json!(n)),
        ]
    }

    proptest! {
        #[test]
        fn valid_records_always_satisfy_invariants(
            appetite in any_mark(),
            energy in any_mark(),
            urinated in any_mark(),
            day_offset in -5i64..10,
            slot in prop_oneof![Just("morning"), Just("noon"), Just("evening"), Just("dusk")],
        ) {
            let date = NaiveDate::from_ymd_opt(2024, 11, 14).unwrap() + chrono::Duration::days(day_offset);
            let mut item = row(&date.format("%Y-%m-%d").to_string(), slot);
            item["appetite_score"] = appetite;
            item["energy_score"] = energy;
            item["urinated"] = urinated;

            let report = Gatekeeper::default_config().validate_batch(&[item], &context());
            prop_assert_eq!(report.total(), 1);
            for record in &report.valid {
                prop_assert!(record.from_paper);
                prop_assert_eq!(record.recorder_label.as_str(), OCR_RECORDER_LABEL);
                prop_assert!(context().window.contains(record.log_date));
                prop_assert!((1..=5).contains(&record.appetite_score.value()));
                prop_assert!((1..=5).contains(&record.energy_score.value()));
                prop_assert_eq!(record.subject_id, context().subject);
            }
            if slot == "dusk" || !context().window.contains(date) {
                prop_assert!(report.valid.is_empty());
            }
        }
    }
}
