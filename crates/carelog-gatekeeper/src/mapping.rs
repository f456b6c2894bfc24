//! Deterministic field mappings from sheet marks to record values
//!
//! | Source | Target | Rule |
//! |---|---|---|
//! | mark | appetite / energy | present → 5, partial → 3, absent → 1, blank → 3 |
//! | mark | urinated / cleaned | present → true, absent → false, blank → false |
//! | time label | time slot | morning / midday / evening labels; anything else is rejected |
//! | sub-observations | notes | `"<Label>: <value>"` joined by [`NOTE_DELIMITER`] |
//!
//! Unreadable marks fall back to the blank branch; callers log the ambiguity.

use carelog_domain::{Score, TimeSlot};
use serde_json::Value;

/// Delimiter between labelled observations in `notes`
pub const NOTE_DELIMITER: &str = " / ";

/// Label for defecation observations
pub const STOOL_LABEL: &str = "Stool";

/// Label for vomiting observations
pub const VOMIT_LABEL: &str = "Vomit";

/// Label for medication observations
pub const MEDICATION_LABEL: &str = "Medication";

/// Label for free handwriting
pub const FREE_NOTE_LABEL: &str = "Note";

/// All observation labels in the order they are written
pub const NOTE_LABELS: [&str; 4] = [STOOL_LABEL, VOMIT_LABEL, MEDICATION_LABEL, FREE_NOTE_LABEL];

const PRESENT_MARKS: &[&str] = &[
    "○", "◯", "◎", "✓", "✔", "good", "yes", "y", "present", "true",
];
const PARTIAL_MARKS: &[&str] = &["△", "partial", "some", "fair"];
const ABSENT_MARKS: &[&str] = &["×", "✕", "✗", "x", "no", "n", "absent", "poor", "none", "false"];
const BLANK_MARKS: &[&str] = &["", "-", "blank", "null"];

const MORNING_LABELS: &[&str] = &["morning", "朝"];
const NOON_LABELS: &[&str] = &["noon", "midday", "昼"];
const EVENING_LABELS: &[&str] = &["evening", "夕", "夜"];

/// A single cell on the paper sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    /// Full mark
    Present,
    /// Partial mark
    Partial,
    /// Explicit absent mark
    Absent,
    /// Nothing written
    Blank,
}

/// Result of reading a cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkReading {
    /// Cell matched a known mark
    Mark(Mark),
    /// Cell held something that is not a known mark
    Unreadable(String),
}

/// Read a JSON cell as a mark
///
/// # Examples
///
/// ```
/// use carelog_gatekeeper::mapping::{read_mark, Mark, MarkReading};
/// use serde_json::json;
///
/// assert_eq!(read_mark(&json!("△")), MarkReading::Mark(Mark::Partial));
/// assert_eq!(read_mark(&json!(null)), MarkReading::Mark(Mark::Blank));
/// assert!(matches!(read_mark(&json!("~smudge~")), MarkReading::Unreadable(_)));
/// ```
pub fn read_mark(value: &Value) -> MarkReading {
    match value {
        Value::Null => MarkReading::Mark(Mark::Blank),
        Value::Bool(true) => MarkReading::Mark(Mark::Present),
        Value::Bool(false) => MarkReading::Mark(Mark::Absent),
        Value::String(s) => {
            let token = s.trim().to_lowercase();
            let token = token.as_str();
            if BLANK_MARKS.contains(&token) {
                MarkReading::Mark(Mark::Blank)
            } else if PRESENT_MARKS.contains(&token) {
                MarkReading::Mark(Mark::Present)
            } else if PARTIAL_MARKS.contains(&token) {
                MarkReading::Mark(Mark::Partial)
            } else if ABSENT_MARKS.contains(&token) {
                MarkReading::Mark(Mark::Absent)
            } else {
                MarkReading::Unreadable(s.clone())
            }
        }
        other => MarkReading::Unreadable(other.to_string()),
    }
}

/// Map a mark to a score
pub fn mark_to_score(mark: Mark) -> Score {
    match mark {
        Mark::Present => Score::PRESENT,
        Mark::Partial => Score::PARTIAL,
        Mark::Absent => Score::ABSENT,
        Mark::Blank => Score::DEFAULT,
    }
}

/// Map a mark to a boolean
///
/// Partial marks have no boolean meaning; they take the blank branch and the
/// second element is `true` so the caller can log the ambiguity.
pub fn mark_to_bool(mark: Mark) -> (bool, bool) {
    match mark {
        Mark::Present => (true, false),
        Mark::Absent => (false, false),
        Mark::Blank => (false, false),
        Mark::Partial => (false, true),
    }
}

/// Map a time label to a slot. Unrecognised labels return `None`.
pub fn time_label_to_slot(label: &str) -> Option<TimeSlot> {
    let token = label.trim().to_lowercase();
    let token = token.as_str();
    if MORNING_LABELS.contains(&token) {
        Some(TimeSlot::Morning)
    } else if NOON_LABELS.contains(&token) {
        Some(TimeSlot::Noon)
    } else if EVENING_LABELS.contains(&token) {
        Some(TimeSlot::Evening)
    } else {
        None
    }
}

/// Render one sub-observation cell as a note value; `None` when blank
pub fn observation_value(value: &Value) -> Option<String> {
    match read_mark(value) {
        MarkReading::Mark(Mark::Blank) => None,
        MarkReading::Mark(Mark::Present) => Some("yes".to_string()),
        MarkReading::Mark(Mark::Partial) => Some("some".to_string()),
        MarkReading::Mark(Mark::Absent) => Some("no".to_string()),
        // Handwriting such as a drug name is kept as written
        MarkReading::Unreadable(text) => {
            let text = text.trim().trim_matches('"').to_string();
            (!text.is_empty()).then_some(text)
        }
    }
}

/// Collects labelled observations into a single `notes` string
#[derive(Debug, Default, Clone)]
pub struct NoteBuilder {
    parts: Vec<String>,
}

impl NoteBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `"<label>: <value>"` unless the value is blank
    pub fn push(&mut self, label: &str, value: Option<String>) -> &mut Self {
        if let Some(value) = value {
            let value = value.trim();
            if !value.is_empty() {
                self.parts.push(format!("{}: {}", label, value));
            }
        }
        self
    }

    /// Number of observations collected
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Whether nothing was collected
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Join the observations, `None` when there are none
    pub fn build(self) -> Option<String> {
        (!self.parts.is_empty()).then(|| self.parts.join(NOTE_DELIMITER))
    }
}

/// Split an aggregated `notes` string back into `(label, value)` pairs
///
/// Segments that do not start with a known label belong to the preceding
/// observation, so free handwriting containing the delimiter survives.
pub fn split_notes(notes: &str) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = Vec::new();
    for segment in notes.split(NOTE_DELIMITER) {
        let labelled = NOTE_LABELS.iter().find_map(|label| {
            segment
                .strip_prefix(label)
                .and_then(|rest| rest.strip_prefix(": "))
                .map(|value| (label.to_string(), value.to_string()))
        });
        match (labelled, pairs.last_mut()) {
            (Some(pair), _) => pairs.push(pair),
            (None, Some(last)) => {
                last.1.push_str(NOTE_DELIMITER);
                last.1.push_str(segment);
            }
            (None, None) => pairs.push((String::new(), segment.to_string())),
        }
    }
    pairs
}

/// Whether `notes` already carries at least one labelled observation
pub fn has_note_labels(notes: &str) -> bool {
    split_notes(notes).iter().any(|(label, _)| !label.is_empty())
}
