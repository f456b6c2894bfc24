//! Oracle prompt construction for care-log sheet extraction

use carelog_domain::{DateWindow, SubjectId, OCR_RECORDER_LABEL};
use carelog_gatekeeper::mapping::{
    FREE_NOTE_LABEL, MEDICATION_LABEL, NOTE_DELIMITER, STOOL_LABEL, VOMIT_LABEL,
};
use std::path::PathBuf;

/// Builds the instruction handed to the oracle together with the page image
///
/// The output depends only on the three inputs.
pub struct PromptBuilder {
    subject: SubjectId,
    window: DateWindow,
    output_path: PathBuf,
}

impl PromptBuilder {
    /// Create a new prompt builder
    pub fn new(subject: SubjectId, window: DateWindow, output_path: impl Into<PathBuf>) -> Self {
        Self {
            subject,
            window,
            output_path: output_path.into(),
        }
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let start = self.window.start().format("%Y-%m-%d");
        let end = self.window.end().format("%Y-%m-%d");
        let mut prompt = String::new();

        // 1. Task
        prompt.push_str(EXTRACTION_INSTRUCTIONS);
        prompt.push_str("\n\n");

        // 2. Operator constants
        prompt.push_str("Fixed values (authoritative, do not read them from the image):\n");
        prompt.push_str(&format!(
            "- subject_id: {} (use this exact value for every record)\n",
            self.subject
        ));
        prompt.push_str(&format!("- date range: {} to {} inclusive\n", start, end));
        prompt.push_str(&format!(
            "- Only output rows dated between {} and {}; leave out every other row.\n\n",
            start, end
        ));

        // 3. Mapping rules
        prompt.push_str(MAPPING_RULES);
        prompt.push_str(&format!(
            "- notes: for each non-blank cell append \"<Label>: <value>\" using the labels \
             \"{}\" (defecation), \"{}\" (vomiting), \"{}\" (medication) and \"{}\" \
             (free handwriting), joined by \"{}\". Use null when every cell is blank.\n\n",
            STOOL_LABEL, VOMIT_LABEL, MEDICATION_LABEL, FREE_NOTE_LABEL, NOTE_DELIMITER
        ));

        // 4. Output shape
        prompt.push_str(OUTPUT_SHAPE);
        prompt.push_str("\n\nExample record:\n");
        prompt.push_str(&self.example_record(&start.to_string()));
        prompt.push_str("\n\n");

        // 5. Destination
        prompt.push_str(&format!(
            "Save the JSON array to: {}\n\n",
            self.output_path.display()
        ));

        prompt.push_str(OUTPUT_FORMAT_REMINDER);

        prompt
    }

    fn example_record(&self, date: &str) -> String {
        format!(
            r#"[
  {{
    "subject_id": {subject},
    "log_date": "{date}",
    "time_slot": "morning",
    "appetite_score": 5,
    "energy_score": 3,
    "urinated": true,
    "cleaned": false,
    "notes": "{stool}: yes{delim}{note}: ate well",
    "recorder_label": "{label}",
    "from_paper": true,
    "recorder_id": null,
    "ip_address": null,
    "user_agent": null
  }}
]"#,
            subject = self.subject,
            date = date,
            stool = STOOL_LABEL,
            delim = NOTE_DELIMITER,
            note = FREE_NOTE_LABEL,
            label = OCR_RECORDER_LABEL,
        )
    }
}

const EXTRACTION_INSTRUCTIONS: &str = r#"The attached image is a scanned paper care-log sheet for one animal.
Each row is one date; each date has up to three care rounds (morning, noon, evening).
Transcribe every filled-in care round as one JSON record."#;

const MAPPING_RULES: &str = r#"Mapping rules:
- time_slot: morning label -> "morning", midday label -> "noon", evening label -> "evening". Skip rounds with any other label.
- appetite_score, energy_score: ○ (present) -> 5, △ (partial) -> 3, × (absent) -> 1, blank -> 3.
- urinated, cleaned: ○ (present) -> true, × (absent) -> false, blank -> false.
- log_date: YYYY-MM-DD.
"#;

const OUTPUT_SHAPE: &str = r#"Output shape: a JSON array of objects with exactly these fields:
- subject_id: integer
- log_date: string, YYYY-MM-DD
- time_slot: "morning" | "noon" | "evening"
- appetite_score: integer 1-5
- energy_score: integer 1-5
- urinated: boolean
- cleaned: boolean
- notes: string or null
- recorder_label: "OCR Import"
- from_paper: true
- recorder_id: null
- ip_address: null
- user_agent: null"#;

const OUTPUT_FORMAT_REMINDER: &str =
    "Remember: Return ONLY the JSON array, no markdown code blocks, no explanations.";
