//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use carelog_domain::{RegistrationOutcome, RunStatus};
use carelog_extractor::ExtractionResult;
use carelog_pages::PageImage;
use colored::*;
use serde_json::{json, Value};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Active output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format the result of a page conversion.
    pub fn format_page(&self, page: &PageImage) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "image": page.image_path,
                "archived_source": page.archived_source,
            }))?),
            OutputFormat::Quiet => Ok(page.image_path.display().to_string()),
            OutputFormat::Table => {
                let mut lines = vec![self.success(&format!("Wrote {}", page.image_path.display()))];
                if let Some(archived) = &page.archived_source {
                    lines.push(self.info(&format!("Source archived to {}", archived.display())));
                }
                Ok(lines.join("\n"))
            }
        }
    }

    /// Format an extraction or validation result.
    pub fn format_extraction(&self, result: &ExtractionResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&extraction_json(result))?),
            OutputFormat::Quiet => Ok(result
                .staged_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()),
            OutputFormat::Table => Ok(self.extraction_table(result)),
        }
    }

    fn extraction_table(&self, result: &ExtractionResult) -> String {
        let report = &result.report;
        let mut sections = Vec::new();

        let headline = format!(
            "{} records: {} valid, {} rejected, {} warnings",
            report.total(),
            report.valid.len(),
            report.rejected.len(),
            report.warnings.len()
        );
        sections.push(if report.is_clean() {
            self.success(&headline)
        } else {
            self.warning(&headline)
        });

        if !report.rejected.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["#", "Date", "Slot", "Reasons"]);
            for rejected in &report.rejected {
                builder.push_record([
                    rejected.index.to_string(),
                    raw_field(&rejected.raw, "log_date"),
                    raw_field(&rejected.raw, "time_slot"),
                    rejected.reason_text(),
                ]);
            }
            sections.push(render(builder));
        }

        if !report.warnings.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["#", "Field", "Assumed"]);
            for warning in &report.warnings {
                builder.push_record([warning.index.to_string(), warning.field.to_string(), warning.message.clone()]);
            }
            sections.push(render(builder));
        }

        match &result.staged_path {
            Some(path) => sections.push(self.success(&format!(
                "Staged {} - review it, then move it into the watched directory or run `carelog register`",
                path.display()
            ))),
            None => sections.push(self.warning("Nothing staged: no record passed validation")),
        }
        if let Some(path) = &result.rejected_path {
            sections.push(self.info(&format!("Rejected records written to {}", path.display())));
        }

        sections.join("\n")
    }

    /// Format a registration outcome.
    pub fn format_outcome(&self, outcome: &RegistrationOutcome) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&outcome_json(outcome))?),
            OutputFormat::Quiet => Ok(outcome.summary()),
            OutputFormat::Table => Ok(self.outcome_table(outcome)),
        }
    }

    fn outcome_table(&self, outcome: &RegistrationOutcome) -> String {
        let mut sections = Vec::new();

        let summary = outcome.summary();
        sections.push(match outcome.status() {
            RunStatus::Succeeded => self.success(&summary),
            RunStatus::Empty => self.info(&summary),
            RunStatus::Partial => self.warning(&summary),
            RunStatus::Failed => self.error(&summary),
        });

        if !outcome.failures.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["#", "Date", "Slot", "Kind", "Message"]);
            for failure in &outcome.failures {
                builder.push_record([
                    failure.index.to_string(),
                    failure
                        .log_date
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    failure
                        .time_slot
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    failure.kind.to_string(),
                    failure.message.clone(),
                ]);
            }
            sections.push(render(builder));
        }

        if let Some(archived) = &outcome.archived_to {
            sections.push(self.info(&format!("Batch archived to {}", archived.display())));
        }
        sections.push(self.info(&format!("Run {}", outcome.run_id)));

        sections.join("\n")
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn render(builder: Builder) -> String {
    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

fn raw_field(raw: &Value, key: &str) -> String {
    match raw.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "-".to_string(),
        Some(other) => other.to_string(),
    }
}

fn extraction_json(result: &ExtractionResult) -> Value {
    let report = &result.report;
    json!({
        "source": result.metadata.source,
        "model": result.metadata.model_name,
        "processing_time_ms": result.metadata.processing_time_ms,
        "total": report.total(),
        "valid": report.valid.len(),
        "rejected": report.rejected.iter().map(|r| json!({
            "index": r.index,
            "reasons": r.reasons.iter().map(|reason| reason.to_string()).collect::<Vec<_>>(),
            "record": r.raw,
        })).collect::<Vec<_>>(),
        "warnings": report.warnings.iter().map(|w| json!({
            "index": w.index,
            "field": w.field,
            "message": w.message,
        })).collect::<Vec<_>>(),
        "staged": result.staged_path,
        "rejected_report": result.rejected_path,
    })
}

fn outcome_json(outcome: &RegistrationOutcome) -> Value {
    json!({
        "run_id": outcome.run_id,
        "artifact": outcome.artifact,
        "status": outcome.status().as_str(),
        "attempted": outcome.attempted,
        "succeeded": outcome.succeeded,
        "failed": outcome.failed(),
        "dry_run": outcome.dry_run,
        "archived_to": outcome.archived_to,
        "failures": outcome.failures.iter().map(|f| json!({
            "index": f.index,
            "log_date": f.log_date.map(|d| d.format("%Y-%m-%d").to_string()),
            "time_slot": f.time_slot.map(|s| s.as_str()),
            "kind": f.kind.as_str(),
            "message": f.message,
        })).collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use carelog_domain::{FailureKind, RecordFailure, TimeSlot};
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn partial_outcome() -> RegistrationOutcome {
        let mut outcome = RegistrationOutcome::new("0192d2a4-run");
        outcome.record_success();
        outcome.record_success();
        outcome.record_success();
        outcome.record_failure(RecordFailure {
            index: 2,
            log_date: NaiveDate::from_ymd_opt(2024, 11, 15),
            time_slot: Some(TimeSlot::Morning),
            kind: FailureKind::Conflict,
            message: "Conflict: entry exists".to_string(),
        });
        outcome.archived_to = Some(PathBuf::from("staged-batches/processed/12.json"));
        outcome
    }

    #[test]
    fn test_outcome_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_outcome(&partial_outcome()).unwrap();
        assert!(output.starts_with("⚠ 4 attempted, 3 succeeded, 1 failed (partial)"));
        assert!(output.contains("conflict"));
        assert!(output.contains("2024-11-15"));
        assert!(output.contains("staged-batches/processed/12.json"));
    }

    #[test]
    fn test_outcome_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_outcome(&partial_outcome()).unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["status"], "partial");
        assert_eq!(value["failures"][0]["kind"], "conflict");
        assert_eq!(value["failures"][0]["time_slot"], "morning");
    }

    #[test]
    fn test_quiet_outcome_is_summary() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = formatter.format_outcome(&partial_outcome()).unwrap();
        assert_eq!(output, "4 attempted, 3 succeeded, 1 failed (partial)");
    }

    #[test]
    fn test_failed_run_uses_error_marker() {
        let mut outcome = RegistrationOutcome::new("run");
        outcome.record_failure(RecordFailure {
            index: 0,
            log_date: None,
            time_slot: None,
            kind: FailureKind::Validation,
            message: "missing field `subject_id`".to_string(),
        });
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_outcome(&outcome).unwrap();
        assert!(output.starts_with("✗ 1 attempted, 0 succeeded, 1 failed (failed)"));
    }

    #[test]
    fn test_page_output() {
        let page = PageImage {
            image_path: PathBuf::from("extracted-images/sheet.png"),
            archived_source: None,
        };
        let quiet = Formatter::new(OutputFormat::Quiet, false);
        assert_eq!(quiet.format_page(&page).unwrap(), "extracted-images/sheet.png");
        let table = Formatter::new(OutputFormat::Table, false);
        assert_eq!(table.format_page(&page).unwrap(), "✓ Wrote extracted-images/sheet.png");
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
        assert_eq!(formatter.warning("test"), "⚠ test");
    }

    #[test]
    fn test_raw_field() {
        let raw = json!({"log_date": "2024-11-14", "time_slot": null, "appetite_score": 9});
        assert_eq!(raw_field(&raw, "log_date"), "2024-11-14");
        assert_eq!(raw_field(&raw, "time_slot"), "-");
        assert_eq!(raw_field(&raw, "appetite_score"), "9");
    }
}
