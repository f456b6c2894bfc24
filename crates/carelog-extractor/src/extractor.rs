//! Core Extractor implementation

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::parse_oracle_response;
use crate::prompt::PromptBuilder;
use crate::types::{
    rejected_path, rejected_to_json, ExtractionMetadata, ExtractionRequest, ExtractionResult,
};
use carelog_domain::staging::write_atomic;
use carelog_domain::traits::OracleProvider;
use carelog_domain::ImportBatch;
use carelog_gatekeeper::{Gatekeeper, ValidationContext};
use chrono::Utc;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// The Extractor turns a page image into a staged batch awaiting review
pub struct Extractor<O>
where
    O: OracleProvider,
{
    oracle: Arc<O>,
    gatekeeper: Gatekeeper,
    config: ExtractorConfig,
}

impl<O> Extractor<O>
where
    O: OracleProvider + 'static,
{
    /// Create a new Extractor
    pub fn new(oracle: O, gatekeeper: Gatekeeper, config: ExtractorConfig) -> Self {
        Self {
            oracle: Arc::new(oracle),
            gatekeeper,
            config,
        }
    }

    /// Send the page image to the oracle and stage the validated records
    ///
    /// Rejected records are reported next to the image, never in the
    /// directory the registrar watches.
    pub async fn extract(&self, request: ExtractionRequest) -> Result<ExtractionResult, ExtractorError> {
        let started = Instant::now();

        let image = tokio::fs::read(&request.image_path)
            .await
            .map_err(|source| ExtractorError::Image {
                path: request.image_path.display().to_string(),
                source,
            })?;
        if image.len() > self.config.max_image_bytes {
            return Err(ExtractorError::ImageTooLarge(image.len(), self.config.max_image_bytes));
        }

        info!(
            "Starting extraction for subject {} over {} from {} ({} bytes)",
            request.subject,
            request.window,
            request.image_path.display(),
            image.len()
        );

        let prompt = PromptBuilder::new(request.subject, request.window, &request.output_path).build();
        debug!("Prompt length: {} chars", prompt.len());

        let response = timeout(self.config.oracle_timeout(), self.oracle.analyze(&prompt, &image))
            .await
            .map_err(|_| ExtractorError::Timeout)?
            .map_err(|e| ExtractorError::Oracle(e.to_string()))?;

        debug!("Oracle response length: {} chars", response.len());

        let items = parse_oracle_response(&response)?;
        let rejected_dir = request.image_path.parent().map(Path::to_path_buf);

        self.stage(
            &items,
            &request.context(),
            &request.output_path,
            rejected_dir.as_deref(),
            ExtractionMetadata {
                source: request.image_path.clone(),
                timestamp: Utc::now(),
                model_name: Some(self.oracle.model_name().to_string()),
                total_records: items.len(),
                processing_time_ms: 0,
            },
            started,
        )
    }

    /// Validate oracle output that was saved to a file, then stage it
    ///
    /// `input` must not be `output`: raw oracle output is never allowed to
    /// sit under a staged batch name, even briefly.
    pub fn validate_file(
        &self,
        input: &Path,
        context: &ValidationContext,
        output: &Path,
        rejected_dir: Option<&Path>,
    ) -> Result<ExtractionResult, ExtractorError> {
        if same_file(input, output) {
            return Err(ExtractorError::InPlace(input.display().to_string()));
        }

        let started = Instant::now();
        let contents = std::fs::read_to_string(input).map_err(|source| ExtractorError::Image {
            path: input.display().to_string(),
            source,
        })?;
        let items = parse_oracle_response(&contents)?;

        info!(
            "Validating {} saved records from {} for subject {}",
            items.len(),
            input.display(),
            context.subject
        );

        self.stage(
            &items,
            context,
            output,
            rejected_dir,
            ExtractionMetadata {
                source: input.to_path_buf(),
                timestamp: Utc::now(),
                model_name: None,
                total_records: items.len(),
                processing_time_ms: 0,
            },
            started,
        )
    }

    fn stage(
        &self,
        items: &[Value],
        context: &ValidationContext,
        output: &Path,
        rejected_dir: Option<&Path>,
        mut metadata: ExtractionMetadata,
        started: Instant,
    ) -> Result<ExtractionResult, ExtractorError> {
        let report = self.gatekeeper.validate_batch(items, context);

        let staged_path = if report.valid.is_empty() && !self.config.stage_empty {
            warn!("No valid records, nothing staged at {}", output.display());
            None
        } else {
            let batch = ImportBatch::from_records(report.valid.clone());
            write_atomic(output, batch.to_json_pretty()?.as_bytes())?;
            info!("Staged {} records at {}", report.valid.len(), output.display());
            Some(output.to_path_buf())
        };

        let rejected_path = match rejected_dir {
            Some(dir) if self.config.write_rejected && !report.rejected.is_empty() => {
                let path: PathBuf = rejected_path(output, dir);
                let json = serde_json::to_string_pretty(&rejected_to_json(&report.rejected))?;
                write_atomic(&path, json.as_bytes())?;
                warn!("{} rejected records written to {}", report.rejected.len(), path.display());
                Some(path)
            }
            _ => None,
        };

        metadata.timestamp = Utc::now();
        metadata.processing_time_ms = started.elapsed().as_millis() as u64;

        info!(
            "Extraction complete: {} valid, {} rejected, {} warnings",
            report.valid.len(),
            report.rejected.len(),
            report.warnings.len()
        );

        Ok(ExtractionResult {
            report,
            staged_path,
            rejected_path,
            metadata,
        })
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
