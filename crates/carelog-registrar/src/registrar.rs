//! Core Registrar implementation

use crate::{RegistrarConfig, RegistrarError};
use carelog_domain::staging::relocate;
use carelog_domain::traits::{AuthToken, Credentials, RecordStore, StoreError};
use carelog_domain::{
    BatchDeclaration, BatchEntry, CareLogCandidate, FailureKind, ImportBatch, RecordFailure, RegistrationOutcome,
    SubjectId, TimeSlot,
};
use carelog_gatekeeper::Gatekeeper;
use chrono::NaiveDate;
use serde_json::Value;
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Commits a staged batch to the record store, one record at a time
pub struct Registrar<S: RecordStore> {
    store: S,
    credentials: Credentials,
    gatekeeper: Gatekeeper,
    config: RegistrarConfig,
}

impl<S: RecordStore> Registrar<S> {
    /// Create a new Registrar
    pub fn new(store: S, credentials: Credentials, gatekeeper: Gatekeeper, config: RegistrarConfig) -> Self {
        Self {
            store,
            credentials,
            gatekeeper,
            config,
        }
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Active configuration
    pub fn config(&self) -> &RegistrarConfig {
        &self.config
    }

    /// Register every record of the artifact at `path`
    ///
    /// The artifact name declares the subject and date window the batch was
    /// staged for; every record is re-checked against it. Fatal problems
    /// (unreadable or undeclared artifact, mixed subjects, authentication,
    /// unknown subject) are detected before the first record is submitted
    /// and leave the artifact untouched. Otherwise every entry is attempted in
    /// file order and the artifact is moved to the archive directory.
    pub async fn register_file(&self, path: &Path) -> Result<RegistrationOutcome, RegistrarError> {
        let mut outcome = RegistrationOutcome::new(Uuid::now_v7().to_string());
        outcome.artifact = Some(path.to_path_buf());
        outcome.dry_run = self.config.dry_run;

        info!("Run {}: registering {}", outcome.run_id, path.display());

        let batch = ImportBatch::load(path).map_err(|e| {
            error!("Run {}: cannot read {}: {}", outcome.run_id, path.display(), e);
            RegistrarError::UnreadableBatch {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;

        let declared = BatchDeclaration::from_path(path).ok_or_else(|| {
            error!("Run {}: {} does not declare a subject and window", outcome.run_id, path.display());
            RegistrarError::UndeclaredBatch(path.to_path_buf())
        })?;
        debug!(
            "Run {}: declared subject {}, window {}",
            outcome.run_id, declared.subject, declared.window
        );

        let subjects = batch.subjects();
        if subjects.len() > 1 {
            error!("Run {}: batch mixes subjects {:?}", outcome.run_id, subjects);
            return Err(RegistrarError::MixedSubjects(subjects));
        }

        match subjects.first() {
            Some(_) => {
                let token = self.open_session(&outcome.run_id, declared.subject).await?;
                self.attempt_all(&batch, &declared, &token, &mut outcome).await;
            }
            None if batch.is_empty() => {
                info!("Run {}: batch is empty", outcome.run_id);
            }
            None => {
                // Nothing well-formed to submit; every entry fails validation
                warn!("Run {}: no readable record in batch", outcome.run_id);
                self.attempt_all_malformed(&batch, &mut outcome);
            }
        }

        if !self.config.dry_run {
            let processed = self.processed_dir(path);
            match relocate(path, &processed) {
                Ok(archived) => {
                    info!("Run {}: archived to {}", outcome.run_id, archived.display());
                    outcome.archived_to = Some(archived);
                }
                Err(e) => {
                    error!("Run {}: archiving {} failed: {}", outcome.run_id, path.display(), e);
                    return Err(RegistrarError::Archive {
                        outcome: Box::new(outcome),
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!("Run {}: {}", outcome.run_id, outcome.summary());
        Ok(outcome)
    }

    /// Authenticate once and confirm the subject exists
    async fn open_session(&self, run_id: &str, subject: SubjectId) -> Result<AuthToken, RegistrarError> {
        let token = self
            .with_retries("authentication", || self.store.authenticate(&self.credentials))
            .await
            .map_err(|e| {
                error!("Run {}: authentication failed: {}", run_id, e);
                RegistrarError::Authentication(e)
            })?;
        debug!("Run {}: authenticated as {}", run_id, self.credentials.username);

        let exists = self
            .with_retries("subject lookup", || self.store.subject_exists(&token, subject))
            .await
            .map_err(RegistrarError::SubjectLookup)?;
        if !exists {
            error!("Run {}: subject {} does not exist", run_id, subject);
            return Err(RegistrarError::UnknownSubject(subject));
        }

        Ok(token)
    }

    async fn attempt_all(
        &self,
        batch: &ImportBatch,
        declared: &BatchDeclaration,
        token: &AuthToken,
        outcome: &mut RegistrationOutcome,
    ) {
        for (index, entry) in batch.entries().iter().enumerate() {
            let record = match entry {
                BatchEntry::Record(record) => record,
                BatchEntry::Malformed { reason, raw } => {
                    self.fail(outcome, malformed_failure(index, reason, raw));
                    continue;
                }
            };

            let reasons = self.gatekeeper.check_staged(record, declared);
            if !reasons.is_empty() {
                let message = reasons
                    .iter()
                    .map(|r| r.to_string())
                    .collect::<Vec<_>>()
                    .join("; ");
                self.fail(outcome, record_failure(index, record, FailureKind::Validation, message));
                continue;
            }

            if self.config.dry_run {
                debug!("Record {} ({}) would be submitted", index, record.key());
                outcome.record_success();
                continue;
            }

            match self
                .with_retries("record creation", || self.store.create_record(token, record))
                .await
            {
                Ok(created) => {
                    debug!("Record {} ({}) created with id {:?}", index, record.key(), created.id);
                    outcome.record_success();
                }
                Err(e) => {
                    let kind = failure_kind(&e);
                    self.fail(outcome, record_failure(index, record, kind, e.to_string()));
                }
            }
        }
    }

    fn attempt_all_malformed(&self, batch: &ImportBatch, outcome: &mut RegistrationOutcome) {
        for (index, entry) in batch.entries().iter().enumerate() {
            if let BatchEntry::Malformed { reason, raw } = entry {
                self.fail(outcome, malformed_failure(index, reason, raw));
            }
        }
    }

    fn fail(&self, outcome: &mut RegistrationOutcome, failure: RecordFailure) {
        warn!(
            "Run {}: record {} failed ({}): {}",
            outcome.run_id, failure.index, failure.kind, failure.message
        );
        outcome.record_failure(failure);
    }

    /// Run `op` under the attempt timeout, retrying transient failures
    async fn with_retries<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T, StoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let mut retries = 0;
        loop {
            let result = match timeout(self.config.attempt_timeout(), op()).await {
                Ok(result) => result,
                Err(_) => Err(StoreError::Timeout),
            };
            match result {
                Err(e) if e.is_transient() && retries < self.config.max_retries => {
                    retries += 1;
                    warn!(
                        "{} failed ({}), retry {}/{}",
                        what, e, retries, self.config.max_retries
                    );
                    sleep(self.config.retry_delay()).await;
                }
                other => return other,
            }
        }
    }

    fn processed_dir(&self, path: &Path) -> PathBuf {
        match &self.config.processed_dir {
            Some(dir) => dir.clone(),
            None => path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join("processed"),
        }
    }
}

fn failure_kind(error: &StoreError) -> FailureKind {
    match error {
        StoreError::Unauthorized(_) => FailureKind::Unauthorized,
        StoreError::Conflict(_) => FailureKind::Conflict,
        StoreError::Rejected { .. } => FailureKind::Rejected,
        StoreError::Timeout => FailureKind::Timeout,
        StoreError::Transient(_) | StoreError::InvalidResponse(_) => FailureKind::Network,
    }
}

fn record_failure(index: usize, record: &CareLogCandidate, kind: FailureKind, message: String) -> RecordFailure {
    RecordFailure {
        index,
        log_date: Some(record.log_date),
        time_slot: Some(record.time_slot),
        kind,
        message,
    }
}

/// Best-effort date and slot for an entry that did not deserialize
fn malformed_failure(index: usize, reason: &str, raw: &Value) -> RecordFailure {
    RecordFailure {
        index,
        log_date: raw
            .get("log_date")
            .and_then(Value::as_str)
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()),
        time_slot: raw.get("time_slot").and_then(Value::as_str).and_then(TimeSlot::parse),
        kind: FailureKind::Validation,
        message: reason.to_string(),
    }
}
