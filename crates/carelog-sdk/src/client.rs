//! Record store client implementation.

use crate::error::{status_error, transport_error, SdkError};
use crate::session::obtain_token;
use async_trait::async_trait;
use carelog_domain::traits::{AuthToken, CreatedRecord, Credentials, RecordStore, StoreError, Subject};
use carelog_domain::CareLogCandidate;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Subject listing, either a bare array or a paginated envelope
#[derive(Deserialize)]
#[serde(untagged)]
enum SubjectList {
    Plain(Vec<Subject>),
    Paged { results: Vec<Subject> },
}

/// HTTP client for the care-log record store
#[derive(Debug, Clone)]
pub struct RecordStoreClient {
    base_url: String,
    http: reqwest::Client,
}

impl RecordStoreClient {
    /// Create a client with the default timeout
    pub fn new(base_url: &str) -> Result<Self, SdkError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client whose every request is bounded by `timeout`
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, SdkError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(SdkError::InvalidEndpoint(base_url.to_string()));
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.to_string(),
            http,
        })
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn read_error(response: reqwest::Response) -> StoreError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        status_error(status, body)
    }
}

#[async_trait]
impl RecordStore for RecordStoreClient {
    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthToken, StoreError> {
        obtain_token(&self.http, &self.base_url, credentials).await
    }

    async fn list_subjects(&self, token: &AuthToken) -> Result<Vec<Subject>, StoreError> {
        let url = format!("{}/api/animals/", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(token.bearer())
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        let list: SubjectList = response.json().await.map_err(transport_error)?;
        let subjects = match list {
            SubjectList::Plain(subjects) => subjects,
            SubjectList::Paged { results } => results,
        };
        debug!("Store lists {} subjects", subjects.len());
        Ok(subjects)
    }

    async fn create_record(
        &self,
        token: &AuthToken,
        record: &CareLogCandidate,
    ) -> Result<CreatedRecord, StoreError> {
        let url = format!("{}/api/care-logs/", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(token.bearer())
            .json(record)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        let body = response.text().await.map_err(transport_error)?;
        if body.trim().is_empty() {
            return Ok(CreatedRecord { id: None });
        }
        serde_json::from_str(&body).map_err(|e| StoreError::InvalidResponse(e.to_string()))
    }
}
