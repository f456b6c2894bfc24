//! Ollama Provider Implementation
//!
//! Sends a page image to a local multimodal model through Ollama's
//! `/api/generate` endpoint.
//!
//! # Examples
//!
//! ```no_run
//! use carelog_llm::OllamaProvider;
//!
//! let provider = OllamaProvider::new("http://localhost:11434", "llava").unwrap();
//! ```

use crate::LlmError;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use carelog_domain::traits::OracleProvider;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default timeout for one oracle request
pub const DEFAULT_TIMEOUT_SECS: u64 = 180;

/// Default number of retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Default fixed delay between attempts
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;

/// Ollama API provider for multimodal extraction
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    max_retries: u32,
    retry_delay: Duration,
}

/// Request body for Ollama generate API
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    images: Vec<String>,
    stream: bool,
}

/// Response from Ollama generate API
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

impl OllamaProvider {
    /// Create a new Ollama provider with the default timeout
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_timeout(endpoint, model, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new Ollama provider with an explicit request timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        })
    }

    /// Set the number of retries after the first attempt
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the fixed delay between attempts
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Endpoint this provider talks to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send the prompt and image, returning the model's raw text
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Ollama is not running
    /// - Model is not available
    /// - Response format is invalid
    pub async fn generate(&self, prompt: &str, image: &[u8]) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.endpoint);

        let request_body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            images: vec![STANDARD.encode(image)],
            stream: false,
        };

        let mut attempt = 0;
        loop {
            let error = match self.client.post(&url).json(&request_body).send().await {
                Ok(response) if response.status().is_success() => {
                    let body = response.json::<OllamaGenerateResponse>().await.map_err(|e| {
                        LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
                    })?;
                    debug!("Oracle returned {} chars", body.response.len());
                    return Ok(body.response);
                }
                Ok(response) if response.status() == reqwest::StatusCode::NOT_FOUND => {
                    return Err(LlmError::ModelNotAvailable(self.model.clone()));
                }
                Ok(response) if response.status().is_client_error() => {
                    let status = response.status();
                    let text = response.text().await.unwrap_or_default();
                    return Err(LlmError::Communication(format!("HTTP {}: {}", status, text)));
                }
                Ok(response) => {
                    let status = response.status();
                    let text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    LlmError::Communication(format!("HTTP {}: {}", status, text))
                }
                Err(e) => LlmError::Communication(format!("Request failed: {}", e)),
            };

            if attempt >= self.max_retries {
                return Err(error);
            }
            attempt += 1;
            warn!(
                "Oracle request failed ({}), retry {}/{}",
                error, attempt, self.max_retries
            );
            tokio::time::sleep(self.retry_delay).await;
        }
    }
}

#[async_trait]
impl OracleProvider for OllamaProvider {
    type Error = LlmError;

    async fn analyze(&self, prompt: &str, image: &[u8]) -> Result<String, Self::Error> {
        self.generate(prompt, image).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_ollama_provider_creation() {
        let provider = OllamaProvider::new("http://localhost:11434/", "llava").unwrap();
        assert_eq!(provider.endpoint(), "http://localhost:11434");
        assert_eq!(provider.model_name(), "llava");
        assert_eq!(provider.max_retries, DEFAULT_MAX_RETRIES);
    }

    #[tokio::test]
    async fn test_sends_image_as_base64() {
        let router = Router::new().route(
            "/api/generate",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["stream"], false);
                assert_eq!(body["images"][0], "cG5n");
                Json(json!({"response": "[]", "done": true}))
            }),
        );
        let endpoint = serve(router).await;

        let provider = OllamaProvider::new(endpoint, "llava").unwrap();
        let result = provider.analyze("prompt", b"png").await.unwrap();
        assert_eq!(result, "[]");
    }

    #[tokio::test]
    async fn test_retries_server_errors_then_gives_up() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let router = Router::new().route(
            "/api/generate",
            post(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
                }
            }),
        );
        let endpoint = serve(router).await;

        let provider = OllamaProvider::new(endpoint, "llava")
            .unwrap()
            .with_max_retries(2)
            .with_retry_delay(Duration::from_millis(1));
        let result = provider.analyze("prompt", b"").await;

        assert!(matches!(result, Err(LlmError::Communication(_))));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_unknown_model() {
        let router = Router::new().route(
            "/api/generate",
            post(|| async { (StatusCode::NOT_FOUND, "model not found") }),
        );
        let endpoint = serve(router).await;

        let provider = OllamaProvider::new(endpoint, "missing").unwrap();
        let result = provider.analyze("prompt", b"").await;
        assert!(matches!(result, Err(LlmError::ModelNotAvailable(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let provider = OllamaProvider::new("http://127.0.0.1:9", "llava")
            .unwrap()
            .with_max_retries(0);
        let result = provider.analyze("test", b"").await;
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }
}
