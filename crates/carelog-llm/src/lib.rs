//! Carelog Oracle Provider Layer
//!
//! Pluggable multimodal oracle implementations.
//!
//! # Architecture
//!
//! This crate provides implementations of the `OracleProvider` trait from
//! `carelog-domain`. The oracle receives a prompt plus a page image and returns
//! raw text; everything it returns is treated as untrusted downstream.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OllamaProvider`: Local Ollama multimodal API integration
//!
//! # Examples
//!
//! ```no_run
//! use carelog_llm::MockProvider;
//! use carelog_domain::traits::OracleProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut provider = MockProvider::new("[]");
//! provider.add_response("read the sheet", r#"[{"log_date": "2024-11-14"}]"#);
//!
//! let result = provider.analyze("read the sheet", b"png bytes").await?;
//! assert!(result.contains("2024-11-14"));
//! assert_eq!(provider.call_count(), 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod ollama;

use async_trait::async_trait;
use carelog_domain::traits::OracleProvider;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use ollama::OllamaProvider;

/// Errors that can occur during oracle operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from the oracle
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("Oracle error: {0}")]
    Other(String),
}

/// Mock oracle for deterministic testing
///
/// Returns pre-configured responses without making any network calls and
/// records the size of every image it was handed.
///
/// # Examples
///
/// ```
/// use carelog_llm::MockProvider;
///
/// let mut provider = MockProvider::new("[]");
/// provider.add_error("bad prompt");
/// assert_eq!(provider.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, String>>>,
    calls: Arc<Mutex<Vec<usize>>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a specific response for a given prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.insert(prompt.into(), response.into());
        }
    }

    /// Configure to return an error for a specific prompt
    pub fn add_error(&mut self, prompt: impl Into<String>) {
        self.add_response(prompt, "ERROR");
    }

    /// Get the number of times analyze was called
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }

    /// Image sizes received, in call order
    pub fn image_sizes(&self) -> Vec<usize> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("[]")
    }
}

#[async_trait]
impl OracleProvider for MockProvider {
    type Error = LlmError;

    async fn analyze(&self, prompt: &str, image: &[u8]) -> Result<String, Self::Error> {
        self.calls
            .lock()
            .map_err(|_| LlmError::Other("mock state poisoned".to_string()))?
            .push(image.len());

        let responses = self
            .responses
            .lock()
            .map_err(|_| LlmError::Other("mock state poisoned".to_string()))?;
        if let Some(response) = responses.get(prompt) {
            if response == "ERROR" {
                return Err(LlmError::Other("Mock error".to_string()));
            }
            return Ok(response.clone());
        }

        Ok(self.default_response.clone())
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
