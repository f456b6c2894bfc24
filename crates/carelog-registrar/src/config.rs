//! Configuration for the Batch Registrar

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for registration runs
///
/// # Examples
///
/// ```
/// use carelog_registrar::RegistrarConfig;
///
/// let config = RegistrarConfig::default();
/// assert_eq!(config.max_retries, 2);
/// assert!(!config.dry_run);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrarConfig {
    /// Retries after the first attempt, transient failures only
    pub max_retries: u32,

    /// Fixed delay between attempts (milliseconds)
    pub retry_delay_ms: u64,

    /// Time budget for one attempt (seconds)
    pub attempt_timeout_secs: u64,

    /// Validate and authenticate without creating records or moving the artifact
    #[serde(default)]
    pub dry_run: bool,

    /// Archive directory; defaults to `processed/` beside the artifact
    #[serde(default)]
    pub processed_dir: Option<PathBuf>,
}

impl Default for RegistrarConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            retry_delay_ms: 500,
            attempt_timeout_secs: 30,
            dry_run: false,
            processed_dir: None,
        }
    }
}

impl RegistrarConfig {
    /// Delay between attempts
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Budget for one attempt
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_retries > 10 {
            return Err(format!("max_retries {} exceeds 10", self.max_retries));
        }
        if self.attempt_timeout_secs == 0 {
            return Err("attempt_timeout_secs must be greater than 0".to_string());
        }
        if self.retry_delay_ms > 60_000 {
            return Err("retry_delay_ms must not exceed 60000".to_string());
        }
        Ok(())
    }
}
