//! Configuration for the Extractor

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Extractor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum time for a single oracle call (seconds)
    pub oracle_timeout_secs: u64,

    /// Largest page image accepted (bytes)
    pub max_image_bytes: usize,

    /// Write rejected records next to the page image
    pub write_rejected: bool,

    /// Stage a batch even when no record passed validation
    pub stage_empty: bool,
}

impl ExtractorConfig {
    /// Get the oracle timeout as a Duration
    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_secs(self.oracle_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.oracle_timeout_secs == 0 {
            return Err("oracle_timeout_secs must be greater than 0".to_string());
        }
        if self.max_image_bytes == 0 {
            return Err("max_image_bytes must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            oracle_timeout_secs: 180,
            max_image_bytes: 50 * 1024 * 1024,
            write_rejected: true,
            stage_empty: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.oracle_timeout(), Duration::from_secs(180));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = ExtractorConfig::default();
        config.oracle_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_keeps_timeout() {
        let config = ExtractorConfig::default();
        let parsed = ExtractorConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(config.oracle_timeout_secs, parsed.oracle_timeout_secs);
        assert_eq!(config.write_rejected, parsed.write_rejected);
    }
}
