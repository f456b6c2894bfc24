//! Gatekeeper configuration

use serde::{Deserialize, Serialize};

/// Configuration for validation rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Accept plain integers in [1, 5] for scores in addition to marks
    pub accept_numeric_scores: bool,

    /// Reject a record whose (date, slot) already appeared earlier in the batch
    pub reject_duplicate_slots: bool,

    /// Maximum length of the aggregated notes (characters)
    pub max_notes_length: usize,

    /// Date formats tried in order when reading `log_date`
    pub date_formats: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            accept_numeric_scores: true,
            reject_duplicate_slots: false,
            max_notes_length: 2_000,
            date_formats: vec!["%Y-%m-%d".to_string(), "%Y/%m/%d".to_string()],
        }
    }
}

impl ValidationConfig {
    /// Strict configuration: marks only, duplicates rejected, ISO dates only
    pub fn strict() -> Self {
        Self {
            accept_numeric_scores: false,
            reject_duplicate_slots: true,
            max_notes_length: 1_000,
            date_formats: vec!["%Y-%m-%d".to_string()],
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_notes_length == 0 {
            return Err("max_notes_length must be greater than 0".to_string());
        }
        if self.date_formats.is_empty() {
            return Err("date_formats must not be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ValidationConfig::default();
        assert!(config.accept_numeric_scores);
        assert!(!config.reject_duplicate_slots);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_strict_config() {
        let config = ValidationConfig::strict();
        assert!(config.reject_duplicate_slots);
        assert_eq!(config.date_formats, vec!["%Y-%m-%d"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let mut config = ValidationConfig::default();
        config.date_formats.clear();
        assert!(config.validate().is_err());
    }
}
