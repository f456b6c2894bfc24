//! Watcher configuration

use crate::Phase;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One `{pattern, phase}` entry; patterns are relative to the staging root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Glob pattern, e.g. `staged-batches/*.json`
    pub pattern: String,

    /// Phase to run for matching files
    pub phase: Phase,
}

impl TriggerConfig {
    /// Create a trigger entry
    pub fn new(pattern: impl Into<String>, phase: Phase) -> Self {
        Self {
            pattern: pattern.into(),
            phase,
        }
    }
}

/// Configuration for the staging watcher
///
/// # Examples
///
/// ```
/// use carelog_watcher::{Phase, WatchConfig};
///
/// let config = WatchConfig::default();
/// assert_eq!(config.debounce_ms, 2000);
/// assert_eq!(config.triggers[1].phase, Phase::Register);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Quiet period before a changed file is dispatched (milliseconds)
    pub debounce_ms: u64,

    /// Trigger table, evaluated in order; first match wins
    pub triggers: Vec<TriggerConfig>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 2000,
            triggers: vec![
                TriggerConfig::new("incoming-documents/*.pdf", Phase::ExtractPage),
                TriggerConfig::new("staged-batches/*.json", Phase::Register),
            ],
        }
    }
}

impl WatchConfig {
    /// Debounce window
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.triggers.is_empty() {
            return Err("at least one trigger is required".to_string());
        }
        if self.debounce_ms > 600_000 {
            return Err(format!("debounce_ms {} exceeds 600000", self.debounce_ms));
        }
        if let Some(t) = self.triggers.iter().find(|t| t.pattern.starts_with('/')) {
            return Err(format!("trigger pattern '{}' must be relative to the staging root", t.pattern));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triggers_from_toml() {
        let config: WatchConfig = toml::from_str(
            r#"
            debounce_ms = 500

            [[triggers]]
            pattern = "incoming-documents/*.PDF"
            phase = "extract-page"
            "#,
        )
        .unwrap();

        assert_eq!(config.debounce_ms, 500);
        assert_eq!(config.triggers, vec![TriggerConfig::new("incoming-documents/*.PDF", Phase::ExtractPage)]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_absolute_pattern_rejected() {
        let config = WatchConfig {
            triggers: vec![TriggerConfig::new("/tmp/*.json", Phase::Register)],
            ..WatchConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_trigger_table_rejected() {
        let config = WatchConfig {
            triggers: Vec::new(),
            ..WatchConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
