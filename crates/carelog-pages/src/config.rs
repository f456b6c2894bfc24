//! Page extractor configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for page conversion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Renderer executable
    pub renderer: String,

    /// Raster resolution
    pub dpi: u32,

    /// Maximum time for one conversion (seconds)
    pub timeout_secs: u64,

    /// Accepted source extensions, compared case-insensitively
    pub accepted_extensions: Vec<String>,

    /// Move converted sources to the processed directory
    pub archive_sources: bool,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            renderer: "pdftoppm".to_string(),
            dpi: 300,
            timeout_secs: 60,
            accepted_extensions: vec!["pdf".to_string()],
            archive_sources: true,
        }
    }
}

impl PageConfig {
    /// Conversion timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Whether `ext` is an accepted source extension
    pub fn accepts(&self, ext: &str) -> bool {
        self.accepted_extensions
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(ext))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.renderer.trim().is_empty() {
            return Err("renderer must not be empty".to_string());
        }
        if !(72..=1200).contains(&self.dpi) {
            return Err(format!("dpi {} out of range [72, 1200]", self.dpi));
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        if self.accepted_extensions.is_empty() {
            return Err("accepted_extensions must not be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PageConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.dpi, 300);
        assert!(config.accepts("PDF"));
        assert!(!config.accepts("png"));
    }

    #[test]
    fn test_invalid_dpi() {
        let config = PageConfig {
            dpi: 10,
            ..PageConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
