//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use carelog_domain::traits::Credentials;
use carelog_extractor::ExtractorConfig;
use carelog_gatekeeper::ValidationConfig;
use carelog_pages::PageConfig;
use carelog_registrar::RegistrarConfig;
use carelog_watcher::WatchConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides `store.password`.
pub const PASSWORD_ENV: &str = "CARELOG_PASSWORD";

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Staging area layout
    #[serde(default)]
    pub staging: StagingConfig,

    /// Page conversion
    #[serde(default)]
    pub pages: PageConfig,

    /// Extraction oracle
    #[serde(default)]
    pub oracle: OracleConfig,

    /// Record validation rules
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Extraction staging behaviour
    #[serde(default)]
    pub extraction: ExtractorConfig,

    /// Record store connection
    #[serde(default)]
    pub store: StoreConfig,

    /// Staging watcher
    #[serde(default)]
    pub watch: WatchConfig,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Staging area layout; directory names are relative to `root`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StagingConfig {
    /// Staging root
    pub root: PathBuf,

    /// Watched directory for source documents
    pub incoming: String,

    /// Page images
    pub images: String,

    /// Watched directory for batch artifacts
    pub batches: String,

    /// Archive subdirectory inside `incoming` and `batches`
    pub processed: String,
}

/// Record store connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base URL, e.g. `http://localhost:8000`
    pub base_url: String,

    /// Operator account
    pub username: String,

    /// Operator password; prefer the environment variable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Per-request timeout (seconds)
    pub timeout_secs: u64,

    /// Retries for transient failures
    pub max_retries: u32,

    /// Delay between retries (milliseconds)
    pub retry_delay_ms: u64,
}

/// Extraction oracle connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Ollama endpoint
    pub endpoint: String,

    /// Multimodal model name
    pub model: String,

    /// Maximum time for one oracle call (seconds)
    pub timeout_secs: u64,

    /// Retries for unreachable or failing servers
    pub max_retries: u32,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Get the default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".carelog").join("config.toml"))
    }

    /// Load configuration from `path` (or the default path), falling back to
    /// defaults when the file does not exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };

        let config = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            toml::from_str(&contents)?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = self.to_toml()?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Serialize as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("pages", self.pages.validate()),
            ("validation", self.validation.validate()),
            ("extraction", self.extraction.validate()),
            ("store", self.store.validate()),
            ("oracle", self.oracle.validate()),
            ("watch", self.watch.validate()),
        ];
        for (section, check) in checks {
            check.map_err(|e| CliError::Config(format!("[{}] {}", section, e)))?;
        }
        Ok(())
    }

    /// Extraction settings with the oracle timeout applied.
    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            oracle_timeout_secs: self.oracle.timeout_secs,
            ..self.extraction.clone()
        }
    }

    /// Registrar settings derived from the store section.
    pub fn registrar_config(&self, dry_run: bool) -> RegistrarConfig {
        RegistrarConfig {
            max_retries: self.store.max_retries,
            retry_delay_ms: self.store.retry_delay_ms,
            attempt_timeout_secs: self.store.timeout_secs,
            dry_run,
            processed_dir: Some(self.staging.batches_processed_dir()),
        }
    }
}

impl StagingConfig {
    /// Source document directory
    pub fn incoming_dir(&self) -> PathBuf {
        self.root.join(&self.incoming)
    }

    /// Archive for converted source documents
    pub fn incoming_processed_dir(&self) -> PathBuf {
        self.incoming_dir().join(&self.processed)
    }

    /// Page image directory; rejected-record reports are written here too
    pub fn images_dir(&self) -> PathBuf {
        self.root.join(&self.images)
    }

    /// Staged batch directory
    pub fn batches_dir(&self) -> PathBuf {
        self.root.join(&self.batches)
    }

    /// Archive for registered batches
    pub fn batches_processed_dir(&self) -> PathBuf {
        self.batches_dir().join(&self.processed)
    }

    /// Create every staging directory.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [
            self.incoming_processed_dir(),
            self.images_dir(),
            self.batches_processed_dir(),
        ] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

impl StoreConfig {
    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Operator credentials, with the password taken from
    /// [`PASSWORD_ENV`] when set.
    pub fn credentials(&self) -> Result<Credentials> {
        self.credentials_with(std::env::var(PASSWORD_ENV).ok())
    }

    fn credentials_with(&self, env_password: Option<String>) -> Result<Credentials> {
        if self.username.is_empty() {
            return Err(CliError::Config("store.username is not set".into()));
        }
        let password = env_password
            .filter(|p| !p.is_empty())
            .or_else(|| self.password.clone())
            .ok_or_else(|| {
                CliError::Config(format!("No store password: set {} or store.password", PASSWORD_ENV))
            })?;
        Ok(Credentials::new(self.username.clone(), password))
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(format!("base_url '{}' must start with http:// or https://", self.base_url));
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        if self.max_retries > 10 {
            return Err(format!("max_retries {} exceeds 10", self.max_retries));
        }
        Ok(())
    }
}

impl OracleConfig {
    /// Per-call timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.model.is_empty() {
            return Err("model must be set".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("staging"),
            incoming: "incoming-documents".to_string(),
            images: "extracted-images".to_string(),
            batches: "staged-batches".to_string(),
            processed: "processed".to_string(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            username: String::new(),
            password: None,
            timeout_secs: 30,
            max_retries: 2,
            retry_delay_ms: 500,
        }
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "llava".to_string(),
            timeout_secs: 180,
            max_retries: 2,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}
