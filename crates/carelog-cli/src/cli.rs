//! CLI command definitions and argument parsing.

use carelog_domain::{DateWindow, SubjectId};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Carelog - import handwritten care-log sheets into the record store.
#[derive(Debug, Parser)]
#[command(name = "carelog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "CARELOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `carelog_registrar=trace` (overrides RUST_LOG)
    #[arg(long, global = true)]
    pub log: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (paths and summaries only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert page one of a source document into an image
    ExtractPage(ExtractPageArgs),

    /// Print the extraction prompt for a page image
    Prompt(PromptArgs),

    /// Run the oracle on a page image and stage the validated batch
    Extract(ExtractArgs),

    /// Validate saved oracle output and stage it
    Validate(ValidateArgs),

    /// Commit a staged batch to the record store
    Register(RegisterArgs),

    /// Watch the staging area and run phases as files arrive
    Watch(WatchArgs),

    /// Show or initialise the configuration
    Config(ConfigArgs),
}

/// Operator-supplied subject and date window.
#[derive(Debug, Clone, Args)]
pub struct RunConstants {
    /// Subject (animal) identifier
    #[arg(short, long)]
    pub subject: u64,

    /// First date of the sheet (YYYY-MM-DD)
    #[arg(long)]
    pub from: NaiveDate,

    /// Last date of the sheet (YYYY-MM-DD); defaults to --from
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

impl RunConstants {
    /// Validated subject id
    pub fn subject_id(&self) -> crate::Result<SubjectId> {
        SubjectId::new(self.subject)
            .ok_or_else(|| crate::CliError::InvalidInput("subject must be a positive integer".to_string()))
    }

    /// Validated inclusive window
    pub fn window(&self) -> crate::Result<DateWindow> {
        Ok(DateWindow::new(self.from, self.to.unwrap_or(self.from))?)
    }
}

/// Arguments for the extract-page command.
#[derive(Debug, Parser)]
pub struct ExtractPageArgs {
    /// Source document
    pub source: PathBuf,

    /// Keep the source in place instead of archiving it
    #[arg(long)]
    pub keep_source: bool,
}

/// Arguments for the prompt command.
#[derive(Debug, Parser)]
pub struct PromptArgs {
    #[command(flatten)]
    pub constants: RunConstants,

    /// Where the oracle should save its raw output; defaults to
    /// `<extracted-images>/<subject>_<from>_<to>.oracle.json`
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Page image
    pub image: PathBuf,

    #[command(flatten)]
    pub constants: RunConstants,

    /// Directory for the staged `<subject>_<from>_<to>.json`; defaults to the staged-batches directory
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Oracle model, overriding the configuration
    #[arg(short, long)]
    pub model: Option<String>,
}

/// Arguments for the validate command.
#[derive(Debug, Parser)]
pub struct ValidateArgs {
    /// Saved oracle output (JSON array)
    pub input: PathBuf,

    #[command(flatten)]
    pub constants: RunConstants,

    /// Directory for the staged `<subject>_<from>_<to>.json`; defaults to the staged-batches directory
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

/// Arguments for the register command.
#[derive(Debug, Parser)]
pub struct RegisterArgs {
    /// Staged batch artifact
    pub batch: PathBuf,

    /// Authenticate and check records without creating them
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the watch command.
#[derive(Debug, Parser)]
pub struct WatchArgs {
    /// Process files already present, then exit
    #[arg(long)]
    pub once: bool,

    /// Run the register phase in dry-run mode
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Write a default configuration file and create the staging directories
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_command() {
        let cli = Cli::parse_from([
            "carelog",
            "extract",
            "staging/extracted-images/sheet.png",
            "--subject",
            "12",
            "--from",
            "2024-11-14",
            "--to",
            "2024-11-20",
        ]);
        match cli.command {
            Command::Extract(args) => {
                assert_eq!(args.constants.subject_id().unwrap().value(), 12);
                assert_eq!(args.constants.window().unwrap().days(), 7);
            }
            _ => panic!("Expected Extract command"),
        }
    }

    #[test]
    fn test_single_day_window() {
        let cli = Cli::parse_from(["carelog", "prompt", "-s", "3", "--from", "2024-11-14"]);
        match cli.command {
            Command::Prompt(args) => assert_eq!(args.constants.window().unwrap().days(), 1),
            _ => panic!("Expected Prompt command"),
        }
    }

    #[test]
    fn test_reversed_window_rejected() {
        let cli = Cli::parse_from([
            "carelog", "validate", "out.json", "-s", "3", "--from", "2024-11-20", "--to", "2024-11-14",
        ]);
        match cli.command {
            Command::Validate(args) => assert!(args.constants.window().is_err()),
            _ => panic!("Expected Validate command"),
        }
    }

    #[test]
    fn test_zero_subject_rejected() {
        let cli = Cli::parse_from(["carelog", "prompt", "-s", "0", "--from", "2024-11-14"]);
        match cli.command {
            Command::Prompt(args) => assert!(args.constants.subject_id().is_err()),
            _ => panic!("Expected Prompt command"),
        }
    }

    #[test]
    fn test_bad_date_is_a_parse_error() {
        let result = Cli::try_parse_from(["carelog", "prompt", "-s", "3", "--from", "14/11/2024"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_output_dir() {
        let cli = Cli::parse_from([
            "carelog", "validate", "out.json", "-s", "3", "--from", "2024-11-14", "--output-dir", "elsewhere",
        ]);
        match cli.command {
            Command::Validate(args) => assert_eq!(args.output_dir, Some(PathBuf::from("elsewhere"))),
            _ => panic!("Expected Validate command"),
        }
    }

    #[test]
    fn test_register_dry_run() {
        let cli = Cli::parse_from(["carelog", "--format", "json", "register", "batch.json", "--dry-run"]);
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        match cli.command {
            Command::Register(args) => assert!(args.dry_run),
            _ => panic!("Expected Register command"),
        }
    }
}
