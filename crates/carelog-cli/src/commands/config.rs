//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::path::PathBuf;

/// Execute the config command.
pub fn execute_config(
    args: ConfigArgs,
    config: &Config,
    path: Option<PathBuf>,
    formatter: &Formatter,
) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => Config::default_path()?,
    };

    match args.action {
        ConfigAction::Show => {
            let mut shown = config.clone();
            if shown.store.password.is_some() {
                shown.store.password = Some("<redacted>".to_string());
            }
            print!("{}", shown.to_toml()?);
        }
        ConfigAction::Path => {
            println!("{}", path.display());
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::Config(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }
            config.save(&path)?;
            config.staging.ensure_dirs()?;
            println!("{}", formatter.success(&format!("Wrote {}", path.display())));
            println!(
                "{}",
                formatter.info(&format!("Staging area ready at {}", config.staging.root.display()))
            );
        }
    }

    Ok(())
}
