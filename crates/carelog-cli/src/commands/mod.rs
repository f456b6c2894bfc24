//! Command implementations.

pub mod config;
pub mod extract;
pub mod extract_page;
pub mod prompt;
pub mod register;
pub mod validate;
pub mod watch;

pub use self::config::execute_config;
pub use self::extract::execute_extract;
pub use self::extract_page::execute_extract_page;
pub use self::prompt::execute_prompt;
pub use self::register::execute_register;
pub use self::validate::execute_validate;
pub use self::watch::execute_watch;

use crate::cli::RunConstants;
use crate::config::Config;
use crate::error::Result;
use carelog_extractor::{default_batch_name, oracle_output_name};
use std::path::PathBuf;

/// `<dir>/<subject>_<from>_<to>.json`, where `dir` defaults to the staged-batches directory.
///
/// The name is fixed: it declares the subject and window the registrar
/// re-checks every record against.
pub(crate) fn batch_path(config: &Config, constants: &RunConstants, output_dir: Option<PathBuf>) -> Result<PathBuf> {
    let dir = output_dir.unwrap_or_else(|| config.staging.batches_dir());
    Ok(dir.join(default_batch_name(constants.subject_id()?, &constants.window()?)))
}

/// Explicit path, or `<extracted-images>/<subject>_<from>_<to>.oracle.json`.
pub(crate) fn oracle_output_path(config: &Config, constants: &RunConstants, output: Option<PathBuf>) -> Result<PathBuf> {
    match output {
        Some(path) => Ok(path),
        None => Ok(config
            .staging
            .images_dir()
            .join(oracle_output_name(constants.subject_id()?, &constants.window()?))),
    }
}
