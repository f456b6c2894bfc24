//! Validate command implementation.

use crate::cli::ValidateArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use carelog_gatekeeper::ValidationContext;
use std::path::Path;

/// Execute the validate command.
///
/// Used when the oracle was run outside the pipeline and saved its answer to
/// a file. The input must live outside the watched staged-batches directory,
/// where the registrar would otherwise pick up unvalidated rows.
pub fn execute_validate(args: ValidateArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let batches_dir = config.staging.batches_dir();
    if in_dir(&args.input, &batches_dir) {
        return Err(CliError::InvalidInput(format!(
            "{} is inside {}; save oracle output elsewhere (default: {})",
            args.input.display(),
            batches_dir.display(),
            config.staging.images_dir().display()
        )));
    }

    let extractor = super::extract::ollama_extractor(config, None)?;
    let context = ValidationContext::new(args.constants.subject_id()?, args.constants.window()?);
    let output = super::batch_path(config, &args.constants, args.output_dir)?;
    let rejected_dir = config.staging.images_dir();

    let result = extractor.validate_file(&args.input, &context, &output, Some(&rejected_dir))?;
    println!("{}", formatter.format_extraction(&result)?);

    Ok(())
}

fn in_dir(path: &Path, dir: &Path) -> bool {
    match (path.parent().map(Path::canonicalize), dir.canonicalize()) {
        (Some(Ok(parent)), Ok(dir)) => parent == dir,
        _ => path.parent() == Some(dir),
    }
}
