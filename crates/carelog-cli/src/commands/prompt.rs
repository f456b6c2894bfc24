//! Prompt command implementation.

use crate::cli::PromptArgs;
use crate::config::Config;
use crate::error::Result;
use carelog_extractor::PromptBuilder;

/// Execute the prompt command.
///
/// The prompt goes to stdout unformatted so it can be piped or pasted into an
/// oracle session. The oracle is told to save outside the watched
/// staged-batches directory; `carelog validate` stages the result.
pub fn execute_prompt(args: PromptArgs, config: &Config) -> Result<()> {
    let output = super::oracle_output_path(config, &args.constants, args.output)?;
    let builder = PromptBuilder::new(args.constants.subject_id()?, args.constants.window()?, output);
    println!("{}", builder.build());
    Ok(())
}
