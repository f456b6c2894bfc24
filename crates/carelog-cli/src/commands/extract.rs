//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use carelog_extractor::{ExtractionRequest, Extractor};
use carelog_gatekeeper::Gatekeeper;
use carelog_llm::OllamaProvider;

/// Build an extractor backed by the configured Ollama model.
pub(crate) fn ollama_extractor(config: &Config, model: Option<String>) -> Result<Extractor<OllamaProvider>> {
    let model = model.unwrap_or_else(|| config.oracle.model.clone());
    let oracle = OllamaProvider::with_timeout(config.oracle.endpoint.clone(), model, config.oracle.timeout())?
        .with_max_retries(config.oracle.max_retries);

    Ok(Extractor::new(
        oracle,
        Gatekeeper::new(config.validation.clone()),
        config.extractor_config(),
    ))
}

/// Execute the extract command.
pub async fn execute_extract(args: ExtractArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let extractor = ollama_extractor(config, args.model)?;

    let request = ExtractionRequest {
        image_path: args.image,
        subject: args.constants.subject_id()?,
        window: args.constants.window()?,
        output_path: super::batch_path(config, &args.constants, args.output_dir)?,
    };

    let result = extractor.extract(request).await?;
    println!("{}", formatter.format_extraction(&result)?);

    Ok(())
}
