//! Extract-page command implementation.

use crate::cli::ExtractPageArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use carelog_pages::{PageConfig, PageExtractor, PdftoppmRenderer};

/// Build the page extractor for the configured staging layout.
pub(crate) fn page_extractor(config: &Config, pages: PageConfig) -> PageExtractor<PdftoppmRenderer> {
    PageExtractor::new(
        PdftoppmRenderer::new(pages.renderer.clone(), pages.dpi),
        pages,
        config.staging.images_dir(),
        config.staging.incoming_processed_dir(),
    )
}

/// Execute the extract-page command.
pub async fn execute_extract_page(args: ExtractPageArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let mut pages = config.pages.clone();
    if args.keep_source {
        pages.archive_sources = false;
    }

    let page = page_extractor(config, pages).extract(&args.source).await?;
    println!("{}", formatter.format_page(&page)?);

    Ok(())
}
