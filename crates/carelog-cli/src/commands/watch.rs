//! Watch command implementation.

use crate::cli::WatchArgs;
use crate::config::{Config, OutputFormat};
use crate::error::Result;
use crate::output::Formatter;
use async_trait::async_trait;
use carelog_pages::{PageExtractor, PdftoppmRenderer};
use carelog_registrar::Registrar;
use carelog_sdk::RecordStoreClient;
use carelog_watcher::{Dispatcher, Phase, StagingWatcher, WatcherError};
use std::path::Path;

/// Runs the automatic phases for files the watcher hands over.
struct PipelineDispatcher<'a> {
    pages: PageExtractor<PdftoppmRenderer>,
    registrar: Registrar<RecordStoreClient>,
    formatter: &'a Formatter,
}

#[async_trait]
impl<'a> Dispatcher for PipelineDispatcher<'a> {
    async fn dispatch(&self, phase: Phase, path: &Path) -> std::result::Result<(), WatcherError> {
        match phase {
            Phase::ExtractPage => {
                let page = self
                    .pages
                    .extract(path)
                    .await
                    .map_err(|e| WatcherError::Dispatch(e.to_string()))?;
                let rendered = self
                    .formatter
                    .format_page(&page)
                    .map_err(|e| WatcherError::Dispatch(e.to_string()))?;
                println!("{}", rendered);
                if self.formatter.format() == OutputFormat::Table {
                    println!(
                        "{}",
                        self.formatter.info(&format!(
                            "Next: carelog extract {} --subject <id> --from <date> --to <date>",
                            page.image_path.display()
                        ))
                    );
                }
            }
            Phase::Register => {
                super::register::register_and_report(&self.registrar, path, self.formatter)
                    .await
                    .map_err(|e| WatcherError::Dispatch(e.to_string()))?;
            }
        }
        Ok(())
    }
}

/// Execute the watch command.
pub async fn execute_watch(args: WatchArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    config.staging.ensure_dirs()?;

    let dispatcher = PipelineDispatcher {
        pages: super::extract_page::page_extractor(config, config.pages.clone()),
        registrar: super::register::registrar(config, args.dry_run)?,
        formatter,
    };
    let mut watcher = StagingWatcher::new(&config.staging.root, &config.watch)?;

    if args.once {
        watcher.drain_existing(&dispatcher).await?;
    } else {
        println!(
            "{}",
            formatter.info(&format!(
                "Watching {} (Ctrl+C to stop)",
                watcher.root().display()
            ))
        );
        watcher.run(&dispatcher).await?;
    }

    println!("{}", formatter.info(&watcher.stats().summary()));
    Ok(())
}
