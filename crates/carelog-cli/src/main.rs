//! Carelog CLI - import handwritten care-log sheets into the record store.

use carelog_cli::commands;
use carelog_cli::{Cli, Command, Config, Formatter};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> carelog_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing (log to stderr so stdout stays machine-readable)
    let filter = match &cli.log {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let config = Config::load(cli.config.as_deref())?;

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::ExtractPage(args) => commands::execute_extract_page(args, &config, &formatter).await,
        Command::Prompt(args) => commands::execute_prompt(args, &config),
        Command::Extract(args) => commands::execute_extract(args, &config, &formatter).await,
        Command::Validate(args) => commands::execute_validate(args, &config, &formatter),
        Command::Register(args) => commands::execute_register(args, &config, &formatter).await,
        Command::Watch(args) => commands::execute_watch(args, &config, &formatter).await,
        Command::Config(args) => commands::execute_config(args, &config, cli.config.clone(), &formatter),
    }
}
