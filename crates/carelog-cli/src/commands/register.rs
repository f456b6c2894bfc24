//! Register command implementation.

use crate::cli::RegisterArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use carelog_domain::{RegistrationOutcome, RunStatus};
use carelog_gatekeeper::Gatekeeper;
use carelog_registrar::{Registrar, RegistrarError};
use carelog_sdk::RecordStoreClient;
use std::path::Path;

/// Build a registrar for the configured record store.
pub(crate) fn registrar(config: &Config, dry_run: bool) -> Result<Registrar<RecordStoreClient>> {
    let client = RecordStoreClient::with_timeout(&config.store.base_url, config.store.timeout())?;
    Ok(Registrar::new(
        client,
        config.store.credentials()?,
        Gatekeeper::new(config.validation.clone()),
        config.registrar_config(dry_run),
    ))
}

/// Register one artifact and print its outcome.
///
/// A run that persisted nothing out of a non-empty batch is an error, so the
/// process exits non-zero.
pub(crate) async fn register_and_report(
    registrar: &Registrar<RecordStoreClient>,
    batch: &Path,
    formatter: &Formatter,
) -> Result<RegistrationOutcome> {
    let outcome = match registrar.register_file(batch).await {
        Ok(outcome) => outcome,
        Err(RegistrarError::Archive { outcome, reason }) => {
            println!("{}", formatter.format_outcome(&outcome)?);
            return Err(CliError::Registrar(RegistrarError::Archive { outcome, reason }));
        }
        Err(e) => return Err(e.into()),
    };

    println!("{}", formatter.format_outcome(&outcome)?);
    if outcome.status() == RunStatus::Failed {
        return Err(CliError::RunFailed(outcome.summary()));
    }
    Ok(outcome)
}

/// Execute the register command.
pub async fn execute_register(args: RegisterArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let registrar = registrar(config, args.dry_run)?;
    register_and_report(&registrar, &args.batch, formatter).await?;
    Ok(())
}
