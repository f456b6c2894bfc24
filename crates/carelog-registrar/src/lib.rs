//! Carelog Batch Registrar
//!
//! Commits a staged batch artifact to the record store.
//!
//! A run authenticates once, confirms the batch subject exists, then submits
//! every entry in file order. Per-record failures never abort the run; they
//! are collected in a [`RegistrationOutcome`](carelog_domain::RegistrationOutcome)
//! and the artifact is archived afterwards. Transient store failures are
//! retried a bounded number of times with a fixed delay.
//!
//! # Example
//!
//! ```no_run
//! use carelog_domain::traits::Credentials;
//! use carelog_gatekeeper::Gatekeeper;
//! use carelog_registrar::{Registrar, RegistrarConfig};
//! # use carelog_domain::traits::RecordStore;
//!
//! # async fn example<S: RecordStore>(store: S) -> Result<(), Box<dyn std::error::Error>> {
//! let registrar = Registrar::new(
//!     store,
//!     Credentials::new("operator", "secret"),
//!     Gatekeeper::default_config(),
//!     RegistrarConfig::default(),
//! );
//! let outcome = registrar
//!     .register_file("staging/staged-batches/12_2024-11-14_2024-11-20.json".as_ref())
//!     .await?;
//! println!("{}", outcome.summary());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod registrar;

pub use config::RegistrarConfig;
pub use error::RegistrarError;
pub use registrar::Registrar;
