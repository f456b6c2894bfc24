//! Carelog Rust SDK
//!
//! HTTP client for the care-log record store, implementing the
//! `RecordStore` trait from `carelog-domain`.
//!
//! # Example
//!
//! ```no_run
//! use carelog_domain::traits::{Credentials, RecordStore};
//! use carelog_sdk::RecordStoreClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = RecordStoreClient::new("http://localhost:8000")?;
//! let token = client.authenticate(&Credentials::new("operator", "secret")).await?;
//! let subjects = client.list_subjects(&token).await?;
//! println!("{} subjects", subjects.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod client;
mod error;
mod session;

pub use client::{RecordStoreClient, DEFAULT_TIMEOUT_SECS};
pub use error::SdkError;
pub use session::{obtain_token, TokenResponse};
