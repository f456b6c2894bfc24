//! Carelog Gatekeeper
//!
//! Maps raw oracle records onto the care-log wire schema and rejects anything
//! that cannot be committed safely.
//!
//! The Gatekeeper provides:
//! - Mark-to-score and mark-to-boolean mapping
//! - Date window and time slot enforcement
//! - Note aggregation for sub-observations
//! - Provenance stamping and re-checking of staged records
//!
//! # Examples
//!
//! ```
//! use carelog_domain::{DateWindow, SubjectId};
//! use carelog_gatekeeper::{Gatekeeper, ValidationConfig, ValidationContext};
//! use chrono::NaiveDate;
//! use serde_json::json;
//!
//! let day = NaiveDate::from_ymd_opt(2024, 11, 14).unwrap();
//! let context = ValidationContext::new(SubjectId::new(12).unwrap(), DateWindow::single(day));
//! let gatekeeper = Gatekeeper::new(ValidationConfig::default());
//!
//! let raw = json!([{
//!     "log_date": "2024-11-14", "time_slot": "morning",
//!     "appetite_score": "○", "energy_score": "△",
//!     "urinated": "○", "cleaned": "×"
//! }]);
//! let report = gatekeeper.validate_json(&raw, &context).unwrap();
//! assert_eq!(report.valid.len(), 1);
//! ```

#![warn(missing_docs)]

pub mod mapping;
mod validator;
mod error;
mod config;

pub use validator::{
    Gatekeeper, MappingWarning, RejectedRecord, RejectionReason, ValidationContext, ValidationReport,
};
pub use error::GatekeeperError;
pub use config::ValidationConfig;
