//! Carelog Extractor
//!
//! Turns a scanned care-log page image into a staged batch awaiting human
//! review.
//!
//! # Architecture
//!
//! ```text
//! Image → PromptBuilder → Oracle → Parser → Gatekeeper → staged-batches/
//! ```
//!
//! The extractor never talks to the record store. Its output is a JSON array
//! written atomically into the staging area, which the operator may edit
//! before the registrar picks it up.
//!
//! # Example Usage
//!
//! ```no_run
//! use carelog_domain::{DateWindow, SubjectId};
//! use carelog_extractor::{Extractor, ExtractorConfig, ExtractionRequest};
//! use carelog_gatekeeper::Gatekeeper;
//! use carelog_llm::MockProvider;
//! use chrono::NaiveDate;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let extractor = Extractor::new(
//!     MockProvider::new("[]"),
//!     Gatekeeper::default_config(),
//!     ExtractorConfig::default(),
//! );
//!
//! let day = NaiveDate::from_ymd_opt(2024, 11, 14).unwrap();
//! let request = ExtractionRequest {
//!     image_path: "staging/extracted-images/sheet.png".into(),
//!     subject: SubjectId::new(12).unwrap(),
//!     window: DateWindow::single(day),
//!     output_path: "staging/staged-batches/12_2024-11-14_2024-11-14.json".into(),
//! };
//!
//! let result = extractor.extract(request).await?;
//! println!("Valid: {}", result.report.valid.len());
//! println!("Rejected: {}", result.report.rejected.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod error;
mod config;
mod types;
mod prompt;
mod parser;
mod extractor;

pub use error::ExtractorError;
pub use config::ExtractorConfig;
pub use types::{
    default_batch_name, oracle_output_name, rejected_path, ExtractionMetadata, ExtractionRequest, ExtractionResult,
};
pub use prompt::PromptBuilder;
pub use parser::parse_oracle_response;
pub use extractor::Extractor;
