//! Carelog Domain Layer
//!
//! Core types shared by every phase of the care-log import pipeline.
//!
//! ## Key Concepts
//!
//! - **CareLogCandidate**: one proposed daily-care entry for one subject, date and slot
//! - **ImportBatch**: the JSON array artifact handed between pipeline phases
//! - **DateWindow**: the inclusive date range an operator declares for a run
//! - **Provenance**: every record from this pipeline is marked as paper-derived
//! - **RegistrationOutcome**: the in-memory summary of one registrar run
//!
//! ## Architecture
//!
//! This crate holds no pipeline logic. Validation lives in `carelog-gatekeeper`,
//! prompt construction in `carelog-extractor`, persistence in `carelog-registrar`.
//! The traits in [`traits`] are the seams to the external record store and the
//! extraction oracle.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod candidate;
pub mod date_window;
pub mod error;
pub mod outcome;
pub mod provenance;
pub mod score;
pub mod staging;
pub mod time_slot;
pub mod traits;

// Re-exports for convenience
pub use batch::{BatchDeclaration, BatchEntry, ImportBatch};
pub use candidate::{CareLogCandidate, SubjectId};
pub use date_window::DateWindow;
pub use error::DomainError;
pub use outcome::{FailureKind, RecordFailure, RegistrationOutcome, RunStatus};
pub use provenance::OCR_RECORDER_LABEL;
pub use score::Score;
pub use time_slot::TimeSlot;
