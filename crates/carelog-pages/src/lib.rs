//! Carelog Page Extractor
//!
//! Converts the first page of a scanned source document into a PNG image for
//! the extraction oracle.
//!
//! Conversion is delegated to a [`PageRenderer`]; the default is poppler's
//! `pdftoppm`, run as a child process bounded by a timeout and killed if the
//! timeout fires. Partial output is removed on every failure path, and the
//! image appears under its final name only once complete.

#![warn(missing_docs)]

mod config;
mod error;
mod extractor;
mod renderer;

pub use config::PageConfig;
pub use error::PageError;
pub use extractor::{PageExtractor, PageImage};
pub use renderer::{PageRenderer, PdftoppmRenderer};
