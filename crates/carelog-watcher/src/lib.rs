//! Carelog Staging Watcher
//!
//! Turns file-system events in the staging area into pipeline phases.
//!
//! Each watched directory behaves as a single-consumer queue: a file that
//! matches a trigger is dispatched once it has been quiet for the debounce
//! window, and the phase handler acknowledges it by moving it away. Delivery
//! is at-least-once; a file that fails stays in place until it changes again
//! or the watcher restarts.

#![warn(missing_docs)]

mod config;
mod error;
mod triggers;
mod watcher;

pub use config::{TriggerConfig, WatchConfig};
pub use error::WatcherError;
pub use triggers::{Phase, TriggerSet};
pub use watcher::{Dispatcher, StagingWatcher, WatchStats};
