//! Debounced staging-directory watcher

use crate::{Phase, TriggerSet, WatchConfig, WatcherError};
use async_trait::async_trait;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, warn};

/// Runs a pipeline phase for one file
///
/// Implementations own the file for the duration of the call and are expected
/// to move it out of the watched location on completion.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Run `phase` for `path`
    async fn dispatch(&self, phase: Phase, path: &Path) -> Result<(), WatcherError>;
}

/// Counters for one watcher session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchStats {
    /// Files handed to the dispatcher
    pub dispatched: usize,

    /// Dispatches that returned an error
    pub failed: usize,

    /// Files that vanished before their quiet period ended
    pub skipped: usize,
}

impl WatchStats {
    /// One-line summary
    pub fn summary(&self) -> String {
        format!(
            "{} dispatched, {} failed, {} skipped",
            self.dispatched, self.failed, self.skipped
        )
    }
}

/// Watches the staging root and dispatches matching files one at a time
///
/// # Examples
///
/// ```no_run
/// use carelog_watcher::{Dispatcher, Phase, StagingWatcher, WatchConfig, WatcherError};
/// use std::path::Path;
///
/// struct Print;
///
/// #[async_trait::async_trait]
/// impl Dispatcher for Print {
///     async fn dispatch(&self, phase: Phase, path: &Path) -> Result<(), WatcherError> {
///         println!("{} {}", phase, path.display());
///         Ok(())
///     }
/// }
///
/// # async fn example() -> Result<(), WatcherError> {
/// let mut watcher = StagingWatcher::new("/srv/staging", &WatchConfig::default())?;
/// watcher.run(&Print).await?;
/// # Ok(())
/// # }
/// ```
pub struct StagingWatcher {
    root: PathBuf,
    triggers: TriggerSet,
    debounce: Duration,
    stats: WatchStats,
}

impl StagingWatcher {
    /// Create a watcher over `root`
    pub fn new(root: impl AsRef<Path>, config: &WatchConfig) -> Result<Self, WatcherError> {
        config.validate().map_err(WatcherError::Config)?;
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(WatcherError::RootMissing(root.to_path_buf()));
        }
        // Event paths come back canonical on some platforms
        let root = root.canonicalize()?;
        Ok(Self {
            root,
            triggers: TriggerSet::compile(&config.triggers)?,
            debounce: config.debounce(),
            stats: WatchStats::default(),
        })
    }

    /// Canonical staging root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Counters so far
    pub fn stats(&self) -> &WatchStats {
        &self.stats
    }

    /// Watch until Ctrl+C
    pub async fn run<D: Dispatcher>(&mut self, dispatcher: &D) -> Result<(), WatcherError> {
        self.run_until(dispatcher, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Cannot listen for Ctrl+C: {}", e);
            }
        })
        .await
    }

    /// Watch until `shutdown` resolves
    ///
    /// Files already present are enqueued once at start. Each changed path is
    /// dispatched after it has been quiet for the debounce window, so repeated
    /// saves produce one dispatch.
    pub async fn run_until<D, F>(&mut self, dispatcher: &D, shutdown: F) -> Result<(), WatcherError>
    where
        D: Dispatcher,
        F: Future<Output = ()>,
    {
        let (tx, mut rx) = mpsc::channel(256);
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            if let Err(e) = tx.blocking_send(res) {
                debug!("Watcher channel closed: {}", e);
            }
        })?;
        watcher.watch(&self.root, RecursiveMode::Recursive)?;
        info!(
            "Watching {} ({} triggers, debounce {:?})",
            self.root.display(),
            self.triggers.len(),
            self.debounce
        );

        let mut pending: HashMap<PathBuf, Instant> = HashMap::new();
        for (path, phase) in self.triggers.scan(&self.root)? {
            info!("Found existing {} file {}", phase, path.display());
            pending.insert(path, Instant::now());
        }

        tokio::pin!(shutdown);
        loop {
            let next_due = pending.values().min().map(|t| *t + self.debounce);
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown signal received, stopping watcher");
                    break;
                }
                event = rx.recv() => match event {
                    Some(Ok(event)) => self.note_event(event, &mut pending),
                    Some(Err(e)) => warn!("Watch error: {}", e),
                    None => break,
                },
                _ = wait_until(next_due) => {
                    self.dispatch_due(dispatcher, &mut pending).await;
                }
            }
        }

        info!("Watcher stopped: {}", self.stats.summary());
        Ok(())
    }

    /// Dispatch every file already present once, without watching
    pub async fn drain_existing<D: Dispatcher>(&mut self, dispatcher: &D) -> Result<(), WatcherError> {
        for (path, phase) in self.triggers.scan(&self.root)? {
            self.dispatch_one(dispatcher, phase, &path).await;
        }
        Ok(())
    }

    fn note_event(&self, event: Event, pending: &mut HashMap<PathBuf, Instant>) {
        match event.kind {
            EventKind::Create(_) | EventKind::Modify(_) => {
                for path in event.paths {
                    if self.triggers.phase_for(&self.root, &path).is_some() {
                        // Restart the quiet period
                        pending.insert(path, Instant::now());
                    }
                }
            }
            EventKind::Remove(_) => {
                for path in &event.paths {
                    pending.remove(path);
                }
            }
            _ => {}
        }
    }

    async fn dispatch_due<D: Dispatcher>(&mut self, dispatcher: &D, pending: &mut HashMap<PathBuf, Instant>) {
        let now = Instant::now();
        let mut due: Vec<PathBuf> = pending
            .iter()
            .filter(|(_, changed)| **changed + self.debounce <= now)
            .map(|(path, _)| path.clone())
            .collect();
        due.sort();

        for path in due {
            pending.remove(&path);
            match self.triggers.phase_for(&self.root, &path) {
                Some(phase) => self.dispatch_one(dispatcher, phase, &path).await,
                None => continue,
            }
        }
    }

    async fn dispatch_one<D: Dispatcher>(&mut self, dispatcher: &D, phase: Phase, path: &Path) {
        if !path.is_file() {
            debug!("Skipping {}: no longer present", path.display());
            self.stats.skipped += 1;
            return;
        }

        info!("Dispatching {} for {}", phase, path.display());
        self.stats.dispatched += 1;
        if let Err(e) = dispatcher.dispatch(phase, path).await {
            self.stats.failed += 1;
            error!("{} failed for {}: {}", phase, path.display(), e);
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
