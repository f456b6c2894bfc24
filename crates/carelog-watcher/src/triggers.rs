//! Trigger table: staging-relative glob patterns mapped to pipeline phases

use crate::{TriggerConfig, WatcherError};
use carelog_domain::staging::is_hidden;
use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Pipeline phase a file event starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// Convert page one of a source document into an image
    ExtractPage,

    /// Commit a staged batch to the record store
    Register,
}

impl Phase {
    /// Configuration token for this phase
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::ExtractPage => "extract-page",
            Phase::Register => "register",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Compiled trigger table
#[derive(Debug, Clone)]
pub struct TriggerSet {
    triggers: Vec<(Pattern, Phase)>,
}

impl TriggerSet {
    /// Compile a trigger table
    pub fn compile(config: &[TriggerConfig]) -> Result<Self, WatcherError> {
        let triggers = config
            .iter()
            .map(|t| {
                Pattern::new(&t.pattern)
                    .map(|p| (p, t.phase))
                    .map_err(|e| WatcherError::InvalidPattern {
                        pattern: t.pattern.clone(),
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { triggers })
    }

    /// Phase for `path`, a path under `root`
    ///
    /// Hidden files and paths outside `root` never match.
    pub fn phase_for(&self, root: &Path, path: &Path) -> Option<Phase> {
        if is_hidden(path) {
            return None;
        }
        let relative = path.strip_prefix(root).ok()?;
        self.triggers
            .iter()
            .find(|(pattern, _)| pattern.matches_path_with(relative, MATCH_OPTIONS))
            .map(|(_, phase)| *phase)
    }

    /// Existing files under `root` matching any trigger, sorted by path
    pub fn scan(&self, root: &Path) -> Result<Vec<(PathBuf, Phase)>, WatcherError> {
        let prefix = Pattern::escape(&root.to_string_lossy());
        let mut found = Vec::new();
        for (pattern, _) in &self.triggers {
            let full = format!("{}/{}", prefix, pattern.as_str());
            let paths = glob::glob_with(&full, MATCH_OPTIONS).map_err(|e| WatcherError::InvalidPattern {
                pattern: full.clone(),
                reason: e.to_string(),
            })?;
            for path in paths.flatten() {
                if !path.is_file() || found.iter().any(|(p, _)| p == &path) {
                    continue;
                }
                // First matching trigger decides, same as for live events
                if let Some(phase) = self.phase_for(root, &path) {
                    found.push((path, phase));
                }
            }
        }
        found.sort();
        Ok(found)
    }

    /// Number of triggers
    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }
}
