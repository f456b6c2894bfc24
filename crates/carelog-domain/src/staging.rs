//! Staging-area file helpers
//!
//! Staging directories are the only state shared between phases. Ownership of
//! an artifact moves with a rename, so a file is never visible in two areas at
//! once, and new artifacts appear under their final name only when complete.

use crate::DomainError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Whether a path names a hidden file (leading dot)
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

/// Write `contents` to `path` through a hidden temporary sibling and a rename
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), DomainError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| DomainError::InvalidBatch(format!("invalid target path {}", path.display())))?;
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;

    let temp = dir.join(format!(".{}.tmp", file_name));
    if let Err(e) = fs::write(&temp, contents) {
        let _ = fs::remove_file(&temp);
        return Err(e.into());
    }
    if let Err(e) = fs::rename(&temp, path) {
        let _ = fs::remove_file(&temp);
        return Err(e.into());
    }
    Ok(())
}

/// Move `path` into `dest_dir`, keeping its file name
///
/// If the destination name is taken, a timestamp suffix is added so an earlier
/// archive is never overwritten. Returns the final location.
pub fn relocate(path: &Path, dest_dir: &Path) -> Result<PathBuf, DomainError> {
    fs::create_dir_all(dest_dir)?;

    let file_name = path
        .file_name()
        .ok_or_else(|| DomainError::InvalidBatch(format!("invalid artifact path {}", path.display())))?;
    let mut target = dest_dir.join(file_name);

    if target.exists() {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("artifact");
        let stamp = chrono::Local::now().format("%Y%m%d%H%M%S");
        let renamed = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{}-{}.{}", stem, stamp, ext),
            None => format!("{}-{}", stem, stamp),
        };
        warn!(
            "{} already exists, archiving as {}",
            target.display(),
            renamed
        );
        target = dest_dir.join(renamed);
    }

    fs::rename(path, &target)?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomic_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("batch.json");
        write_atomic(&target, b"[]").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "[]");
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn test_relocate_keeps_name() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("batch.json");
        fs::write(&source, "[]").unwrap();

        let processed = dir.path().join("processed");
        let moved = relocate(&source, &processed).unwrap();

        assert_eq!(moved, processed.join("batch.json"));
        assert!(!source.exists());
        assert!(moved.exists());
    }

    #[test]
    fn test_relocate_never_overwrites_archive() {
        let dir = tempfile::tempdir().unwrap();
        let processed = dir.path().join("processed");
        fs::create_dir_all(&processed).unwrap();
        fs::write(processed.join("batch.json"), "old").unwrap();

        let source = dir.path().join("batch.json");
        fs::write(&source, "new").unwrap();
        let moved = relocate(&source, &processed).unwrap();

        assert_ne!(moved, processed.join("batch.json"));
        assert_eq!(fs::read_to_string(processed.join("batch.json")).unwrap(), "old");
        assert_eq!(fs::read_to_string(&moved).unwrap(), "new");
        assert_eq!(moved.extension().unwrap(), "json");
    }

    #[test]
    fn test_is_hidden() {
        assert!(is_hidden(Path::new("/tmp/.batch.json.tmp")));
        assert!(!is_hidden(Path::new("/tmp/batch.json")));
    }
}
