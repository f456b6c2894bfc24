//! Page extractor

use crate::{PageConfig, PageError, PageRenderer};
use carelog_domain::staging::relocate;
use std::path::{Path, PathBuf};
use tokio::time::timeout;
use tracing::{error, info, warn};

/// Output of one page extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    /// Rendered first page
    pub image_path: PathBuf,

    /// Where the source was archived, if it was
    pub archived_source: Option<PathBuf>,
}

/// Converts the first page of a source document into a raster image
pub struct PageExtractor<R: PageRenderer> {
    renderer: R,
    config: PageConfig,
    output_dir: PathBuf,
    processed_dir: PathBuf,
}

impl<R: PageRenderer> PageExtractor<R> {
    /// Create an extractor writing images to `output_dir` and archiving
    /// sources to `processed_dir`
    pub fn new(
        renderer: R,
        config: PageConfig,
        output_dir: impl Into<PathBuf>,
        processed_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            renderer,
            config,
            output_dir: output_dir.into(),
            processed_dir: processed_dir.into(),
        }
    }

    /// Directory images are written to
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Render page one of `source` to `<output_dir>/<stem>.png`
    pub async fn extract(&self, source: &Path) -> Result<PageImage, PageError> {
        let stem = self.check_source(source)?;

        std::fs::create_dir_all(&self.output_dir)?;
        let partial = self.output_dir.join(format!(".{}.partial.png", stem));
        let target = self.output_dir.join(format!("{}.png", stem));

        info!(
            "Converting page 1 of {} with {} at {} dpi",
            source.display(),
            self.renderer.name(),
            self.config.dpi
        );

        let rendered = match timeout(
            self.config.timeout(),
            self.renderer.render_first_page(source, &partial),
        )
        .await
        {
            Ok(Ok(())) if partial.exists() => Ok(()),
            Ok(Ok(())) => Err(PageError::NoOutput(partial.clone())),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(PageError::Timeout(self.config.timeout())),
        };

        if let Err(e) = rendered {
            remove_partial(&partial);
            error!("Conversion of {} failed: {}", source.display(), e);
            return Err(e);
        }

        if target.exists() {
            warn!("Replacing existing image {}", target.display());
        }
        if let Err(e) = std::fs::rename(&partial, &target) {
            remove_partial(&partial);
            return Err(e.into());
        }
        info!("Wrote {}", target.display());

        let archived_source = if self.config.archive_sources {
            match relocate(source, &self.processed_dir) {
                Ok(path) => {
                    info!("Archived source to {}", path.display());
                    Some(path)
                }
                Err(e) => {
                    warn!("Image written but source {} not archived: {}", source.display(), e);
                    None
                }
            }
        } else {
            None
        };

        Ok(PageImage {
            image_path: target,
            archived_source,
        })
    }

    /// Existence, readability and extension checks; returns the file stem
    fn check_source(&self, source: &Path) -> Result<String, PageError> {
        if !source.exists() {
            return Err(PageError::SourceMissing(source.to_path_buf()));
        }
        std::fs::File::open(source).map_err(|e| PageError::Unreadable {
            path: source.to_path_buf(),
            source: e,
        })?;

        let accepted = source
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| self.config.accepts(e))
            .unwrap_or(false);
        if !accepted {
            return Err(PageError::UnsupportedExtension {
                path: source.to_path_buf(),
                expected: self.config.accepted_extensions.join(", "),
            });
        }

        source
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .ok_or_else(|| PageError::SourceMissing(source.to_path_buf()))
    }
}

fn remove_partial(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Could not remove partial output {}: {}", path.display(), e);
        }
    }
}
