//! Page renderers

use crate::PageError;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Renders the first page of a document to a PNG file
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Write page one of `source` to `target` (a `.png` path)
    ///
    /// The caller bounds the call with a timeout and removes `target` on
    /// failure, so implementations need not clean up after themselves.
    async fn render_first_page(&self, source: &Path, target: &Path) -> Result<(), PageError>;

    /// Renderer name, for logs
    fn name(&self) -> &str;
}

/// Renders through poppler's `pdftoppm`
#[derive(Debug, Clone)]
pub struct PdftoppmRenderer {
    binary: String,
    dpi: u32,
}

impl PdftoppmRenderer {
    /// Create a renderer using `binary` at `dpi`
    pub fn new(binary: impl Into<String>, dpi: u32) -> Self {
        Self {
            binary: binary.into(),
            dpi,
        }
    }
}

#[async_trait]
impl PageRenderer for PdftoppmRenderer {
    async fn render_first_page(&self, source: &Path, target: &Path) -> Result<(), PageError> {
        // pdftoppm appends the extension itself
        let prefix = target.with_extension("");

        debug!(
            "Running {} -png -r {} -f 1 -l 1 -singlefile {} {}",
            self.binary,
            self.dpi,
            source.display(),
            prefix.display()
        );

        let output = Command::new(&self.binary)
            .arg("-png")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-f")
            .arg("1")
            .arg("-l")
            .arg("1")
            .arg("-singlefile")
            .arg(source)
            .arg(&prefix)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => PageError::RendererNotFound(self.binary.clone()),
                _ => PageError::Io(e),
            })?;

        if !output.status.success() {
            return Err(PageError::ConversionFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.binary
    }
}
