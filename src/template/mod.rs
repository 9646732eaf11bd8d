//! Template files containing `{{ path!key[:fallback] }}` placeholders.

mod extract;
mod render;

pub use extract::find_placeholders;
pub use render::{render_secrets, Rendered};

use crate::error::{Error, Result};
use crate::secrets::ResolutionBatch;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

/// A template read from disk. Contents are kept as raw bytes; no encoding
/// is assumed.
#[derive(Debug, Clone)]
pub struct TemplateFile {
    path: PathBuf,
    contents: Vec<u8>,
}

impl TemplateFile {
    /// Read the template at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        match std::fs::read(&path) {
            Ok(contents) => Ok(Self { path, contents }),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(Error::TemplateNotFound { path }),
            Err(source) => Err(Error::TemplateReadFailed { path, source }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    pub fn find_placeholders(&self) -> Vec<String> {
        find_placeholders(&self.contents)
    }

    /// Render `batch` into the template and write the whole result to `output`.
    pub fn render_to(&self, batch: &ResolutionBatch, output: impl AsRef<Path>) -> Result<Rendered> {
        let output = output.as_ref();
        let rendered = render_secrets(&self.contents, batch);

        std::fs::write(output, &rendered.text).map_err(|source| {
            Error::OutputWriteFailed {
                path: output.to_path_buf(),
                source,
            }
        })?;

        info!(
            "Rendered {} into {}",
            self.path.display(),
            output.display()
        );
        Ok(rendered)
    }
}
