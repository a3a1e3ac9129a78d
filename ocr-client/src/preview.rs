//! Scoped preview of the current selection
//!
//! A file on disk is previewed in place. In-memory content is spilled to a
//! temporary file that lives exactly as long as the handle.

use crate::error::Result;
use crate::types::{FileContent, SelectedFile};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// A viewable path for one selection; released on drop
#[derive(Debug)]
pub struct PreviewHandle {
    path: PathBuf,
    spilled: Option<NamedTempFile>,
}

impl PreviewHandle {
    pub fn acquire(file: &SelectedFile) -> Result<Self> {
        match file.content() {
            FileContent::Path(path) => Ok(Self {
                path: path.clone(),
                spilled: None,
            }),
            FileContent::Memory(bytes) => {
                let suffix = match file.extension() {
                    "" => String::new(),
                    ext => format!(".{ext}"),
                };
                let mut temp = tempfile::Builder::new()
                    .prefix("ocr-preview-")
                    .suffix(&suffix)
                    .tempfile()?;
                temp.write_all(bytes)?;
                temp.flush()?;

                debug!(path = %temp.path().display(), "preview spilled to temporary file");
                Ok(Self {
                    path: temp.path().to_path_buf(),
                    spilled: Some(temp),
                })
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the path points at a temporary copy
    pub fn is_temporary(&self) -> bool {
        self.spilled.is_some()
    }

    /// Release now; same as dropping the handle
    pub fn release(mut self) {
        self.cleanup();
    }

    fn cleanup(&mut self) {
        if let Some(temp) = self.spilled.take() {
            if let Err(e) = temp.close() {
                warn!(path = %self.path.display(), error = %e, "failed to remove preview file");
            }
        }
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.cleanup();
    }
}
