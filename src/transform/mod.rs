//! Applying source transforms to model files on disk.

use crate::diff::{DiffSummary, colorized_diff, unified_diff};
use crate::error::{ModelgenError, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// A code transformation that can be applied to source files.
pub trait Transform {
    /// Applies the transformation to the given source code.
    fn apply(&self, source: &str, path: &Path) -> Result<String>;

    /// Returns a description of the transformation.
    fn describe(&self) -> String;
}

/// Represents a change to be applied to a file.
#[derive(Debug, Clone)]
pub struct FileChange {
    pub path: PathBuf,
    pub original: String,
    pub transformed: String,
}

impl FileChange {
    /// Reads `path` and runs `transform` over its contents.
    ///
    /// Nothing is written; on error the file is left as it was.
    pub fn compute(path: impl Into<PathBuf>, transform: &dyn Transform) -> Result<Self> {
        let path = path.into();
        let original = std::fs::read_to_string(&path).map_err(|e| {
            ModelgenError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read {}: {}", path.display(), e),
            ))
        })?;
        let transformed = transform.apply(&original, &path)?;

        Ok(Self {
            path,
            original,
            transformed,
        })
    }

    /// Returns true if the content was modified.
    pub fn is_modified(&self) -> bool {
        self.original != self.transformed
    }

    /// Writes the transformed content to disk.
    pub fn apply(&self) -> Result<()> {
        if self.is_modified() {
            std::fs::write(&self.path, &self.transformed)?;
            info!(path = %self.path.display(), "rewrote model file");
        }
        Ok(())
    }

    pub fn diff(&self) -> String {
        unified_diff(&self.original, &self.transformed, &self.path)
    }

    pub fn colorized_diff(&self) -> String {
        colorized_diff(&self.original, &self.transformed, &self.path)
    }

    pub fn summary(&self) -> DiffSummary {
        DiffSummary::from_diff(&self.original, &self.transformed)
    }
}
