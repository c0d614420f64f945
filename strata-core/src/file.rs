use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use log::debug;

/// Write `content` to `path`, creating parent directories as needed.
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .wrap_err_with(|| format!("failed to create directory '{}'", parent.display()))?;
    }
    std::fs::write(path, content)
        .wrap_err_with(|| format!("failed to write '{}'", path.display()))?;
    debug!("wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// A file produced by the frontend (emitted IR, statistics, snapshots).
///
/// The file is always overwritten when written.
#[derive(Debug, Clone)]
pub struct OutputFile {
    path: PathBuf,
    content: String,
}

impl OutputFile {
    /// Create a new output file with the given path and content
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the file content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Check if the file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Write the file to disk and return its path
    pub fn write(&self) -> Result<&Path> {
        write_file(&self.path, &self.content)?;
        Ok(&self.path)
    }
}
