//! Local filesystem chapter source.
//!
//! Chapters are read from a configured directory using `tokio::fs`.

use crate::error::{ErrorKind, Result};
use crate::{ChapterSource, path::validate as validate_path};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Local filesystem chapter source.
///
/// All paths are relative to the configured root directory.
///
/// # Examples
///
/// ```no_run
/// use quire_source::LocalSource;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let source = LocalSource::new("local", "/srv/book")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LocalSource {
    name: String,
    /// Root directory chapter paths are resolved against
    root: PathBuf,
}
impl LocalSource {
    /// Create a new local filesystem source.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute, or doesn't point at an
    /// existing directory.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        if !root.is_dir() {
            exn::bail!(ErrorKind::NotFound(root));
        }
        Ok(Self { name: name.into(), root })
    }

    /// Validates the path and joins it with the root directory.
    fn absolute_path(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let validated = validate_path(path.as_ref())?;
        Ok(self.root.join(validated))
    }

    fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            _ => ErrorKind::Io(e),
        }
    }
}

#[async_trait]
impl ChapterSource for LocalSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, path: &Path) -> Result<Vec<u8>> {
        let absolute = self.absolute_path(path)?;
        let data = fs::read(&absolute).await.map_err(|e| Self::map_io_error(e, path))?;
        tracing::trace!(source = %self.name, path = %path.display(), size = data.len(), "Read chapter from disk");
        Ok(data)
    }
}
