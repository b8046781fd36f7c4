//! In-memory chapter source for testing.

use crate::ChapterSource;
use crate::error::{ErrorKind, Result};
use crate::path::validate as validate_path;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{RwLock, watch};

/// In-memory chapter source for testing.
///
/// Files are stored in a `HashMap` behind a [`RwLock`], so all methods can
/// operate on `&self` without external synchronisation. On top of serving
/// files it acts as a test double for the fetch capability:
///
/// - every [`fetch`](ChapterSource::fetch) is counted (see [`fetches`](Self::fetches)),
/// - paths can be made to fail with an HTTP-like status (see [`fail`](Self::fail)),
/// - fetches can be held open until released (see [`hold`](Self::hold)),
///   which makes it possible to test what happens while a fetch is in flight.
///
/// # Examples
///
/// ```
/// use quire_source::{ChapterSource, MockSource};
/// use std::path::Path;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let source = MockSource::with_files([("chapters/chapter-01.html", "<h1>One</h1>")]);
/// assert_eq!(source.fetch(Path::new("chapters/chapter-01.html")).await?, b"<h1>One</h1>");
/// assert_eq!(source.fetches(), 1);
///
/// source.fail("chapters/chapter-01.html", 503).await;
/// assert!(source.fetch(Path::new("chapters/chapter-01.html")).await.is_err());
/// # Ok(())
/// # }
/// ```
pub struct MockSource {
    name: String,
    files: RwLock<HashMap<PathBuf, Vec<u8>>>,
    failures: RwLock<HashMap<PathBuf, u16>>,
    fetches: AtomicUsize,
    gate: watch::Sender<bool>,
}

impl MockSource {
    /// Create a mock source pre-populated with files.
    ///
    /// Panics if any path fails validation (e.g. path traversal). If test
    /// setup is wrong, then test should not pass.
    pub fn with_files(files: impl IntoIterator<Item = (impl Into<PathBuf>, impl Into<Vec<u8>>)>) -> Self {
        let mut map = HashMap::new();
        for (path, data) in files {
            let path = path.into();
            map.insert(Self::validated(&path), data.into());
        }
        Self {
            name: "mock".to_string(),
            files: RwLock::new(map),
            failures: RwLock::new(HashMap::new()),
            fetches: AtomicUsize::new(0),
            gate: watch::Sender::new(true),
        }
    }

    /// Change the name of the mock source.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Add (or replace) a file.
    pub async fn insert(&self, path: impl AsRef<Path>, data: impl Into<Vec<u8>>) {
        let path = Self::validated(path.as_ref());
        self.files.write().await.insert(path, data.into());
    }

    /// Make every fetch of `path` fail with the given status until
    /// [`recover`](Self::recover) is called.
    pub async fn fail(&self, path: impl AsRef<Path>, status: u16) {
        let path = Self::validated(path.as_ref());
        self.failures.write().await.insert(path, status);
    }

    /// Stop failing fetches of `path`.
    pub async fn recover(&self, path: impl AsRef<Path>) {
        let path = Self::validated(path.as_ref());
        self.failures.write().await.remove(&path);
    }

    /// Hold every fetch (current and future) open until [`release`](Self::release).
    pub fn hold(&self) {
        self.gate.send_replace(false);
    }

    /// Let held fetches complete.
    pub fn release(&self) {
        self.gate.send_replace(true);
    }

    /// Number of fetches started so far, successful or not.
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn validated(path: &Path) -> PathBuf {
        match validate_path(path) {
            Ok(path) => path,
            Err(_) => panic!("MockSource: invalid path {}", path.display()),
        }
    }
}
impl Default for MockSource {
    fn default() -> Self {
        let files: [(&str, &str); 0] = [];
        Self::with_files(files)
    }
}

#[async_trait]
impl ChapterSource for MockSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, path: &Path) -> Result<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let path = validate_path(path)?;
        let mut gate = self.gate.subscribe();
        // The sender lives as long as `self`, so this can't observe a closed channel.
        _ = gate.wait_for(|open| *open).await;
        if let Some(status) = self.failures.read().await.get(&path).copied() {
            exn::bail!(ErrorKind::Status(status));
        }
        self.files.read().await.get(&path).cloned().ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fetch_and_count() {
        let source = MockSource::with_files([("a.html", "one")]);
        assert_eq!(source.fetch(Path::new("a.html")).await.unwrap(), b"one");
        assert_eq!(source.fetch(Path::new("./a.html")).await.unwrap(), b"one");
        assert_eq!(source.fetches(), 2);
    }

    #[tokio::test]
    async fn test_not_found_is_counted() {
        let source = MockSource::default();
        let err = source.fetch(Path::new("missing.html")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
        assert_eq!(source.fetches(), 1);
    }

    #[tokio::test]
    async fn test_fail_and_recover() {
        let source = MockSource::with_files([("a.html", "one")]);
        source.fail("a.html", 500).await;
        let err = source.fetch(Path::new("a.html")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Status(500)));
        source.recover("a.html").await;
        assert!(source.fetch(Path::new("a.html")).await.is_ok());
    }

    #[tokio::test]
    async fn test_insert() {
        let source = MockSource::default();
        assert!(source.fetch(Path::new("b.html")).await.is_err());
        source.insert("b.html", "two").await;
        assert_eq!(source.fetch(Path::new("b.html")).await.unwrap(), b"two");
    }

    #[tokio::test(start_paused = true)]
    async fn test_hold_and_release() {
        let source = Arc::new(MockSource::with_files([("a.html", "one")]));
        source.hold();
        let task = tokio::spawn({
            let source = source.clone();
            async move { source.fetch(Path::new("a.html")).await.unwrap() }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!task.is_finished());
        source.release();
        assert_eq!(task.await.unwrap(), b"one");
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let source = MockSource::default();
        assert!(source.fetch(Path::new("../etc/passwd")).await.is_err());
    }

    #[test]
    #[should_panic(expected = "invalid path")]
    fn test_with_files_panics_on_bad_path() {
        MockSource::with_files([("../escape", "bad")]);
    }
}
