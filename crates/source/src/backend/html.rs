//! HTML-filtered chapter source decorator.
//!
//! Wraps another source and restricts fetches to files with an
//! `.html`/`.htm` extension, so a misconfigured path template can't be used
//! to pull arbitrary files through the sanitizer.

use crate::error::{ErrorKind, Result};
use crate::{ChapterSource, SourceHandle};
use async_trait::async_trait;
use std::path::Path;

const HTML_EXTENSIONS: &[&str] = &["html", "htm"];

/// Check if a path has an HTML extension.
///
/// - `chapter-01.html` -> true
/// - `chapter-01.HTM` -> true
/// - `chapter-01.txt` -> false
/// - `chapter-01` -> false
fn is_html_path(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| HTML_EXTENSIONS.iter().any(|allowed| ext.eq_ignore_ascii_case(allowed)))
}

/// HTML-filtered chapter source.
///
/// Non-HTML paths return [`ErrorKind::FilteredPath`] without ever reaching
/// the wrapped source.
#[derive(Clone)]
pub struct HtmlOnlySource {
    inner: SourceHandle,
}
impl HtmlOnlySource {
    pub fn new(inner: SourceHandle) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ChapterSource for HtmlOnlySource {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch(&self, path: &Path) -> Result<Vec<u8>> {
        if !is_html_path(path) {
            exn::bail!(ErrorKind::FilteredPath(path.to_path_buf()));
        }
        self.inner.fetch(path).await
    }
}
