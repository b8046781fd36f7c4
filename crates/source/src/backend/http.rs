//! HTTP chapter source.
//!
//! Chapters are fetched relative to a base URL. Any non-success status is an
//! error; there are no retries, redirects are followed by `reqwest` as usual.

use crate::error::{ErrorKind, Result};
use crate::{ChapterSource, path::validate as validate_path};
use async_trait::async_trait;
use exn::ResultExt;
use reqwest::{Client, StatusCode, Url};
use std::path::Path;
use std::time::Duration;

/// HTTP(S) chapter source anchored to a base URL.
///
/// # Examples
///
/// ```no_run
/// use quire_source::HttpSource;
///
/// # fn example() -> quire_source::error::Result<()> {
/// // Chapter paths are resolved against the base, so
/// // `chapters/chapter-01.html` becomes `https://example.com/book/chapters/chapter-01.html`
/// let source = HttpSource::new("web", "https://example.com/book")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpSource {
    name: String,
    base: Url,
    client: Client,
}
impl HttpSource {
    pub fn new(name: impl Into<String>, base: &str) -> Result<Self> {
        // Without a trailing slash, `Url::join` would replace the last segment
        // of the base instead of appending to it.
        let base = match base.ends_with('/') {
            true => base.to_string(),
            false => format!("{base}/"),
        };
        let base = Url::parse(&base).or_raise(|| ErrorKind::SourceError(format!("invalid base URL: {base}")))?;
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()
            .or_raise(|| ErrorKind::SourceError("could not build HTTP client".to_string()))?;
        Ok(Self { name: name.into(), base, client })
    }

    fn url(&self, path: &Path) -> Result<Url> {
        let validated = validate_path(path)?;
        let relative = validated
            .iter()
            .map(|segment| segment.to_str().ok_or_else(|| exn::Exn::from(ErrorKind::InvalidPath(path.to_path_buf()))))
            .collect::<Result<Vec<_>>>()?
            .join("/");
        self.base.join(&relative).or_raise(|| ErrorKind::InvalidPath(path.to_path_buf()))
    }

    fn check_status(status: StatusCode, path: &Path) -> Result<()> {
        match status {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                exn::bail!(ErrorKind::PermissionDenied(path.to_path_buf()))
            },
            s => exn::bail!(ErrorKind::Status(s.as_u16())),
        }
    }
}

#[async_trait]
impl ChapterSource for HttpSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, path: &Path) -> Result<Vec<u8>> {
        let url = self.url(path)?;
        tracing::debug!(source = %self.name, %url, "Fetching chapter");
        let response = self.client.get(url).send().await.map_err(|e| ErrorKind::Network(e.to_string()))?;
        Self::check_status(response.status(), path)?;
        let body = response.bytes().await.map_err(|e| ErrorKind::Network(e.to_string()))?;
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://example.com", "chapters/chapter-01.html", "https://example.com/chapters/chapter-01.html")]
    #[case("https://example.com/book", "chapters/chapter-01.html", "https://example.com/book/chapters/chapter-01.html")]
    #[case("https://example.com/book/", "./a/../chapter.html", "https://example.com/book/chapter.html")]
    fn test_url(#[case] base: &str, #[case] path: &str, #[case] expected: &str) {
        let source = HttpSource::new("web", base).unwrap();
        assert_eq!(source.url(Path::new(path)).unwrap().as_str(), expected);
    }

    #[test]
    fn test_url_cannot_escape() {
        let source = HttpSource::new("web", "https://example.com/book").unwrap();
        assert!(source.url(Path::new("../admin")).is_err());
    }

    #[rstest]
    #[case(StatusCode::OK, None)]
    #[case(StatusCode::NOT_FOUND, Some("file not found: a.html"))]
    #[case(StatusCode::FORBIDDEN, Some("permission denied: a.html"))]
    #[case(StatusCode::BAD_GATEWAY, Some("unexpected status: 502"))]
    fn test_check_status(#[case] status: StatusCode, #[case] expected: Option<&str>) {
        let result = HttpSource::check_status(status, Path::new("a.html"));
        assert_eq!(result.err().map(|e| e.to_string()), expected.map(str::to_string));
    }
}
