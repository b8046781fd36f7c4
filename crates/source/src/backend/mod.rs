//! Chapter source trait and implementations.
//!
//! This module defines the [`ChapterSource`] trait, the one capability the
//! loader needs from the outside world: turning a path into raw bytes.

mod html;
#[cfg(feature = "http")]
mod http;
mod local;
#[cfg(feature = "mock")]
mod mock;

pub use self::html::HtmlOnlySource;
#[cfg(feature = "http")]
pub use self::http::HttpSource;
pub use self::local::LocalSource;
#[cfg(feature = "mock")]
pub use self::mock::MockSource;
use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Where raw chapter markup comes from.
///
/// Sources are asynchronous because fetching is the only place the loader
/// suspends; everything after the bytes arrive is synchronous CPU work.
/// Sources do not retry: a failed fetch is reported as-is and the caller
/// decides what to do about it.
///
/// Paths are relative to the source, and implementations run them through
/// [`validate_path`](crate::validate_path) before touching anything.
///
/// ```
/// use quire_source::error::{ErrorKind, Result};
/// use quire_source::{ChapterPaths, ChapterSource};
///
/// async fn chapter_if_present(source: &dyn ChapterSource, number: u32) -> Result<Option<Vec<u8>>> {
///     let path = ChapterPaths::default().resolve(number)?;
///     match source.fetch(&path).await {
///         Ok(bytes) => Ok(Some(bytes)),
///         Err(err) if matches!(&*err, ErrorKind::NotFound(_)) => Ok(None),
///         Err(err) => Err(err),
///     }
/// }
/// ```
#[async_trait]
pub trait ChapterSource: Send + Sync {
    /// Identifies the source in log output.
    fn name(&self) -> &str;

    /// Raw bytes of the chapter at `path`.
    ///
    /// A missing chapter is [`NotFound`](crate::error::ErrorKind::NotFound);
    /// anything else that stops the bytes arriving gets its own kind.
    async fn fetch(&self, path: &Path) -> Result<Vec<u8>>;
}
