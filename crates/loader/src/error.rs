//! Loader Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Kinds are `Clone` because a single failed load is reported to every caller
//! that was waiting on it.

use derive_more::{Display, Error};
use std::fmt;
use std::sync::Arc;

/// A loader error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for loader operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The chapter number is outside `1..=total`. Nothing was fetched.
    #[display("chapter {id} does not exist (expected 1 to {total})")]
    InvalidIdentifier { id: u32, total: u32 },
    /// The source couldn't deliver the chapter; carries the source's reason.
    #[display("could not fetch chapter: {_0}")]
    Fetch(#[error(not(source))] String),
    /// The chapter was fetched but contained no markup.
    #[display("could not parse chapter: {_0}")]
    Parse(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }
}

/// A failed load, held once and reported to every caller waiting on it.
///
/// The original error tree (locations included) survives as the single child
/// of each reported [`Error`].
#[derive(Clone)]
pub(crate) struct SharedFailure(Arc<Error>);
impl SharedFailure {
    pub(crate) fn new(err: Error) -> Self {
        Self(Arc::new(err))
    }

    pub(crate) fn kind(&self) -> &ErrorKind {
        &self.0
    }

    #[track_caller]
    pub(crate) fn report(&self) -> Error {
        let kind = self.kind().clone();
        exn::Exn::new(self.clone()).raise(kind)
    }
}
impl fmt::Display for SharedFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0.frame())
    }
}
impl fmt::Debug for SharedFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
impl std::error::Error for SharedFailure {}
