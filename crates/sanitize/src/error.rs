//! Sanitization Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Sanitizing itself never fails; the only way to end up here is handing the
//! parser something that isn't a document at all.

use derive_more::{Display, Error};

/// A parsing error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for parsing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input contained no markup at all (empty or only whitespace).
    #[display("empty document")]
    EmptyDocument,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Same bytes in, same tree out. Retrying won't change anything.
        false
    }
}
