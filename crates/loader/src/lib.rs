//! Chapter cache and loader.
//!
//! A [`Loader`] turns a chapter number into a [`Chapter`]: it resolves the
//! chapter's path, fetches the raw markup from a
//! [`ChapterSource`](quire_source::ChapterSource), sanitizes it against a
//! [`Policy`](quire_sanitize::Policy), extracts a title and caches the result.

mod chapter;
pub mod error;
mod loader;

pub use crate::chapter::{Chapter, ChapterId};
pub use crate::loader::{Loader, LoaderOptions};
