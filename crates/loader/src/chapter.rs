use derive_more::Display;
use time::UtcDateTime;

/// A chapter number that has been checked against the configured range.
///
/// Only the [`Loader`](crate::Loader) hands these out, so holding one means
/// the chapter exists.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChapterId(u32);
impl ChapterId {
    pub(crate) fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

/// A loaded chapter.
///
/// `content` is sanitized markup, safe to insert into a page as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub id: ChapterId,
    pub title: String,
    pub content: String,
    pub loaded_at: UtcDateTime,
}
