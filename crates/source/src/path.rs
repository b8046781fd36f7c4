//! Chapter path resolution and validation.
//!
//! Every path handed to a [`ChapterSource`](crate::ChapterSource) is relative
//! to the source's root and must never be able to leave it.

use crate::error::{ErrorKind, Result};
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

/// Normalizes a path relative to a source root, refusing anything that could
/// resolve outside of it.
///
/// `.` segments and leading or repeated separators are dropped, and `..` pops
/// the previous segment. A `..` with nothing left to pop, a Windows prefix, a
/// NUL byte, or a path that normalizes to nothing at all is an
/// [`InvalidPath`](crate::error::ErrorKind::InvalidPath).
///
/// ```
/// use std::path::Path;
/// use quire_source::validate_path;
///
/// assert_eq!(validate_path("/chapters/./draft/../chapter-01.html").unwrap(), Path::new("chapters/chapter-01.html"));
/// assert!(validate_path("chapters/../../secret").is_err());
/// assert!(validate_path("chapter\0.html").is_err());
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let original = path.as_ref();
    let invalid = || exn::Exn::from(ErrorKind::InvalidPath(original.to_path_buf()));
    let mut segments: Vec<&OsStr> = Vec::new();
    for component in original.components() {
        match component {
            Component::CurDir | Component::RootDir => continue,
            Component::Prefix(_) => return Err(invalid()),
            Component::ParentDir => {
                segments.pop().ok_or_else(invalid)?;
            },
            // NUL survives `components()` but truncates the path at the syscall.
            Component::Normal(segment) if segment.as_encoded_bytes().contains(&0) => return Err(invalid()),
            Component::Normal(segment) => segments.push(segment),
        }
    }
    if segments.is_empty() {
        return Err(invalid());
    }
    Ok(segments.into_iter().collect())
}

/// Maps chapter numbers onto file paths inside a source.
///
/// The path is `{directory}/{prefix}{number}{extension}` with the number
/// zero-padded to `width` digits.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use quire_source::ChapterPaths;
///
/// let paths = ChapterPaths::default();
/// assert_eq!(paths.resolve(7).unwrap(), Path::new("chapters/chapter-07.html"));
/// assert_eq!(paths.resolve(123).unwrap(), Path::new("chapters/chapter-123.html"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterPaths {
    directory: PathBuf,
    prefix: String,
    extension: String,
    width: usize,
}
impl ChapterPaths {
    pub fn new(directory: impl Into<PathBuf>, prefix: impl Into<String>, extension: impl Into<String>, width: usize) -> Self {
        Self {
            directory: directory.into(),
            prefix: prefix.into(),
            extension: extension.into(),
            width,
        }
    }

    /// Resolves the (validated) path of chapter `number`.
    pub fn resolve(&self, number: u32) -> Result<PathBuf> {
        let file = format!("{}{:0width$}{}", self.prefix, number, self.extension, width = self.width);
        validate(self.directory.join(file))
    }
}
impl Default for ChapterPaths {
    fn default() -> Self {
        Self::new("chapters", "chapter-", ".html", 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("chapters/chapter-01.html", "chapters/chapter-01.html")]
    #[case("/chapters//chapter-01.html", "chapters/chapter-01.html")]
    #[case("./chapters/./chapter-01.html", "chapters/chapter-01.html")]
    #[case("chapters/drafts/../chapter-01.html", "chapters/chapter-01.html")]
    #[case("chapters///", "chapters")]
    fn test_validate(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(validate(input).unwrap(), Path::new(expected));
    }

    #[rstest]
    #[case("")]
    #[case("/")]
    #[case("./.")]
    #[case("..")]
    #[case("../chapters/chapter-01.html")]
    #[case("chapters/../../chapter-01.html")]
    #[case("chapters/chapter\0-01.html")]
    fn test_validate_rejects(#[case] input: &str) {
        let err = validate(input).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(path) if path == Path::new(input)));
    }

    #[rstest]
    #[case(ChapterPaths::default(), 1, "chapters/chapter-01.html")]
    #[case(ChapterPaths::default(), 21, "chapters/chapter-21.html")]
    #[case(ChapterPaths::new("", "ch", ".htm", 3), 5, "ch005.htm")]
    #[case(ChapterPaths::new("book/parts", "", ".html", 1), 12, "book/parts/12.html")]
    fn test_resolve(#[case] paths: ChapterPaths, #[case] number: u32, #[case] expected: &str) {
        assert_eq!(paths.resolve(number).unwrap(), Path::new(expected));
    }

    #[test]
    fn test_resolve_cannot_escape() {
        let paths = ChapterPaths::new("..", "", ".html", 2);
        assert!(paths.resolve(1).is_err());
        let paths = ChapterPaths::new("chapters", "../../", ".html", 2);
        assert!(paths.resolve(1).is_err());
    }
}
