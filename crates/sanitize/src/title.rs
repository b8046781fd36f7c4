use crate::Document;
use crate::consts::{PRIMARY_HEADING, SECONDARY_HEADING};

/// Finds the canonical title of a (sanitized) document.
///
/// The first `<h1>` in document order wins, then the first `<h2>`. The title
/// is the trimmed text content of that heading. If neither heading exists
/// `fallback` is returned instead.
///
/// Always call this on the output of [`sanitize`](crate::sanitize): a heading
/// that only exists inside markup the policy removes must not become the
/// title.
///
/// # Examples
///
/// ```
/// use quire_sanitize::{Policy, extract_title, parse, sanitize};
///
/// let document = sanitize(&parse("<h2>Second</h2><h1> First </h1>").unwrap(), &Policy::default());
/// assert_eq!(extract_title(&document, "Chapter 1"), "First");
/// ```
pub fn extract_title(document: &Document, fallback: impl Into<String>) -> String {
    [&*PRIMARY_HEADING, &*SECONDARY_HEADING]
        .into_iter()
        .find_map(|heading| document.elements().find(|element| element.tag == *heading))
        .map(|element| element.text().trim().to_string())
        .unwrap_or_else(|| fallback.into())
}
