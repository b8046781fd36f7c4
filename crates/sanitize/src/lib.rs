//! Turns untrusted chapter markup into a safe, allow-listed document.
//!
//! The pipeline is [`parse`] → [`sanitize`] → [`extract_title`], with the
//! sanitized [`Document`] serialized back to markup through its
//! [`Display`](std::fmt::Display) implementation.

mod consts;
pub mod error;
mod parse;
mod policy;
mod sanitize;
mod title;
mod tree;

use tracing::instrument;

use crate::error::Result;
pub use crate::parse::parse;
pub use crate::policy::Policy;
pub use crate::sanitize::{Stats, sanitize, sanitize_with_stats};
pub use crate::title::extract_title;
pub use crate::tree::{AttrName, Attribute, Document, Element, Elements, Name, Node, Tag};

/// Easy, top-level entrypoint: parse raw markup bytes and sanitize the result.
///
/// Sanitizing the returned [`Document`] again changes nothing. Serializing it
/// and cleaning the markup a second time usually gives the same tree too, but
/// not always: unwrapping can leave nestings the HTML parser would never
/// build (an `h2` directly inside an `h1`, say), and reparsing restructures
/// them.
///
/// # Errors
///
/// Only fails when the input is empty, see [`parse`].
#[instrument(skip_all, fields(html_size = html.as_ref().len()))]
pub fn clean(html: impl AsRef<[u8]>, policy: &Policy) -> Result<Document> {
    let document = parse(html)?;
    let (document, stats) = sanitize_with_stats(&document, policy);
    if !stats.is_clean() {
        tracing::debug!(?stats, "Removed disallowed markup");
    }
    Ok(document)
}
