//! Lenient fragment parsing via `scraper`/`html5ever`.

use crate::consts::MAX_DEPTH;
use crate::error::{ErrorKind, Result};
use crate::{Attribute, Document, Element, Node, Tag};
use scraper::{ElementRef, Html};
use tracing::instrument;

/// Parses raw markup bytes into a [`Document`].
///
/// The bytes are parsed as an HTML fragment in a `<body>` context, exactly as
/// a browser would when assigning to `innerHTML`: unclosed tags are closed,
/// stray end tags are ignored, and so on. Broken markup never fails the parse,
/// it just produces whatever tree the HTML parsing algorithm settles on.
///
/// Accepts raw bytes, instead of requiring HTML to be valid UTF-8. Invalid byte
/// sequences are replaced with U+FFFD.
///
/// Comments, doctypes and processing instructions are discarded, and anything
/// nested more than a few hundred elements deep is dropped.
///
/// # Errors
///
/// Returns [`EmptyDocument`](ErrorKind::EmptyDocument) if the input is empty or
/// contains only whitespace.
///
/// # Examples
///
/// ```
/// use quire_sanitize::parse;
///
/// let document = parse("<p>Unclosed <em>emphasis").unwrap();
/// assert_eq!(document.to_html(), "<p>Unclosed <em>emphasis</em></p>");
/// assert!(parse("   ").is_err());
/// ```
#[instrument(skip(html), fields(html_size = html.as_ref().len()))]
pub fn parse(html: impl AsRef<[u8]>) -> Result<Document> {
    let html = String::from_utf8_lossy(html.as_ref());
    if html.trim().is_empty() {
        exn::bail!(ErrorKind::EmptyDocument);
    }
    let fragment = Html::parse_fragment(&html);
    // Fragments are parsed underneath a synthetic <html> root element.
    Ok(Document::new(children(fragment.root_element(), 0)))
}

fn children(parent: ElementRef<'_>, depth: usize) -> Vec<Node> {
    parent
        .children()
        .filter_map(|child| match child.value() {
            scraper::Node::Text(text) => Some(Node::Text(text.text.to_string())),
            scraper::Node::Element(_) if depth >= MAX_DEPTH => {
                tracing::warn!(depth, "Dropping subtree nested beyond maximum depth");
                None
            },
            scraper::Node::Element(_) => ElementRef::wrap(child).map(|element| Node::Element(self::element(element, depth))),
            _ => None,
        })
        .collect()
}

fn element(element: ElementRef<'_>, depth: usize) -> Element {
    let value = element.value();
    Element {
        tag: Tag::new(value.name()),
        attributes: value.attrs().map(|(name, value)| Attribute::new(name, value)).collect(),
        children: self::children(element, depth + 1),
    }
}
