//! Allow-list of elements and, per element, attributes that survive sanitization.

use crate::consts;
use crate::{AttrName, Tag};
use std::collections::{HashMap, HashSet};

const DEFAULT_TAGS: &[&str] = &[
    "p", "br", "h1", "h2", "h3", "h4", "h5", "h6", "em", "strong", "i", "b", "u", "ul", "ol", "li", "blockquote", "q",
    "cite", "a", "span", "div", "article", "section", "header", "footer", "hr", "pre", "code",
];
const DEFAULT_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("a", &["href", "title", "target"]),
    ("span", &["class"]),
    ("div", &["class"]),
    ("article", &["class"]),
    ("section", &["class"]),
];

/// Immutable sanitization policy.
///
/// There are no mutating methods: build one up front and share
/// it (typically behind an [`Arc`](std::sync::Arc)) for the lifetime of
/// whatever is sanitizing.
///
/// # Examples
///
/// ```
/// use quire_sanitize::{Name, Policy};
///
/// let policy = Policy::new(["div", "a"], [("a", ["href"])]);
/// assert!(policy.is_tag_allowed(&Name::new("A")));
/// assert!(!policy.is_tag_allowed(&Name::new("img")));
/// assert!(policy.allowed_attributes_for(&Name::new("div")).is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    tags: HashSet<Tag>,
    attributes: HashMap<Tag, HashSet<AttrName>>,
}
impl Policy {
    pub fn new<T, A, N>(tags: impl IntoIterator<Item = T>, attributes: impl IntoIterator<Item = (T, A)>) -> Self
    where
        T: AsRef<str>,
        A: IntoIterator<Item = N>,
        N: AsRef<str>,
    {
        let mut map: HashMap<Tag, HashSet<AttrName>> = HashMap::new();
        for (tag, names) in attributes {
            map.entry(Tag::new(tag)).or_default().extend(names.into_iter().map(AttrName::new));
        }
        Self {
            tags: tags.into_iter().map(Tag::new).collect(),
            attributes: map,
        }
    }

    /// A policy that allows `tags` but no attributes on any of them.
    pub fn from_tags<T: AsRef<str>>(tags: impl IntoIterator<Item = T>) -> Self {
        Self {
            tags: tags.into_iter().map(Tag::new).collect(),
            attributes: HashMap::new(),
        }
    }

    pub fn is_tag_allowed(&self, tag: &Tag) -> bool {
        self.tags.contains(tag)
    }

    /// Attributes permitted on `tag`; empty for tags the policy doesn't mention.
    pub fn allowed_attributes_for(&self, tag: &Tag) -> &HashSet<AttrName> {
        self.attributes.get(tag).unwrap_or(&*consts::NO_ATTRIBUTES)
    }

    pub fn tags(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter()
    }
}
impl Default for Policy {
    /// The policy used for chapter content: basic prose formatting, lists,
    /// quotations, links and a handful of sectioning elements.
    fn default() -> Self {
        Self::new(DEFAULT_TAGS.iter().copied(), DEFAULT_ATTRIBUTES.iter().map(|(tag, names)| (*tag, names.iter().copied())))
    }
}
