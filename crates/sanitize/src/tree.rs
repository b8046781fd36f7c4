//! Owned node tree for chapter fragments.
//!
//! The parser produces a [`Document`], the sanitizer consumes one and builds
//! a new one. Nothing here is shared: each tree is owned by whichever
//! operation is currently processing it.

use crate::consts;
use html5ever::serialize::{Serialize, SerializeOpts, Serializer, TraversalScope, serialize};
use html5ever::{LocalName, QualName};
use std::fmt::{Display, Error as FmtError, Formatter, Result as FmtResult};
use std::io;

/// An interned, ASCII-lowercased element or attribute name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name(LocalName);
/// Element tag name.
pub type Tag = Name;
/// Attribute name.
pub type AttrName = Name;

impl Name {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(LocalName::from(name.as_ref().to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Attribute names that begin with `on` (any case) are treated as event
    /// handlers, whether or not a browser would actually recognise them.
    pub fn is_event_handler(&self) -> bool {
        self.0.get(..2).is_some_and(|prefix| prefix.eq_ignore_ascii_case("on"))
    }

    /// Elements with this tag are removed along with their entire subtree.
    pub fn is_excised(&self) -> bool {
        consts::EXCISED.contains(self)
    }

    fn qualified(&self, namespace: &html5ever::Namespace) -> QualName {
        QualName::new(None, namespace.clone(), self.0.clone())
    }
}
impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
impl From<String> for Name {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
impl Display for Name {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: AttrName,
    pub value: String,
}
impl Attribute {
    pub fn new(name: impl Into<AttrName>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: Tag,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}
impl Element {
    pub fn new(tag: impl Into<Tag>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<AttrName>, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        let name = Name::new(name);
        self.attributes.iter().find(|attr| attr.name == name).map(|attr| attr.value.as_str())
    }

    /// Concatenation of every text leaf below this element, in document order.
    pub fn text(&self) -> String {
        let mut text = String::new();
        collect_text(&self.children, &mut text);
        text
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}
impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}
impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}
impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// A parsed fragment: the ordered list of its top-level nodes.
///
/// Formatting a document with [`Display`] serializes it back to markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub children: Vec<Node>,
}
impl Document {
    pub fn new(children: impl IntoIterator<Item = Node>) -> Self {
        Self { children: children.into_iter().collect() }
    }

    /// Every element in the document, in document (pre-)order.
    pub fn elements(&self) -> Elements<'_> {
        Elements { stack: self.children.iter().rev().collect() }
    }

    /// Concatenation of every text leaf in the document, in document order.
    pub fn text(&self) -> String {
        let mut text = String::new();
        collect_text(&self.children, &mut text);
        text
    }

    /// Serializes the document into HTML markup.
    pub fn to_html(&self) -> String {
        self.to_string()
    }
}
impl From<Vec<Node>> for Document {
    fn from(children: Vec<Node>) -> Self {
        Self { children }
    }
}
impl Display for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let mut buffer = Vec::new();
        serialize(&mut buffer, self, SerializeOpts::default()).map_err(|_| FmtError)?;
        f.write_str(&String::from_utf8_lossy(&buffer))
    }
}

fn collect_text(nodes: &[Node], text: &mut String) {
    for node in nodes {
        match node {
            Node::Text(value) => text.push_str(value),
            Node::Element(element) => collect_text(&element.children, text),
        }
    }
}

/// Pre-order iterator over the elements of a [`Document`].
pub struct Elements<'a> {
    stack: Vec<&'a Node>,
}
impl<'a> Iterator for Elements<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            if let Node::Element(element) = node {
                self.stack.extend(element.children.iter().rev());
                return Some(element);
            }
        }
        None
    }
}

// html5ever's serializer takes care of escaping text and attribute values and
// knows which elements are void, so all we have to do is walk the tree.
impl Serialize for Document {
    fn serialize<S>(&self, serializer: &mut S, _scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        for child in &self.children {
            child.serialize(serializer, TraversalScope::IncludeNode)?;
        }
        Ok(())
    }
}
impl Serialize for Node {
    fn serialize<S>(&self, serializer: &mut S, scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        match self {
            Node::Text(text) => serializer.write_text(text),
            Node::Element(element) => element.serialize(serializer, scope),
        }
    }
}
impl Serialize for Element {
    fn serialize<S>(&self, serializer: &mut S, _scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        let name = self.tag.qualified(&consts::HTML_NAMESPACE);
        let attributes: Vec<(QualName, &str)> = self
            .attributes
            .iter()
            .map(|attr| (attr.name.qualified(&consts::NO_NAMESPACE), attr.value.as_str()))
            .collect();
        serializer.start_elem(name.clone(), attributes.iter().map(|(name, value)| (name, *value)))?;
        for child in &self.children {
            child.serialize(serializer, TraversalScope::IncludeNode)?;
        }
        serializer.end_elem(name)
    }
}
