use crate::Name;
use html5ever::Namespace;
use std::collections::HashSet;
use std::sync::LazyLock;

macro_rules! name {
    ($name:ident, $value:expr) => {
        pub(crate) static $name: LazyLock<Name> = LazyLock::new(|| Name::new($value));
    };
}

/// Deeper subtrees than this are dropped by the parser rather than recursed into.
pub(crate) const MAX_DEPTH: usize = 256;

pub(crate) static HTML_NAMESPACE: LazyLock<Namespace> =
    LazyLock::new(|| Namespace::from("http://www.w3.org/1999/xhtml"));
pub(crate) static NO_NAMESPACE: LazyLock<Namespace> = LazyLock::new(|| Namespace::from(""));

name!(PRIMARY_HEADING, "h1");
name!(SECONDARY_HEADING, "h2");

// Elements whose content is either executable, embedded from elsewhere, or
// parsed as raw text (and therefore can't be filtered node by node). These are
// removed together with everything inside them, whatever the policy says.
pub(crate) static EXCISED: LazyLock<HashSet<Name>> = LazyLock::new(|| {
    [
        "script", "noscript", "style", "template", "iframe", "frame", "frameset", "object", "embed", "applet",
        "noembed", "noframes", "xmp", "plaintext",
    ]
    .into_iter()
    .map(Name::new)
    .collect()
});

pub(crate) static NO_ATTRIBUTES: LazyLock<HashSet<Name>> = LazyLock::new(HashSet::new);
