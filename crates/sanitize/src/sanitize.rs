//! Allow-list sanitization of a parsed [`Document`].
//!
//! The sanitizer never mutates its input. It walks the source tree depth
//! first and builds a fresh one, deciding for every element whether it is
//! excised (removed with its whole subtree), unwrapped (replaced in place by
//! its own sanitized children) or retained (with its attributes filtered).

use crate::{Attribute, Document, Element, Node, Policy};
use tracing::instrument;

/// Counters describing what a sanitization pass removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Elements removed together with their subtree.
    pub excised: usize,
    /// Disallowed elements replaced by their children.
    pub unwrapped: usize,
    /// `on*` attributes removed, regardless of policy.
    pub event_handlers: usize,
    /// Other attributes missing from the policy's per-tag allow-list.
    pub attributes: usize,
}
impl Stats {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// Sanitizes `document` against `policy`, returning a new document.
///
/// The result satisfies, for every element anywhere in the tree:
/// - its tag is allowed by the policy,
/// - each of its attributes is allowed for that tag by the policy,
/// - none of its attributes start with `on` (even if the policy lists one).
///
/// Script-like elements (`script`, `style`, `iframe` and friends) disappear
/// completely, text included. Sibling order is preserved, including for the
/// children of unwrapped elements, and sanitizing an already sanitized
/// document changes nothing.
///
/// # Examples
///
/// ```
/// use quire_sanitize::{Policy, parse, sanitize};
///
/// let policy = Policy::from_tags(["div", "h1"]);
/// let document = parse(r#"<div onclick="x()"><h1>Title</h1><script>evil()</script><foo>bar</foo></div>"#).unwrap();
/// assert_eq!(sanitize(&document, &policy).to_html(), "<div><h1>Title</h1>bar</div>");
/// ```
pub fn sanitize(document: &Document, policy: &Policy) -> Document {
    sanitize_with_stats(document, policy).0
}

/// Same as [`sanitize`], additionally reporting what was removed.
#[instrument(level = "debug", skip_all, fields(excised, unwrapped, event_handlers, attributes))]
pub fn sanitize_with_stats(document: &Document, policy: &Policy) -> (Document, Stats) {
    let mut sanitizer = Sanitizer { policy, stats: Stats::default() };
    let mut children = Vec::with_capacity(document.children.len());
    sanitizer.nodes(&document.children, &mut children);
    let stats = sanitizer.stats;
    let span = tracing::Span::current();
    span.record("excised", stats.excised);
    span.record("unwrapped", stats.unwrapped);
    span.record("event_handlers", stats.event_handlers);
    span.record("attributes", stats.attributes);
    (Document::from(children), stats)
}

struct Sanitizer<'p> {
    policy: &'p Policy,
    stats: Stats,
}
impl Sanitizer<'_> {
    fn nodes(&mut self, nodes: &[Node], out: &mut Vec<Node>) {
        for node in nodes {
            match node {
                Node::Text(text) => out.push(Node::Text(text.clone())),
                Node::Element(element) => self.element(element, out),
            }
        }
    }

    fn element(&mut self, element: &Element, out: &mut Vec<Node>) {
        // 1. Executable content goes, subtree and all, before anything else
        //    gets a chance to look at its descendants.
        if element.tag.is_excised() {
            tracing::trace!(tag = %element.tag, "Excising element");
            self.stats.excised += 1;
            return;
        }
        // 2. Event handlers go next; the per-tag allow-list can't bring them back.
        let attributes: Vec<&Attribute> = element.attributes.iter().filter(|attr| !attr.name.is_event_handler()).collect();
        self.stats.event_handlers += element.attributes.len() - attributes.len();

        let mut children = Vec::with_capacity(element.children.len());
        self.nodes(&element.children, &mut children);

        // 3. Disallowed elements are unwrapped: their (already sanitized)
        //    children take their place in the parent.
        if !self.policy.is_tag_allowed(&element.tag) {
            tracing::trace!(tag = %element.tag, "Unwrapping disallowed element");
            self.stats.unwrapped += 1;
            out.extend(children);
            return;
        }
        let allowed = self.policy.allowed_attributes_for(&element.tag);
        let retained: Vec<Attribute> =
            attributes.iter().filter(|attr| allowed.contains(&attr.name)).map(|attr| (*attr).clone()).collect();
        self.stats.attributes += attributes.len() - retained.len();
        out.push(Node::Element(Element {
            tag: element.tag.clone(),
            attributes: retained,
            children,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Name, parse};
    use rstest::rstest;

    fn clean(html: &str, policy: &Policy) -> String {
        sanitize(&parse(html).unwrap(), policy).to_html()
    }

    /// A hostile-ish document touching every branch of the algorithm.
    fn hostile() -> Document {
        parse(concat!(
            r#"<article class="c" data-x="1"><h1 ONCLICK="a()">Head<script>b()</script></h1>"#,
            r#"<section><foo onmouseover="c()"><em>one</em> two<bar><strong>three</strong></bar></foo></section>"#,
            r#"<p>four<style>p{}</style><iframe src="x">five</iframe></p><img src=x onerror="d()">"#,
            r#"<a href="/next" target="_blank" rel="opener" onfocus="e()">six</a><noscript><p>seven</p></noscript>"#,
            r#"<div class="x" style="color:red"><template><p>eight</p></template>nine</div></article>"#,
        ))
        .unwrap()
    }

    fn all_policies() -> Vec<Policy> {
        vec![
            Policy::default(),
            Policy::from_tags(["div", "h1"]),
            Policy::from_tags(Vec::<&str>::new()),
            // A broken policy that allows script and event handlers must not matter.
            Policy::new(["script", "a", "p", "h1"], [("a", vec!["onclick", "href"]), ("h1", vec!["onclick"])]),
        ]
    }

    #[test]
    fn test_hostile_div() {
        let policy = Policy::from_tags(["div", "h1"]);
        let html = r#"<div onclick="x()"><h1>Title</h1><script>evil()</script><foo>bar</foo></div>"#;
        assert_eq!(clean(html, &policy), "<div><h1>Title</h1>bar</div>");
    }

    #[rstest]
    #[case("<p>plain</p>", "<p>plain</p>")]
    #[case("<b><i>nested</i></b>", "<b><i>nested</i></b>")]
    #[case("<img src=x onerror=alert(1)>", "")]
    #[case("a<font>b<blink>c</blink>d</font>e", "abcde")]
    #[case("<p>before<script>alert(1)</script>after</p>", "<p>beforeafter</p>")]
    #[case("<SCRIPT>alert(1)</SCRIPT>text", "text")]
    #[case("<div style=\"x\" class=\"y\" id=\"z\">d</div>", "<div class=\"y\">d</div>")]
    #[case("<a href=\"/n\" onclick=\"x\">n</a>", "<a href=\"/n\">n</a>")]
    #[case("<p class=\"c\">p</p>", "<p>p</p>")]
    #[case("<svg><script>alert(1)</script><text>hi</text></svg>", "hi")]
    #[case("<style>body{}</style><p>x</p>", "<p>x</p>")]
    #[case("line<br>break", "line<br>break")]
    #[case("&lt;script&gt;", "&lt;script&gt;")]
    fn test_default_policy(#[case] html: &str, #[case] expected: &str) {
        assert_eq!(clean(html, &Policy::default()), expected);
    }

    #[test]
    fn test_unwrap_preserves_position() {
        let policy = Policy::from_tags(["p"]);
        assert_eq!(clean("<p>1</p><x>2<p>3</p>4</x><p>5</p>", &policy), "<p>1</p>2<p>3</p>4<p>5</p>");
    }

    #[test]
    fn test_event_handlers_cannot_be_allowed() {
        let policy = Policy::new(["a"], [("a", ["onclick", "OnFocus", "href"])]);
        let document = Document::new([Element::new("a")
            .with_attribute("onclick", "x()")
            .with_attribute("onfocus", "y()")
            .with_attribute("href", "/")
            .into()]);
        assert_eq!(sanitize(&document, &policy).to_html(), r#"<a href="/"></a>"#);
    }

    #[test]
    fn test_excised_even_when_allowed() {
        let policy = Policy::from_tags(["script", "iframe", "p"]);
        assert_eq!(clean("<p>a<script>b</script><iframe>c</iframe>d</p>", &policy), "<p>ad</p>");
    }

    #[test]
    fn test_stats() {
        let policy = Policy::new(["div", "a"], [("a", ["href"])]);
        let document = parse(r#"<div onclick="x" id="d"><a href="/" title="t">a</a><foo>b</foo><script>c</script></div>"#).unwrap();
        let (_, stats) = sanitize_with_stats(&document, &policy);
        assert_eq!(
            stats,
            Stats {
                excised: 1,
                unwrapped: 1,
                event_handlers: 1,
                attributes: 2,
            }
        );
        assert!(!stats.is_clean());
    }

    #[test]
    fn test_everything_disallowed_is_empty_text() {
        let policy = Policy::from_tags(Vec::<&str>::new());
        let sanitized = sanitize(&parse("<div><p>only <em>text</em></p></div>").unwrap(), &policy);
        assert_eq!(sanitized.elements().count(), 0);
        assert_eq!(sanitized.text(), "only text");
    }

    #[test]
    fn test_idempotent() {
        let document = hostile();
        for policy in all_policies() {
            let once = sanitize(&document, &policy);
            let (twice, stats) = sanitize_with_stats(&once, &policy);
            assert_eq!(once, twice);
            assert!(stats.is_clean());
        }
    }

    #[test]
    fn test_closure_properties() {
        let document = hostile();
        for policy in all_policies() {
            let sanitized = sanitize(&document, &policy);
            for element in sanitized.elements() {
                assert!(policy.is_tag_allowed(&element.tag), "tag {} escaped the allow-list", element.tag);
                assert!(!element.tag.is_excised());
                let allowed = policy.allowed_attributes_for(&element.tag);
                for attr in &element.attributes {
                    assert!(allowed.contains(&attr.name), "attribute {} escaped the allow-list", attr.name);
                    assert!(!attr.name.is_event_handler(), "event handler {} survived", attr.name);
                }
            }
        }
    }

    #[test]
    fn test_script_text_excised() {
        let document = hostile();
        for policy in all_policies() {
            let text = sanitize(&document, &policy).text();
            for leaked in ["b()", "p{}", "five", "seven", "eight"] {
                assert!(!text.contains(leaked), "{leaked:?} leaked into {text:?}");
            }
        }
    }

    #[test]
    fn test_text_order_preserved() {
        let document = hostile();
        let original = document.text();
        for policy in all_policies() {
            let sanitized = sanitize(&document, &policy).text();
            // Retained text must be a subsequence of the original text.
            let mut remaining = original.chars();
            assert!(sanitized.chars().all(|c| remaining.any(|o| o == c)), "{sanitized:?} reordered");
            assert_eq!(sanitized, "Headone twothreefoursixnine");
        }
    }

    #[test]
    fn test_input_is_untouched() {
        let document = hostile();
        let copy = document.clone();
        let _ = sanitize(&document, &Policy::default());
        assert_eq!(document, copy);
        assert!(document.elements().any(|el| el.tag == Name::new("script")));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::Tag;
    use proptest::prelude::*;

    const TAGS: &[&str] = &[
        "div", "p", "h1", "h2", "a", "span", "em", "foo", "bar", "script", "style", "iframe", "template", "noscript",
    ];
    const ATTRIBUTES: &[&str] = &["class", "href", "id", "title", "style", "data-x", "onclick", "OnMouseOver", "on"];

    fn arb_element(children: impl Strategy<Value = Vec<Node>>) -> impl Strategy<Value = Element> {
        let attributes = prop::collection::vec((prop::sample::select(ATTRIBUTES), "[a-z()]{0,4}"), 0..3);
        (prop::sample::select(TAGS), attributes, children).prop_map(|(tag, attributes, children)| {
            let mut element = Element::new(tag);
            for (name, value) in attributes {
                element = element.with_attribute(name, value);
            }
            element.children = children;
            element
        })
    }

    fn arb_node() -> impl Strategy<Value = Node> {
        let leaf = "[a-z ]{1,4}".prop_map(Node::Text);
        leaf.prop_recursive(5, 48, 4, |inner| arb_element(prop::collection::vec(inner, 0..4)).prop_map(Node::Element))
    }

    fn arb_document() -> impl Strategy<Value = Document> {
        prop::collection::vec(arb_node(), 0..5).prop_map(Document::from)
    }

    fn arb_policy() -> impl Strategy<Value = Policy> {
        let tags = prop::sample::subsequence(TAGS, 0..=TAGS.len());
        let attributes = prop::collection::vec(
            (prop::sample::select(TAGS), prop::sample::subsequence(ATTRIBUTES, 0..=ATTRIBUTES.len())),
            0..4,
        );
        (tags, attributes).prop_map(|(tags, attributes)| Policy::new(tags, attributes))
    }

    /// Text outside excised subtrees, in document order.
    fn surviving_text(nodes: &[Node], out: &mut String) {
        for node in nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) if element.tag.is_excised() => {},
                Node::Element(element) => surviving_text(&element.children, out),
            }
        }
    }

    /// Pre-order tags of the elements a policy keeps, skipping excised subtrees.
    fn surviving_tags(nodes: &[Node], policy: &Policy, out: &mut Vec<Tag>) {
        for node in nodes {
            let Node::Element(element) = node else {
                continue;
            };
            if element.tag.is_excised() {
                continue;
            }
            if policy.is_tag_allowed(&element.tag) {
                out.push(element.tag.clone());
            }
            surviving_tags(&element.children, policy, out);
        }
    }

    proptest! {
        #[test]
        fn sanitize_is_idempotent(document in arb_document(), policy in arb_policy()) {
            let once = sanitize(&document, &policy);
            let (twice, stats) = sanitize_with_stats(&once, &policy);
            prop_assert_eq!(&twice, &once);
            prop_assert!(stats.is_clean());
        }

        #[test]
        fn only_allowed_tags_survive(document in arb_document(), policy in arb_policy()) {
            for element in sanitize(&document, &policy).elements() {
                prop_assert!(policy.is_tag_allowed(&element.tag));
                prop_assert!(!element.tag.is_excised());
            }
        }

        #[test]
        fn only_allowed_attributes_survive(document in arb_document(), policy in arb_policy()) {
            for element in sanitize(&document, &policy).elements() {
                let allowed = policy.allowed_attributes_for(&element.tag);
                for attr in &element.attributes {
                    prop_assert!(allowed.contains(&attr.name));
                    prop_assert!(!attr.name.is_event_handler());
                }
            }
        }

        #[test]
        fn text_keeps_its_order(document in arb_document(), policy in arb_policy()) {
            let mut expected = String::new();
            surviving_text(&document.children, &mut expected);
            prop_assert_eq!(sanitize(&document, &policy).text(), expected);
        }

        #[test]
        fn elements_keep_their_order(document in arb_document(), policy in arb_policy()) {
            let mut expected = Vec::new();
            surviving_tags(&document.children, &policy, &mut expected);
            let tags: Vec<Tag> = sanitize(&document, &policy).elements().map(|element| element.tag.clone()).collect();
            prop_assert_eq!(tags, expected);
        }
    }
}
