//! Canonical node tree and markup normalization.
//!
//! Render input arrives either as an already-built [`NodeTree`] or as a
//! markup string. Normalization is a thin dispatch: trees pass through
//! untouched, strings go to a black-box [`MarkupParser`]. The scraper-backed
//! [`HtmlParser`] behind the `html` feature is the stock parser.

#[cfg(any(feature = "html", test))]
use crate::Error;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A style property value: a bare number or a raw string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    Number(f64),
    Text(String),
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        StyleValue::Number(value)
    }
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        StyleValue::Text(value.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(value: String) -> Self {
        StyleValue::Text(value)
    }
}

/// A single styled element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementNode {
    pub tag: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub styles: HashMap<String, StyleValue>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attrs: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl ElementNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            styles: HashMap::new(),
            attrs: HashMap::new(),
            children: Vec::new(),
        }
    }

    pub fn style(mut self, key: impl Into<String>, value: impl Into<StyleValue>) -> Self {
        self.styles.insert(key.into(), value.into());
        self
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn text(self, run: impl Into<String>) -> Self {
        self.child(Node::Text(run.into()))
    }
}

/// A child entry. Order is paint and layout order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Text(String),
    Element(ElementNode),
}

/// A finite, acyclic tree rooted at exactly one element.
///
/// Built fresh per render call, never mutated afterwards, discarded when the
/// call returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeTree {
    pub root: ElementNode,
}

impl NodeTree {
    pub fn new(root: ElementNode) -> Self {
        Self { root }
    }
}

/// Render input: markup text or an already-built tree.
#[derive(Debug, Clone)]
pub enum Element {
    Markup(String),
    Tree(NodeTree),
}

impl From<&str> for Element {
    fn from(markup: &str) -> Self {
        Element::Markup(markup.to_string())
    }
}

impl From<String> for Element {
    fn from(markup: String) -> Self {
        Element::Markup(markup)
    }
}

impl From<NodeTree> for Element {
    fn from(tree: NodeTree) -> Self {
        Element::Tree(tree)
    }
}

/// Black-box markup parser boundary.
pub trait MarkupParser: Send + Sync {
    fn parse(&self, markup: &str) -> Result<NodeTree>;
}

/// Identity for trees, parser dispatch for strings.
pub fn normalize(input: Element, parser: &dyn MarkupParser) -> Result<NodeTree> {
    match input {
        Element::Tree(tree) => Ok(tree),
        Element::Markup(markup) => parser.parse(&markup),
    }
}

/// HTML fragment parser backed by scraper.
///
/// Requires exactly one top-level element. The inline `style` attribute is
/// split into the style map (bare numerics become [`StyleValue::Number`]),
/// remaining attributes are carried through, and non-blank text runs become
/// [`Node::Text`] children in document order.
#[cfg(feature = "html")]
pub struct HtmlParser;

#[cfg(feature = "html")]
impl MarkupParser for HtmlParser {
    fn parse(&self, markup: &str) -> Result<NodeTree> {
        use scraper::{ElementRef, Html};

        let fragment = Html::parse_fragment(markup);

        let mut roots = fragment
            .root_element()
            .children()
            .filter_map(ElementRef::wrap);
        let root = roots
            .next()
            .ok_or_else(|| Error::MarkupParse("markup has no root element".to_string()))?;
        if roots.next().is_some() {
            return Err(Error::MarkupParse(
                "markup has more than one root element".to_string(),
            ));
        }

        Ok(NodeTree::new(convert_element(root)))
    }
}

#[cfg(feature = "html")]
fn convert_element(element: scraper::ElementRef<'_>) -> ElementNode {
    use scraper::ElementRef;

    let mut node = ElementNode::new(element.value().name());

    for (name, value) in element.value().attrs() {
        if name == "style" {
            node.styles = parse_style_attr(value);
        } else {
            node.attrs.insert(name.to_string(), value.to_string());
        }
    }

    for child in element.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            node.children.push(Node::Element(convert_element(child_el)));
        } else if let Some(text) = child.value().as_text() {
            // Whitespace-only runs are document formatting, not paint content.
            if !text.trim().is_empty() {
                node.children.push(Node::Text(text.to_string()));
            }
        }
    }

    node
}

/// Split an inline `style` attribute into property/value pairs.
#[cfg(feature = "html")]
fn parse_style_attr(raw: &str) -> HashMap<String, StyleValue> {
    let mut styles = HashMap::new();
    for declaration in raw.split(';') {
        let Some((key, value)) = declaration.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            continue;
        }
        let parsed = match value.parse::<f64>() {
            Ok(number) => StyleValue::Number(number),
            Err(_) => StyleValue::Text(value.to_string()),
        };
        styles.insert(key.to_string(), parsed);
    }
    styles
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PanicParser;

    impl MarkupParser for PanicParser {
        fn parse(&self, _markup: &str) -> Result<NodeTree> {
            panic!("parser must not run for tree input");
        }
    }

    #[test]
    fn tree_input_passes_through_untouched() {
        let tree = NodeTree::new(
            ElementNode::new("div")
                .style("display", "flex")
                .text("hello"),
        );
        let out = normalize(Element::Tree(tree.clone()), &PanicParser).unwrap();
        assert_eq!(out, tree);
    }

    #[cfg(feature = "html")]
    #[test]
    fn parses_styles_attrs_and_text_children() {
        let tree = HtmlParser
            .parse(r#"<div style="display:flex; opacity: 0.5" data-card="hero"><h1>Hello</h1> World</div>"#)
            .unwrap();

        let root = &tree.root;
        assert_eq!(root.tag, "div");
        assert_eq!(
            root.styles.get("display"),
            Some(&StyleValue::Text("flex".into()))
        );
        assert_eq!(root.styles.get("opacity"), Some(&StyleValue::Number(0.5)));
        assert_eq!(root.attrs.get("data-card").map(String::as_str), Some("hero"));

        assert_eq!(root.children.len(), 2);
        match &root.children[0] {
            Node::Element(h1) => {
                assert_eq!(h1.tag, "h1");
                assert_eq!(h1.children, vec![Node::Text("Hello".into())]);
            }
            other => panic!("expected element child, got {other:?}"),
        }
        match &root.children[1] {
            Node::Text(run) => assert!(run.contains("World")),
            other => panic!("expected text child, got {other:?}"),
        }
    }

    #[cfg(feature = "html")]
    #[test]
    fn child_order_is_document_order() {
        let tree = HtmlParser
            .parse("<div><span>a</span><span>b</span><span>c</span></div>")
            .unwrap();
        let labels: Vec<String> = tree
            .root
            .children
            .iter()
            .map(|child| match child {
                Node::Element(el) => match &el.children[0] {
                    Node::Text(t) => t.clone(),
                    _ => panic!("expected text"),
                },
                _ => panic!("expected element"),
            })
            .collect();
        assert_eq!(labels, ["a", "b", "c"]);
    }

    #[cfg(feature = "html")]
    #[test]
    fn rejects_markup_without_a_root_element() {
        let err = HtmlParser.parse("just text").unwrap_err();
        assert!(matches!(err, Error::MarkupParse(_)));
    }

    #[cfg(feature = "html")]
    #[test]
    fn rejects_multiple_root_elements() {
        let err = HtmlParser.parse("<div></div><div></div>").unwrap_err();
        assert!(matches!(err, Error::MarkupParse(_)));
    }

    #[test]
    fn tree_round_trips_through_json() {
        let tree = NodeTree::new(
            ElementNode::new("div")
                .style("font-size", 32.0)
                .attr("id", "card")
                .text("og"),
        );
        let json = serde_json::to_string(&tree).unwrap();
        let back: NodeTree = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tree);
    }
}
