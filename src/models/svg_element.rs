//! Owned SVG element tree.
//!
//! Parsed once from the fetched document and then shared read-only from the
//! cache. `Clone` is a deep copy, so every consumer gets an independent tree
//! it may transform freely.

use quick_xml::escape::escape;
use roxmltree::{Document, Node, NodeType, ParsingOptions};
use std::fmt;

use crate::error::ParseError;

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SvgNode {
    Element(SvgElement),
    Text(String),
    Comment(String),
}

impl From<SvgElement> for SvgNode {
    fn from(element: SvgElement) -> Self {
        SvgNode::Element(element)
    }
}

/// An element with its qualified name, ordered attributes and children.
///
/// Namespace declarations (`xmlns`, `xmlns:xlink`, ...) are kept as plain
/// attributes so they survive attribute merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvgElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<SvgNode>,
}

impl SvgElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_child(mut self, child: impl Into<SvgNode>) -> Self {
        self.append_child(child);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|(k, _)| k == name)?;
        Some(self.attributes.remove(index).1)
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut Vec<(String, String)> {
        &mut self.attributes
    }

    pub fn children(&self) -> &[SvgNode] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<SvgNode> {
        &mut self.children
    }

    pub fn append_child(&mut self, child: impl Into<SvgNode>) {
        self.children.push(child.into());
    }

    pub fn prepend_child(&mut self, child: impl Into<SvgNode>) {
        self.children.insert(0, child.into());
    }

    /// Direct element children.
    pub fn child_elements(&self) -> impl Iterator<Item = &SvgElement> {
        self.children.iter().filter_map(|child| match child {
            SvgNode::Element(element) => Some(element),
            _ => None,
        })
    }

    /// First direct child element with the given name.
    pub fn child_element_mut(&mut self, name: &str) -> Option<&mut SvgElement> {
        self.children.iter_mut().find_map(|child| match child {
            SvgNode::Element(element) if element.name == name => Some(element),
            _ => None,
        })
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                SvgNode::Text(text) => out.push_str(text),
                SvgNode::Element(element) => element.collect_text(out),
                SvgNode::Comment(_) => {}
            }
        }
    }

    /// Replace all children with a single text node.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children = vec![SvgNode::Text(text.into())];
    }

    /// Visit this element and every descendant element in document order.
    pub fn visit(&self, f: &mut impl FnMut(&SvgElement)) {
        f(self);
        for child in self.child_elements() {
            child.visit(f);
        }
    }

    /// Mutable variant of [`SvgElement::visit`].
    pub fn visit_mut(&mut self, f: &mut impl FnMut(&mut SvgElement)) {
        f(self);
        for child in &mut self.children {
            if let SvgNode::Element(element) = child {
                element.visit_mut(f);
            }
        }
    }

    /// Serialized content of this element, without its own tag.
    pub fn inner_markup(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            write_node(child, &mut out);
        }
        out
    }

    /// Serialized element including its own tag.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        write_element(self, &mut out);
        out
    }
}

impl fmt::Display for SvgElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_markup())
    }
}

/// Write `<name a="b"...>` (or the self-closing form) followed by content.
pub(crate) fn write_tag(
    name: &str,
    attributes: &[(String, String)],
    content: &str,
    out: &mut String,
) {
    out.push('<');
    out.push_str(name);
    for (key, value) in attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape(value.as_str()));
        out.push('"');
    }
    if content.is_empty() {
        out.push_str("/>");
    } else {
        out.push('>');
        out.push_str(content);
        out.push_str("</");
        out.push_str(name);
        out.push('>');
    }
}

fn write_element(element: &SvgElement, out: &mut String) {
    write_tag(
        &element.name,
        &element.attributes,
        &element.inner_markup(),
        out,
    );
}

fn write_node(node: &SvgNode, out: &mut String) {
    match node {
        SvgNode::Element(element) => write_element(element, out),
        SvgNode::Text(text) => out.push_str(&escape(text.as_str())),
        SvgNode::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
    }
}

/// Parse an XML document and extract its `<svg>` element.
///
/// The document root is used when it is an `<svg>`; otherwise the first
/// `<svg>` in document order.
pub fn parse_svg(text: &str) -> Result<SvgElement, ParseError> {
    let mut options = ParsingOptions::default();
    options.allow_dtd = true;

    let doc = Document::parse_with_options(text, options)
        .map_err(|e| ParseError::Xml(e.to_string()))?;

    let root = doc.root_element();
    let is_svg = |node: &Node<'_, '_>| node.is_element() && node.tag_name().name() == "svg";
    let svg = if is_svg(&root) {
        Some(root)
    } else {
        root.descendants().find(is_svg)
    };

    svg.map(|node| convert_element(node, &[]))
        .ok_or(ParseError::MissingSvg)
}

type NamespaceDecl<'a> = (Option<&'a str>, &'a str);

fn convert_element(node: Node<'_, '_>, inherited: &[NamespaceDecl<'_>]) -> SvgElement {
    let in_scope: Vec<NamespaceDecl<'_>> = node
        .namespaces()
        .filter(|ns| ns.name() != Some("xml"))
        .map(|ns| (ns.name(), ns.uri()))
        .collect();

    let tag = node.tag_name();
    let mut element = SvgElement::new(qualified_name(node, tag.namespace(), tag.name()));

    for decl in &in_scope {
        if inherited.contains(decl) {
            continue;
        }
        let name = match decl.0 {
            Some(prefix) => format!("xmlns:{prefix}"),
            None => "xmlns".to_string(),
        };
        element.attributes.push((name, decl.1.to_string()));
    }

    for attr in node.attributes() {
        element.attributes.push((
            qualified_name(node, attr.namespace(), attr.name()),
            attr.value().to_string(),
        ));
    }

    for child in node.children() {
        match child.node_type() {
            NodeType::Element => element
                .children
                .push(SvgNode::Element(convert_element(child, &in_scope))),
            NodeType::Text => {
                if let Some(text) = child.text() {
                    element.children.push(SvgNode::Text(text.to_string()));
                }
            }
            NodeType::Comment => {
                if let Some(text) = child.text() {
                    element.children.push(SvgNode::Comment(text.to_string()));
                }
            }
            _ => {}
        }
    }

    element
}

fn qualified_name(node: Node<'_, '_>, namespace: Option<&str>, local: &str) -> String {
    let prefix = match namespace {
        Some(XML_NS) => Some("xml"),
        Some(uri) => node.lookup_prefix(uri),
        None => None,
    };
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}:{local}"),
        _ => local.to_string(),
    }
}
