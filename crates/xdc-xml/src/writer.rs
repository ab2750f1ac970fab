#![forbid(unsafe_code)]

//! Owned element tree and serializer.
//!
//! Parsed `roxmltree` documents are read-only. New documents (the XDC wrapper)
//! are assembled as an [`XmlElement`] tree, optionally grafting deep copies of
//! parsed elements via [`XmlElement::from_node`], and serialized in one pass.
//!
//! Namespace declarations are stored per element as `(prefix, uri)` pairs,
//! `""` naming the default namespace. The serializer tracks the bindings in
//! scope and writes a declaration only where it changes the binding, so a
//! grafted subtree keeps its meaning under any parent.

use crate::escape;
use std::collections::BTreeMap;

/// XML declaration written by [`XmlElement::to_document_string`].
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// A child of an [`XmlElement`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlContent {
    Element(XmlElement),
    Text(String),
    Comment(String),
    ProcessingInstruction { target: String, data: String },
}

/// An owned XML element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    /// Qualified name as written (`prefix:local` or `local`).
    pub name: String,
    /// Namespace declarations carried by this element.
    pub namespaces: Vec<(String, String)>,
    /// Attributes by qualified name, in document order.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlContent>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Declare a namespace binding on this element.
    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespaces.push((prefix.into(), uri.into()));
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Add an attribute only when a value is present.
    pub fn with_optional_attribute(self, name: impl Into<String>, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.with_attribute(name, v),
            None => self,
        }
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlContent::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlContent::Text(text.into()));
        self
    }

    /// Set an attribute, replacing an existing one with the same name.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Element children only.
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|c| match c {
            XmlContent::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Deep copy of a parsed element.
    ///
    /// The copy declares every binding in scope at `node` (plus `xmlns=""`
    /// when `node` has no default namespace), so it can be placed under an
    /// arbitrary parent. Descendants declare only what differs from their
    /// parent.
    pub fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        let scope = crate::inscope_namespaces(node);
        let mut namespaces: Vec<(String, String)> = scope
            .iter()
            .map(|(p, u)| (p.clone(), u.clone()))
            .collect();
        if !scope.contains_key("") {
            namespaces.insert(0, (String::new(), String::new()));
        }
        copy_element(node, namespaces)
    }

    /// Serialize without an XML declaration.
    pub fn to_xml_string(&self) -> String {
        let mut out = String::new();
        write_element(self, &BTreeMap::new(), &mut out);
        out
    }

    /// Serialize as a standalone UTF-8 document.
    pub fn to_document_string(&self) -> String {
        let mut out = String::from(XML_DECLARATION);
        write_element(self, &BTreeMap::new(), &mut out);
        out
    }
}

fn copy_element(node: roxmltree::Node<'_, '_>, namespaces: Vec<(String, String)>) -> XmlElement {
    let attributes = node
        .attributes()
        .map(|a| (crate::attribute_qname(node, &a), a.value().to_owned()))
        .collect();

    let mut children = Vec::new();
    let mut parent_scope: Option<BTreeMap<String, String>> = None;
    for child in node.children() {
        match child.node_type() {
            roxmltree::NodeType::Element => {
                let outer = parent_scope.get_or_insert_with(|| crate::inscope_namespaces(node));
                let inner = crate::inscope_namespaces(child);
                children.push(XmlContent::Element(copy_element(child, scope_diff(outer, &inner))));
            }
            roxmltree::NodeType::Text => {
                children.push(XmlContent::Text(child.text().unwrap_or("").to_owned()));
            }
            roxmltree::NodeType::Comment => {
                children.push(XmlContent::Comment(child.text().unwrap_or("").to_owned()));
            }
            roxmltree::NodeType::PI => {
                if let Some(pi) = child.pi() {
                    children.push(XmlContent::ProcessingInstruction {
                        target: pi.target.to_owned(),
                        data: pi.value.unwrap_or("").to_owned(),
                    });
                }
            }
            roxmltree::NodeType::Root => {}
        }
    }

    XmlElement {
        name: crate::qualified_name(node),
        namespaces,
        attributes,
        children,
    }
}

/// Declarations needed to go from `outer` to `inner`.
fn scope_diff(
    outer: &BTreeMap<String, String>,
    inner: &BTreeMap<String, String>,
) -> Vec<(String, String)> {
    let mut decls: Vec<(String, String)> = inner
        .iter()
        .filter(|(p, u)| outer.get(*p) != Some(*u))
        .map(|(p, u)| (p.clone(), u.clone()))
        .collect();
    if outer.contains_key("") && !inner.contains_key("") {
        decls.insert(0, (String::new(), String::new()));
    }
    decls
}

fn write_element(elem: &XmlElement, scope: &BTreeMap<String, String>, out: &mut String) {
    let mut local_scope = None;
    out.push('<');
    out.push_str(&elem.name);
    for (prefix, uri) in &elem.namespaces {
        let current = scope.get(prefix).map(String::as_str).unwrap_or("");
        if current == uri.as_str() {
            continue;
        }
        if prefix.is_empty() {
            out.push_str(" xmlns=\"");
        } else {
            out.push_str(" xmlns:");
            out.push_str(prefix);
            out.push_str("=\"");
        }
        out.push_str(&escape::escape_attr(uri));
        out.push('"');
        local_scope
            .get_or_insert_with(|| scope.clone())
            .insert(prefix.clone(), uri.clone());
    }
    for (name, value) in &elem.attributes {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape::escape_attr(value));
        out.push('"');
    }

    if elem.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');

    let scope = local_scope.as_ref().unwrap_or(scope);
    for child in &elem.children {
        match child {
            XmlContent::Element(e) => write_element(e, scope, out),
            XmlContent::Text(t) => out.push_str(&escape::escape_text(t)),
            XmlContent::Comment(c) => {
                out.push_str("<!--");
                out.push_str(c);
                out.push_str("-->");
            }
            XmlContent::ProcessingInstruction { target, data } => {
                out.push_str("<?");
                out.push_str(target);
                if !data.is_empty() {
                    out.push(' ');
                    out.push_str(&escape::escape_pi(data));
                }
                out.push_str("?>");
            }
        }
    }

    out.push_str("</");
    out.push_str(&elem.name);
    out.push('>');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reparse_default_ns(xml: &str, local: &str) -> Option<String> {
        let doc = roxmltree::Document::parse(xml).unwrap();
        let node = doc
            .descendants()
            .find(|n| n.is_element() && n.tag_name().name() == local)
            .unwrap();
        node.tag_name().namespace().map(str::to_owned)
    }

    #[test]
    fn test_builder_serializes() {
        let elem = XmlElement::new("Root")
            .with_namespace("", "urn:c")
            .with_attribute("a", "1 & 2")
            .with_child(XmlElement::new("Leaf").with_text("x<y"));
        assert_eq!(
            elem.to_xml_string(),
            r#"<Root xmlns="urn:c" a="1 &amp; 2"><Leaf>x&lt;y</Leaf></Root>"#
        );
        assert!(elem.to_document_string().starts_with(XML_DECLARATION));
    }

    #[test]
    fn test_set_attribute_replaces() {
        let mut elem = XmlElement::new("a").with_attribute("k", "1");
        elem.set_attribute("k", "2");
        assert_eq!(elem.attribute("k"), Some("2"));
        assert_eq!(elem.attributes.len(), 1);
        let elem = elem.with_optional_attribute("m", None);
        assert_eq!(elem.attribute("m"), None);
    }

    #[test]
    fn test_from_node_keeps_namespace_under_new_parent() {
        let src = r#"<GeneralAgenda xmlns="http://schemas.gov.sk/form/App.GeneralAgenda/1.9"><subject>Test</subject></GeneralAgenda>"#;
        let doc = roxmltree::Document::parse(src).unwrap();
        let copy = XmlElement::from_node(doc.root_element());
        let wrapper = XmlElement::new("XMLData")
            .with_namespace("", "urn:container")
            .with_child(copy);
        let out = wrapper.to_xml_string();
        assert_eq!(
            reparse_default_ns(&out, "subject").as_deref(),
            Some("http://schemas.gov.sk/form/App.GeneralAgenda/1.9")
        );
        assert_eq!(
            reparse_default_ns(&out, "XMLData").as_deref(),
            Some("urn:container")
        );
    }

    #[test]
    fn test_from_node_without_namespace_undeclares_default() {
        let doc = roxmltree::Document::parse("<form><item>1</item></form>").unwrap();
        let copy = XmlElement::from_node(doc.root_element());
        let out = XmlElement::new("XMLData")
            .with_namespace("", "urn:container")
            .with_child(copy)
            .to_xml_string();
        assert!(out.contains(r#"<form xmlns="">"#));
        assert_eq!(reparse_default_ns(&out, "item"), None);

        // No redundant xmlns="" when nothing needs undeclaring.
        let copy = XmlElement::from_node(doc.root_element());
        assert_eq!(copy.to_xml_string(), "<form><item>1</item></form>");
    }

    #[test]
    fn test_from_node_prefixed_and_nested_declarations() {
        let src = r#"<p:a xmlns:p="urn:p" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:type="t"><b xmlns="urn:b"><!--note--><?pi data?></b></p:a>"#;
        let doc = roxmltree::Document::parse(src).unwrap();
        let out = XmlElement::from_node(doc.root_element()).to_xml_string();
        let reparsed = roxmltree::Document::parse(&out).unwrap();
        let root = reparsed.root_element();
        assert_eq!(root.tag_name().namespace(), Some("urn:p"));
        assert_eq!(
            root.attribute(("http://www.w3.org/2001/XMLSchema-instance", "type")),
            Some("t")
        );
        let b = root.first_element_child().unwrap();
        assert_eq!(b.tag_name().namespace(), Some("urn:b"));
        assert!(out.contains("<!--note-->"));
        assert!(out.contains("<?pi data?>"));
    }
}
