#![forbid(unsafe_code)]

//! XML document abstraction for the XDC eForm pipeline.
//!
//! Provides lookup helpers over `roxmltree` and an owned element tree used to
//! build new documents without mutating parsed ones.

pub mod document;
pub mod escape;
pub mod writer;

pub use document::XmlDocument;
pub use roxmltree;
pub use writer::{XmlContent, XmlElement};

use std::collections::BTreeMap;

/// Return roxmltree parsing options that allow DTD.
///
/// roxmltree does not resolve external entities, so a DTD only ever
/// contributes internal entity definitions. Some published XSLT files still
/// carry a DOCTYPE.
pub fn parsing_options() -> roxmltree::ParsingOptions {
    roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    }
}

/// Strip a leading byte order mark.
pub fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{FEFF}').unwrap_or(text)
}

/// The prefix an element was written with in the source text, if any.
pub fn element_prefix<'a, 'input>(node: roxmltree::Node<'a, 'input>) -> Option<&'input str> {
    let text = node.document().input_text();
    let raw = text.get(node.range().start..)?.strip_prefix('<')?;
    let end = raw
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .unwrap_or(raw.len());
    raw[..end].split_once(':').map(|(prefix, _)| prefix)
}

/// Get the qualified element name (prefix:local or just local).
pub fn qualified_name(node: roxmltree::Node<'_, '_>) -> String {
    match element_prefix(node) {
        Some(prefix) => format!("{}:{}", prefix, node.tag_name().name()),
        None => node.tag_name().name().to_owned(),
    }
}

/// Qualified name of an attribute as it must be written back out.
///
/// roxmltree resolves attribute prefixes away, so the prefix is recovered from
/// the non-default namespace bindings in scope at the owning element.
pub fn attribute_qname(node: roxmltree::Node<'_, '_>, attr: &roxmltree::Attribute<'_, '_>) -> String {
    match attr.namespace() {
        None => attr.name().to_owned(),
        Some(xdc_core::ns::XML) => format!("xml:{}", attr.name()),
        Some(uri) => match node
            .namespaces()
            .find(|ns| ns.name().is_some() && ns.uri() == uri)
            .and_then(|ns| ns.name())
        {
            Some(prefix) => format!("{}:{}", prefix, attr.name()),
            None => attr.name().to_owned(),
        },
    }
}

/// All namespace bindings in scope at an element, keyed by prefix
/// (`""` for the default namespace). The `xml` binding is never included and
/// an undeclared default namespace is absent from the map.
pub fn inscope_namespaces(node: roxmltree::Node<'_, '_>) -> BTreeMap<String, String> {
    let mut levels = Vec::new();
    let mut current = Some(node);
    while let Some(n) = current {
        if n.is_element() {
            levels.push(n);
        }
        current = n.parent();
    }

    let mut result = BTreeMap::new();
    for level in levels.into_iter().rev() {
        for ns in level.namespaces() {
            let prefix = ns.name().unwrap_or("");
            if prefix == "xml" {
                continue;
            }
            if ns.uri().is_empty() {
                result.remove(prefix);
            } else {
                result.insert(prefix.to_owned(), ns.uri().to_owned());
            }
        }
    }
    result
}

/// Look up an attribute by local name, ignoring its namespace.
///
/// Manifests are published both with `manifest:`-prefixed and plain
/// attribute names.
pub fn attribute_local<'a>(node: roxmltree::Node<'a, '_>, local_name: &str) -> Option<&'a str> {
    node.attributes()
        .find(|a| a.name() == local_name)
        .map(|a| a.value())
}

/// The default namespace in scope at `node` (the effective `xmlns`).
pub fn default_namespace(node: roxmltree::Node<'_, '_>) -> Option<String> {
    node.namespaces()
        .find(|ns| ns.name().is_none())
        .map(|ns| ns.uri().to_owned())
        .filter(|uri| !uri.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_prefix_from_source() {
        let xml = r#"<xsl:stylesheet xmlns:xsl="http://www.w3.org/1999/XSL/Transform"><xsl:output/></xsl:stylesheet>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let root = doc.root_element();
        assert_eq!(element_prefix(root), Some("xsl"));
        assert_eq!(qualified_name(root), "xsl:stylesheet");
        let child = root.first_element_child().unwrap();
        assert_eq!(qualified_name(child), "xsl:output");
    }

    #[test]
    fn test_unprefixed_element() {
        let doc = roxmltree::Document::parse(r#"<root xmlns="urn:a"/>"#).unwrap();
        assert_eq!(element_prefix(doc.root_element()), None);
        assert_eq!(default_namespace(doc.root_element()).as_deref(), Some("urn:a"));
    }

    #[test]
    fn test_attribute_local_ignores_prefix() {
        let xml = r#"<m:file-entry xmlns:m="urn:m" m:full-path="form.sb.xslt" media-type="text/xsl"/>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let node = doc.root_element();
        assert_eq!(attribute_local(node, "full-path"), Some("form.sb.xslt"));
        assert_eq!(attribute_local(node, "media-type"), Some("text/xsl"));
        assert_eq!(attribute_local(node, "language"), None);
    }

    #[test]
    fn test_attribute_qname_recovers_prefix() {
        let xml = r#"<f xmlns="urn:form" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="urn:form form.xsd" xml:lang="sk" id="1"/>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let node = doc.root_element();
        let names: Vec<String> = node
            .attributes()
            .map(|a| attribute_qname(node, &a))
            .collect();
        assert_eq!(names, vec!["xsi:schemaLocation", "xml:lang", "id"]);
    }

    #[test]
    fn test_inscope_namespaces_merges_ancestors() {
        let xml = r#"<a xmlns="urn:a" xmlns:p="urn:p"><b xmlns:q="urn:q"><c xmlns=""/></b></a>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let c = doc.descendants().find(|n| n.has_tag_name("c")).unwrap();
        let b = c.parent().unwrap();
        let at_b = inscope_namespaces(b);
        assert_eq!(at_b.get("").map(String::as_str), Some("urn:a"));
        assert_eq!(at_b.get("q").map(String::as_str), Some("urn:q"));
        assert!(!at_b.contains_key("xml"));
        let at_c = inscope_namespaces(c);
        assert!(!at_c.contains_key(""));
        assert_eq!(at_c.get("p").map(String::as_str), Some("urn:p"));
    }

    #[test]
    fn test_strip_bom() {
        assert_eq!(strip_bom("\u{FEFF}<a/>"), "<a/>");
        assert_eq!(strip_bom("<a/>"), "<a/>");
    }
}
