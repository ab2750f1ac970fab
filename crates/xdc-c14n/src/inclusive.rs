#![forbid(unsafe_code)]

//! Inclusive Canonical XML 1.0 (C14N 1.0).
//!
//! Algorithm URI: `http://www.w3.org/TR/2001/REC-xml-c14n-20010315`
//! With comments: `http://www.w3.org/TR/2001/REC-xml-c14n-20010315#WithComments`
//!
//! The canonical form:
//! - Outputs namespace declarations sorted by prefix (default first)
//! - Outputs attributes sorted by (namespace-URI, local-name)
//! - Escapes text and attribute values per C14N rules
//! - Optionally preserves or strips comments
//!
//! Only whole documents are canonicalized; XDC digests always cover the
//! complete schema or transformation file.

use crate::render::{self, NsDecl};
use std::collections::BTreeMap;
use xdc_core::Error;

/// Canonicalize a document using Inclusive C14N 1.0.
pub fn canonicalize(doc: &roxmltree::Document<'_>, with_comments: bool) -> Result<Vec<u8>, Error> {
    let mut output = Vec::new();
    for child in doc.root().children() {
        process_node(child, with_comments, &mut output, &BTreeMap::new());
    }
    Ok(output)
}

fn process_node(
    node: roxmltree::Node<'_, '_>,
    with_comments: bool,
    output: &mut Vec<u8>,
    inherited_ns: &BTreeMap<String, String>,
) {
    if !node.is_element() {
        render::render_leaf(node, with_comments, output);
        return;
    }

    let current_ns = xdc_xml::inscope_namespaces(node);

    // A declaration is output when it is new or differs from the parent's.
    let mut ns_decls: Vec<NsDecl> = current_ns
        .iter()
        .filter(|(prefix, uri)| inherited_ns.get(*prefix) != Some(*uri))
        .map(|(prefix, uri)| NsDecl {
            prefix: prefix.clone(),
            uri: uri.clone(),
        })
        .collect();
    if inherited_ns.contains_key("") && !current_ns.contains_key("") {
        ns_decls.push(NsDecl {
            prefix: String::new(),
            uri: String::new(),
        });
    }
    ns_decls.sort();

    let elem_name = xdc_xml::qualified_name(node);
    output.push(b'<');
    output.extend_from_slice(elem_name.as_bytes());
    for decl in &ns_decls {
        decl.render(output);
    }
    for attr in render::sorted_attributes(node) {
        attr.render(output);
    }
    output.push(b'>');

    for child in node.children() {
        process_node(child, with_comments, output, &current_ns);
    }

    output.extend_from_slice(b"</");
    output.extend_from_slice(elem_name.as_bytes());
    output.push(b'>');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c14n(xml: &str, with_comments: bool) -> String {
        let doc = roxmltree::Document::parse(xml).unwrap();
        String::from_utf8(canonicalize(&doc, with_comments).unwrap()).unwrap()
    }

    #[test]
    fn test_simple_c14n() {
        // Attributes sorted, empty elements expanded.
        assert_eq!(
            c14n(r#"<root><a b="1" a="2"/></root>"#, false),
            r#"<root><a a="2" b="1"></a></root>"#
        );
    }

    #[test]
    fn test_namespaces_not_repeated() {
        let xml = r#"<root xmlns:b="http://b" xmlns:a="http://a"><a:child xmlns:a="http://a"/></root>"#;
        assert_eq!(
            c14n(xml, false),
            r#"<root xmlns:a="http://a" xmlns:b="http://b"><a:child></a:child></root>"#
        );
    }

    #[test]
    fn test_default_namespace_undeclared() {
        let xml = r#"<a xmlns="urn:a"><b xmlns=""/></a>"#;
        assert_eq!(c14n(xml, false), r#"<a xmlns="urn:a"><b xmlns=""></b></a>"#);
        // A redundant xmlns="" is dropped.
        assert_eq!(c14n(r#"<a><b xmlns=""/></a>"#, false), "<a><b></b></a>");
    }

    #[test]
    fn test_comments_and_pis() {
        let xml = "<?xml version=\"1.0\"?>\n<!--head--><doc><!--in--><?p x?></doc><!--tail-->";
        assert_eq!(c14n(xml, false), "<doc><?p x?></doc>");
        assert_eq!(
            c14n(xml, true),
            "<!--head-->\n<doc><!--in--><?p x?></doc>\n<!--tail-->"
        );
    }

    #[test]
    fn test_text_escaping() {
        assert_eq!(
            c14n(r#"<root a="x&#10;y">a &amp; b &lt; c &gt; d</root>"#, false),
            r#"<root a="x&#xA;y">a &amp; b &lt; c &gt; d</root>"#
        );
    }
}
