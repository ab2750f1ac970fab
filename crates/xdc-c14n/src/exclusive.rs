#![forbid(unsafe_code)]

//! Exclusive Canonical XML 1.0 (exc-C14N).
//!
//! Algorithm URI: `http://www.w3.org/2001/10/xml-exc-c14n#`
//! With comments: `http://www.w3.org/2001/10/xml-exc-c14n#WithComments`
//!
//! Only "visibly utilized" namespace declarations are output: the prefix of
//! the element name, prefixes of its attributes, and prefixes listed in the
//! InclusiveNamespaces PrefixList (`#default` naming the default namespace).

use crate::render::{self, NsDecl};
use std::collections::{BTreeMap, BTreeSet};
use xdc_core::Error;

/// Canonicalize a document using Exclusive C14N 1.0.
pub fn canonicalize(
    doc: &roxmltree::Document<'_>,
    with_comments: bool,
    inclusive_prefixes: &[String],
) -> Result<Vec<u8>, Error> {
    let ctx = ExcC14nContext {
        with_comments,
        inclusive_prefixes: inclusive_prefixes
            .iter()
            .map(|p| if p == "#default" { String::new() } else { p.clone() })
            .collect(),
    };
    let mut output = Vec::new();
    for child in doc.root().children() {
        ctx.process_node(child, &mut output, &BTreeMap::new());
    }
    Ok(output)
}

struct ExcC14nContext {
    with_comments: bool,
    inclusive_prefixes: BTreeSet<String>,
}

impl ExcC14nContext {
    fn process_node(
        &self,
        node: roxmltree::Node<'_, '_>,
        output: &mut Vec<u8>,
        rendered_ns: &BTreeMap<String, String>,
    ) {
        if !node.is_element() {
            render::render_leaf(node, self.with_comments, output);
            return;
        }

        let attrs = render::sorted_attributes(node);

        let mut utilized: BTreeSet<String> = self.inclusive_prefixes.clone();
        utilized.insert(xdc_xml::element_prefix(node).unwrap_or("").to_owned());
        for attr in &attrs {
            if let Some(prefix) = attr.prefix() {
                utilized.insert(prefix.to_owned());
            }
        }

        let inscope = xdc_xml::inscope_namespaces(node);
        let mut ns_decls: Vec<NsDecl> = Vec::new();
        for prefix in utilized.iter().filter(|p| p.as_str() != "xml") {
            match inscope.get(prefix) {
                Some(uri) if rendered_ns.get(prefix) != Some(uri) => ns_decls.push(NsDecl {
                    prefix: prefix.clone(),
                    uri: uri.clone(),
                }),
                Some(_) => {}
                None if prefix.is_empty()
                    && rendered_ns.get("").is_some_and(|uri| !uri.is_empty()) =>
                {
                    ns_decls.push(NsDecl {
                        prefix: String::new(),
                        uri: String::new(),
                    });
                }
                None => {}
            }
        }
        ns_decls.sort();

        let elem_name = xdc_xml::qualified_name(node);
        output.push(b'<');
        output.extend_from_slice(elem_name.as_bytes());
        for decl in &ns_decls {
            decl.render(output);
        }
        for attr in &attrs {
            attr.render(output);
        }
        output.push(b'>');

        let mut child_rendered = rendered_ns.clone();
        for decl in ns_decls {
            child_rendered.insert(decl.prefix, decl.uri);
        }
        for child in node.children() {
            self.process_node(child, output, &child_rendered);
        }

        output.extend_from_slice(b"</");
        output.extend_from_slice(elem_name.as_bytes());
        output.push(b'>');
    }
}
