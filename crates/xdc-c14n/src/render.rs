#![forbid(unsafe_code)]

//! Shared rendering for canonical output.

use xdc_xml::escape;

/// A namespace declaration to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NsDecl {
    /// The prefix ("" for default namespace).
    pub prefix: String,
    pub uri: String,
}

impl NsDecl {
    pub fn render(&self, out: &mut Vec<u8>) {
        if self.prefix.is_empty() {
            out.extend_from_slice(b" xmlns=\"");
        } else {
            out.extend_from_slice(b" xmlns:");
            out.extend_from_slice(self.prefix.as_bytes());
            out.extend_from_slice(b"=\"");
        }
        out.extend_from_slice(escape::escape_attr(&self.uri).as_bytes());
        out.push(b'"');
    }
}

impl Ord for NsDecl {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Default namespace sorts first, then by prefix.
        match (self.prefix.is_empty(), other.prefix.is_empty()) {
            (true, false) => std::cmp::Ordering::Less,
            (false, true) => std::cmp::Ordering::Greater,
            _ => self.prefix.cmp(&other.prefix),
        }
    }
}

impl PartialOrd for NsDecl {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// An attribute to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    /// Namespace URI ("" for no namespace).
    pub ns_uri: String,
    pub local_name: String,
    /// prefix:local or local
    pub qualified_name: String,
    pub value: String,
}

impl Attr {
    pub fn render(&self, out: &mut Vec<u8>) {
        out.push(b' ');
        out.extend_from_slice(self.qualified_name.as_bytes());
        out.extend_from_slice(b"=\"");
        out.extend_from_slice(escape::escape_attr(&self.value).as_bytes());
        out.push(b'"');
    }

    /// Prefix of the qualified name, `None` for unprefixed attributes.
    pub fn prefix(&self) -> Option<&str> {
        self.qualified_name.split_once(':').map(|(p, _)| p)
    }
}

impl Ord for Attr {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Unqualified attributes first, then by (namespace URI, local name).
        match (self.ns_uri.is_empty(), other.ns_uri.is_empty()) {
            (true, true) => self.local_name.cmp(&other.local_name),
            (true, false) => std::cmp::Ordering::Less,
            (false, true) => std::cmp::Ordering::Greater,
            (false, false) => self
                .ns_uri
                .cmp(&other.ns_uri)
                .then(self.local_name.cmp(&other.local_name)),
        }
    }
}

impl PartialOrd for Attr {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Attributes of an element in canonical order.
pub fn sorted_attributes(node: roxmltree::Node<'_, '_>) -> Vec<Attr> {
    let mut attrs: Vec<Attr> = node
        .attributes()
        .map(|a| Attr {
            ns_uri: a.namespace().unwrap_or("").to_owned(),
            local_name: a.name().to_owned(),
            qualified_name: xdc_xml::attribute_qname(node, &a),
            value: a.value().to_owned(),
        })
        .collect();
    attrs.sort();
    attrs
}

/// Render a text, comment or processing-instruction node.
///
/// Comments and PIs outside the document element are separated from it by a
/// single line feed.
pub fn render_leaf(node: roxmltree::Node<'_, '_>, with_comments: bool, out: &mut Vec<u8>) {
    match node.node_type() {
        roxmltree::NodeType::Text => {
            out.extend_from_slice(escape::escape_text(node.text().unwrap_or("")).as_bytes());
        }
        roxmltree::NodeType::Comment if with_comments => {
            with_document_spacing(node, out, |out| {
                out.extend_from_slice(b"<!--");
                out.extend_from_slice(node.text().unwrap_or("").as_bytes());
                out.extend_from_slice(b"-->");
            });
        }
        roxmltree::NodeType::PI => {
            if let Some(pi) = node.pi() {
                with_document_spacing(node, out, |out| {
                    out.extend_from_slice(b"<?");
                    out.extend_from_slice(pi.target.as_bytes());
                    if let Some(value) = pi.value.filter(|v| !v.is_empty()) {
                        out.push(b' ');
                        out.extend_from_slice(escape::escape_pi(value).as_bytes());
                    }
                    out.extend_from_slice(b"?>");
                });
            }
        }
        _ => {}
    }
}

fn with_document_spacing(
    node: roxmltree::Node<'_, '_>,
    out: &mut Vec<u8>,
    body: impl FnOnce(&mut Vec<u8>),
) {
    let at_root = node
        .parent()
        .is_some_and(|p| p.node_type() == roxmltree::NodeType::Root);
    if at_root && node.prev_siblings().any(|s| s.is_element()) {
        out.push(b'\n');
    }
    body(out);
    if at_root && node.next_siblings().any(|s| s.is_element()) {
        out.push(b'\n');
    }
}
