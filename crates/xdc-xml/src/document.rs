#![forbid(unsafe_code)]

//! Owned XML document over roxmltree with element lookup helpers.

use xdc_core::Error;

/// An owned XML document.  Stores the text only.
///
/// To work with the parsed tree, call [`XmlDocument::parse_doc`] which
/// returns a temporary `roxmltree::Document` borrowing from the text.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    text: String,
}

impl XmlDocument {
    /// Parse and validate XML from a string, taking ownership.
    ///
    /// A leading byte order mark is dropped.
    pub fn parse(text: String) -> Result<Self, Error> {
        let text = match text.strip_prefix('\u{FEFF}') {
            Some(rest) => rest.to_owned(),
            None => text,
        };
        roxmltree::Document::parse_with_options(&text, crate::parsing_options())
            .map_err(|e| Error::XmlParse(e.to_string()))?;
        Ok(Self { text })
    }

    /// Parse and validate XML from bytes.
    pub fn parse_bytes(data: &[u8]) -> Result<Self, Error> {
        let text = std::str::from_utf8(data)
            .map_err(|e| Error::XmlParse(format!("invalid UTF-8: {e}")))?
            .to_owned();
        Self::parse(text)
    }

    /// Get the raw XML text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consume the document and return its text.
    pub fn into_text(self) -> String {
        self.text
    }

    /// Parse the document and return a temporary `roxmltree::Document`.
    pub fn parse_doc(&self) -> Result<roxmltree::Document<'_>, Error> {
        roxmltree::Document::parse_with_options(&self.text, crate::parsing_options())
            .map_err(|e| Error::XmlParse(e.to_string()))
    }

    /// Local name of the document element.
    pub fn root_name(&self) -> Result<String, Error> {
        let doc = self.parse_doc()?;
        Ok(doc.root_element().tag_name().name().to_owned())
    }

    /// Find the first descendant element with the given local name and namespace.
    pub fn find_element<'a, 'input>(
        doc: &'a roxmltree::Document<'input>,
        ns: &str,
        local_name: &str,
    ) -> Option<roxmltree::Node<'a, 'input>> {
        doc.descendants().find(|n| is_element_named(n, ns, local_name))
    }

    /// Find all descendant elements with the given local name and namespace.
    pub fn find_elements<'a, 'input>(
        doc: &'a roxmltree::Document<'input>,
        ns: &str,
        local_name: &str,
    ) -> Vec<roxmltree::Node<'a, 'input>> {
        doc.descendants()
            .filter(|n| is_element_named(n, ns, local_name))
            .collect()
    }

    /// Find the first descendant element with the given local name, in any namespace.
    pub fn find_element_local<'a, 'input>(
        doc: &'a roxmltree::Document<'input>,
        local_name: &str,
    ) -> Option<roxmltree::Node<'a, 'input>> {
        doc.descendants()
            .find(|n| n.is_element() && n.tag_name().name() == local_name)
    }
}

/// Find the first child element with the given local name and namespace.
pub fn find_child_element<'a, 'input>(
    parent: roxmltree::Node<'a, 'input>,
    ns: &str,
    local_name: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    parent.children().find(|n| is_element_named(n, ns, local_name))
}

/// The only element child of `parent`, ignoring whitespace text and comments.
///
/// Returns `None` when there is no element child or when there is more than
/// one, or when non-whitespace text sits next to it.
pub fn sole_element_child<'a, 'input>(
    parent: roxmltree::Node<'a, 'input>,
) -> Option<roxmltree::Node<'a, 'input>> {
    let mut found = None;
    for child in parent.children() {
        if child.is_element() {
            if found.is_some() {
                return None;
            }
            found = Some(child);
        } else if child.is_text() && !child.text().unwrap_or("").trim().is_empty() {
            return None;
        }
    }
    found
}

fn is_element_named(node: &roxmltree::Node<'_, '_>, ns: &str, local_name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == local_name
        && node.tag_name().namespace().unwrap_or("") == ns
}
