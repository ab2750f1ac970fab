#![forbid(unsafe_code)]

//! Reading an existing XML DataContainer.
//!
//! Shared by the resolver (to recover the form URI, expected digests and
//! selection hints) and by the container validator.

use xdc_core::{ns, Error};
use xdc_xml::{document, XmlDocument, XmlElement};

use crate::authority;
use crate::params::{DestinationType, XsltParams};

/// Whether the document element is an `XMLDataContainer`.
pub fn is_xdc_root(doc: &roxmltree::Document<'_>) -> bool {
    doc.root_element().tag_name().name() == ns::node::XML_DATA_CONTAINER
}

/// First XDC-namespaced element with the given local name.
pub fn find<'a, 'input>(
    doc: &'a roxmltree::Document<'input>,
    local_name: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    XmlDocument::find_element(doc, ns::XDC, local_name)
}

/// A `UsedXSDReference` or `UsedPresentationSchemaReference`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub digest_value: String,
    pub transform_algorithm: Option<String>,
    pub digest_method: Option<String>,
    /// Text content, the referenced resource's identifier.
    pub identifier: Option<String>,
}

/// Read a reference element.
///
/// A missing element is [`Error::MissingElement`]; an element without
/// attributes or without `DigestValue` is [`Error::MissingAttribute`].
pub fn reference(doc: &roxmltree::Document<'_>, local_name: &str) -> Result<Reference, Error> {
    let node = find(doc, local_name)
        .ok_or_else(|| Error::MissingElement(format!("{local_name} not found in XDC")))?;
    if node.attributes().next().is_none() {
        return Err(Error::MissingAttribute(format!(
            "attributes of {local_name} not found"
        )));
    }
    let digest_value = node
        .attribute(ns::attr::DIGEST_VALUE)
        .ok_or_else(|| Error::MissingAttribute(format!("DigestValue of {local_name} not found")))?;
    Ok(Reference {
        digest_value: digest_value.to_owned(),
        transform_algorithm: node.attribute(ns::attr::TRANSFORM_ALGORITHM).map(str::to_owned),
        digest_method: node.attribute(ns::attr::DIGEST_METHOD).map(str::to_owned),
        identifier: text_of(node),
    })
}

/// Selection hints recorded on `UsedPresentationSchemaReference`.
pub fn xslt_hints(doc: &roxmltree::Document<'_>) -> XsltParams {
    let Some(node) = find(doc, ns::node::USED_PRESENTATION_SCHEMA_REFERENCE) else {
        return XsltParams::default();
    };
    XsltParams {
        identifier: text_of(node),
        language: node.attribute(ns::attr::LANGUAGE).map(str::to_owned),
        destination_type: node
            .attribute(ns::attr::MEDIA_DESTINATION_TYPE_DESCRIPTION)
            .map(DestinationType::parse),
        target: node.attribute(ns::attr::TARGET_ENVIRONMENT).map(str::to_owned),
        media_type: node.attribute(ns::attr::CONTENT_TYPE).map(str::to_owned),
    }
}

pub fn xsd_identifier(doc: &roxmltree::Document<'_>) -> Option<String> {
    find(doc, ns::node::USED_XSD_REFERENCE).and_then(text_of)
}

/// The wrapped eForm root, the sole element child of `XMLData`.
pub fn eform_root<'a, 'input>(
    doc: &'a roxmltree::Document<'input>,
) -> Option<roxmltree::Node<'a, 'input>> {
    find(doc, ns::node::XML_DATA).and_then(document::sole_element_child)
}

/// Where a form says it comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormLocator {
    /// The URI used for classification.
    pub uri: Option<String>,
    /// Raw `xsi:schemaLocation` of the eForm root, if any.
    pub schema_location: Option<String>,
}

impl FormLocator {
    /// Locator of a bare eForm root: its default namespace, else the first
    /// token of `xsi:schemaLocation`.
    pub fn of_eform(root: roxmltree::Node<'_, '_>) -> Self {
        let schema_location = root
            .attribute((ns::XSI, ns::attr::SCHEMA_LOCATION))
            .map(str::to_owned);
        let uri = xdc_xml::default_namespace(root).or_else(|| {
            schema_location
                .as_deref()
                .and_then(|l| l.split_whitespace().next())
                .map(str::to_owned)
        });
        Self { uri, schema_location }
    }

    /// Locator of an XDC: `XMLData@Identifier`, else the wrapped form's own.
    pub fn of_xdc(doc: &roxmltree::Document<'_>) -> Self {
        let wrapped = eform_root(doc).map(Self::of_eform).unwrap_or_default();
        let identifier = find(doc, ns::node::XML_DATA)
            .and_then(|n| n.attribute(ns::attr::IDENTIFIER))
            .map(str::to_owned)
            .filter(|s| !s.trim().is_empty());
        Self {
            uri: identifier.or(wrapped.uri),
            schema_location: wrapped.schema_location,
        }
    }

    /// The schema URL of an ORSR form.
    pub fn orsr_url(&self) -> Option<String> {
        self.schema_location
            .as_deref()
            .filter(|l| l.starts_with(authority::ORSR_SCHEMA_LOCATION_PREFIX))
            .and_then(authority::uri_from_schema_location)
            .or_else(|| self.uri.as_deref().and_then(authority::uri_from_schema_location))
    }
}

/// Schema and transformation carried inside `UsedSchemasEmbedded`.
///
/// `None` unless both are present.
pub fn embedded_resources(doc: &roxmltree::Document<'_>) -> Option<(String, String)> {
    let serialize = |local: &str| {
        find(doc, local)
            .and_then(document::sole_element_child)
            .map(|n| XmlElement::from_node(n).to_xml_string())
    };
    Some((
        serialize(ns::node::USED_XSD_EMBEDDED)?,
        serialize(ns::node::USED_PRESENTATION_SCHEMA_EMBEDDED)?,
    ))
}

fn text_of(node: roxmltree::Node<'_, '_>) -> Option<String> {
    node.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
}
