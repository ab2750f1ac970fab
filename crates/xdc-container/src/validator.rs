#![forbid(unsafe_code)]

//! XML DataContainer digest validation.
//!
//! A reference digest is recomputed under the reference's own
//! `TransformAlgorithm` and `DigestMethod`; the validator's defaults apply
//! only where the container leaves them out.

use tracing::debug;
use xdc_core::{algorithm, ns, Error};
use xdc_crypto::DigestAlgorithm;
use xdc_eforms::xdc;
use xdc_xml::{document, XmlElement};

/// Checks an XDC against a schema and a transformation.
#[derive(Debug, Clone)]
pub struct XdcValidator {
    xdc: String,
    canonicalization: String,
    digest_algorithm: DigestAlgorithm,
}

impl XdcValidator {
    /// Validator for `xdc`, which must be well-formed XML.
    pub fn new(xdc: impl Into<String>) -> Result<Self, Error> {
        let xdc = xdc.into();
        let xdc = match xdc.strip_prefix('\u{FEFF}') {
            Some(rest) => rest.to_owned(),
            None => xdc,
        };
        roxmltree::Document::parse_with_options(&xdc, xdc_xml::parsing_options())
            .map_err(|e| Error::XmlParse(e.to_string()))?;
        Ok(Self {
            xdc,
            canonicalization: algorithm::C14N.to_owned(),
            digest_algorithm: DigestAlgorithm::default(),
        })
    }

    /// Canonicalization and digest used when a reference does not name them.
    pub fn with_defaults(
        mut self,
        canonicalization: impl Into<String>,
        digest_algorithm: DigestAlgorithm,
    ) -> Self {
        self.canonicalization = canonicalization.into();
        self.digest_algorithm = digest_algorithm;
        self
    }

    pub fn validate_xsd_digest(&self, schema: &str) -> Result<bool, Error> {
        Ok(self.check(ns::node::USED_XSD_REFERENCE, schema)?.is_none())
    }

    pub fn validate_xslt_digest(&self, transformation: &str) -> Result<bool, Error> {
        Ok(self
            .check(ns::node::USED_PRESENTATION_SCHEMA_REFERENCE, transformation)?
            .is_none())
    }

    /// Validate both references, failing with [`Error::DigestMismatch`] for
    /// the first one that does not match.
    pub fn validate(&self, schema: &str, transformation: &str) -> Result<(), Error> {
        for (reference, content) in [
            (ns::node::USED_XSD_REFERENCE, schema),
            (ns::node::USED_PRESENTATION_SCHEMA_REFERENCE, transformation),
        ] {
            if let Some(err) = self.check(reference, content)? {
                return Err(err);
            }
        }
        Ok(())
    }

    /// The wrapped eForm, serialized on its own.
    pub fn eform_content(&self) -> Result<String, Error> {
        let doc = self.parse()?;
        let xml_data = xdc::find(&doc, ns::node::XML_DATA)
            .ok_or_else(|| Error::MissingElement("XMLData not found in XDC".into()))?;
        let root = document::sole_element_child(xml_data)
            .ok_or_else(|| Error::XmlStructure("XMLData must hold exactly one element".into()))?;
        Ok(XmlElement::from_node(root).to_xml_string())
    }

    /// Recompute one reference digest. `Some` describes a mismatch.
    fn check(&self, local_name: &str, content: &str) -> Result<Option<Error>, Error> {
        let doc = self.parse()?;
        let reference = xdc::reference(&doc, local_name)?;
        let canonicalization = reference
            .transform_algorithm
            .as_deref()
            .unwrap_or(&self.canonicalization);
        let digest_algorithm = match reference.digest_method.as_deref() {
            Some(method) => DigestAlgorithm::parse(method)?,
            None => self.digest_algorithm,
        };
        // Content that no longer parses cannot match; only the container's
        // own reference can make this an error.
        let actual = match xdc_crypto::compute_digest(content.as_bytes(), canonicalization, digest_algorithm) {
            Ok(actual) => actual,
            Err(e @ (Error::XmlParse(_) | Error::Canonicalization(_))) => {
                debug!(reference = local_name, error = %e, "content does not canonicalize");
                String::new()
            }
            Err(e) => return Err(e),
        };
        if actual == reference.digest_value {
            debug!(reference = local_name, "digest matches");
            return Ok(None);
        }
        debug!(reference = local_name, expected = %reference.digest_value, %actual, "digest mismatch");
        Ok(Some(Error::DigestMismatch {
            reference: local_name.to_owned(),
            expected: reference.digest_value,
            actual,
        }))
    }

    fn parse(&self) -> Result<roxmltree::Document<'_>, Error> {
        roxmltree::Document::parse_with_options(&self.xdc, xdc_xml::parsing_options())
            .map_err(|e| Error::XmlParse(e.to_string()))
    }
}

/// Structural check: an `XMLDataContainer` in the XDC namespace holding one
/// `XMLData` with a single element, and at most one `UsedSchemasReferenced`
/// or `UsedSchemasEmbedded`.
pub fn is_xdc(text: &str) -> bool {
    let Ok(doc) =
        roxmltree::Document::parse_with_options(xdc_xml::strip_bom(text), xdc_xml::parsing_options())
    else {
        return false;
    };
    let root = doc.root_element();
    if !root.has_tag_name((ns::XDC, ns::node::XML_DATA_CONTAINER)) {
        return false;
    }

    let mut xml_data = 0;
    let mut used_schemas = 0;
    for child in root.children() {
        if child.is_text() && !child.text().unwrap_or("").trim().is_empty() {
            return false;
        }
        if !child.is_element() {
            continue;
        }
        if child.tag_name().namespace() != Some(ns::XDC) {
            return false;
        }
        match child.tag_name().name() {
            ns::node::XML_DATA if document::sole_element_child(child).is_some() => xml_data += 1,
            ns::node::USED_SCHEMAS_REFERENCED | ns::node::USED_SCHEMAS_EMBEDDED => used_schemas += 1,
            _ => return false,
        }
    }
    xml_data == 1 && used_schemas <= 1
}
