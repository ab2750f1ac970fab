#![forbid(unsafe_code)]

//! XML DataContainer construction.
//!
//! The container is assembled as a fresh [`XmlElement`] tree around a deep
//! copy of the eForm root; the input document is never modified.
//!
//! ```text
//! XMLDataContainer
//! ├── XMLData (ContentType, Identifier, Version)
//! │   └── <eForm root>
//! └── UsedSchemasReferenced
//!     ├── UsedXSDReference (TransformAlgorithm, DigestMethod, DigestValue)
//!     └── UsedPresentationSchemaReference (... ContentType, Language, ...)
//! ```

use tracing::debug;
use xdc_core::{algorithm, ns, Error};
use xdc_crypto::DigestAlgorithm;
use xdc_eforms::{EFormAttributes, SigningParameters, XsltParams};
use xdc_xml::XmlElement;

/// File extension of XML DataContainer documents.
pub const XDC_EXTENSION: &str = "xdcf";

const DEFAULT_VERSION: &str = "1.0";

/// Wraps eForms into XML DataContainers.
#[derive(Debug, Clone)]
pub struct XdcBuilder {
    canonicalization: String,
    digest_algorithm: DigestAlgorithm,
    idempotent: bool,
}

impl Default for XdcBuilder {
    fn default() -> Self {
        Self::new(algorithm::C14N, DigestAlgorithm::default())
    }
}

impl XdcBuilder {
    pub fn new(canonicalization: impl Into<String>, digest_algorithm: DigestAlgorithm) -> Self {
        Self {
            canonicalization: canonicalization.into(),
            digest_algorithm,
            idempotent: true,
        }
    }

    /// Builder using the request's canonicalization and digest algorithm.
    pub fn for_request(request: &SigningParameters) -> Self {
        Self::new(request.properties_canonicalization.clone(), request.digest_algorithm)
    }

    /// Whether an input that already is a container is returned unchanged
    /// (the default) or wrapped again.
    pub fn idempotent(mut self, idempotent: bool) -> Self {
        self.idempotent = idempotent;
        self
    }

    /// Wrap `eform_xml` into a container described by `attrs`.
    pub fn build(&self, eform_xml: &str, attrs: &EFormAttributes) -> Result<String, Error> {
        let text = xdc_xml::strip_bom(eform_xml);
        let doc = roxmltree::Document::parse_with_options(text, xdc_xml::parsing_options())
            .map_err(|e| Error::XmlParse(e.to_string()))?;
        let root = doc.root_element();

        if self.idempotent && root.tag_name().name() == ns::node::XML_DATA_CONTAINER {
            debug!("document already is an XML DataContainer");
            return Ok(eform_xml.to_owned());
        }

        let mut container = XmlElement::new(ns::node::XML_DATA_CONTAINER);
        if let Some(xmlns) = attrs.container_xmlns.as_deref() {
            container = container.with_namespace("", xmlns);
        }
        container = container
            .with_namespace("xsd", ns::XSD)
            .with_namespace("xsi", ns::XSI);

        let mut xml_data =
            XmlElement::new(ns::node::XML_DATA).with_attribute(ns::attr::CONTENT_TYPE, ns::mime::XML_UTF8);
        if !attrs.embed_used_schemas {
            let identifier = attrs
                .identifier
                .as_deref()
                .ok_or_else(|| Error::XmlStructure("XDC identifier is missing".into()))?;
            xml_data = xml_data
                .with_attribute(ns::attr::IDENTIFIER, identifier)
                .with_attribute(ns::attr::VERSION, identifier_version(identifier)?);
        }
        container = container.with_child(xml_data.with_child(XmlElement::from_node(root)));

        let used_schemas = if attrs.embed_used_schemas {
            self.used_schemas_embedded(attrs)?
        } else {
            let form_namespace = xdc_xml::default_namespace(root);
            self.used_schemas_referenced(attrs, form_namespace.as_deref())?
        };
        Ok(container.with_child(used_schemas).to_document_string())
    }

    fn used_schemas_referenced(
        &self,
        attrs: &EFormAttributes,
        form_namespace: Option<&str>,
    ) -> Result<XmlElement, Error> {
        let mut element = XmlElement::new(ns::node::USED_SCHEMAS_REFERENCED);

        if let Some(schema) = attrs.schema.as_deref() {
            let identifier = attrs
                .xsd_identifier
                .clone()
                .or_else(|| form_namespace.map(|ns| join(ns, "form.xsd")));
            let reference = self.reference(ns::node::USED_XSD_REFERENCE, schema)?;
            element = element.with_child(with_text(reference, identifier));
        }

        if let Some(transformation) = attrs.transformation.as_deref() {
            let identifier = attrs
                .xslt_params
                .identifier
                .clone()
                .or_else(|| form_namespace.map(|ns| join(ns, "form.xslt")));
            let reference = self.reference(ns::node::USED_PRESENTATION_SCHEMA_REFERENCE, transformation)?;
            element = element.with_child(with_text(
                with_xslt_params(reference, &attrs.xslt_params),
                identifier,
            ));
        }

        Ok(element)
    }

    fn used_schemas_embedded(&self, attrs: &EFormAttributes) -> Result<XmlElement, Error> {
        let mut element = XmlElement::new(ns::node::USED_SCHEMAS_EMBEDDED);

        if let Some(schema) = attrs.schema.as_deref() {
            element = element
                .with_child(XmlElement::new(ns::node::USED_XSD_EMBEDDED).with_child(parse_root(schema)?));
        }
        if let Some(transformation) = attrs.transformation.as_deref() {
            let embedded = with_xslt_params(
                XmlElement::new(ns::node::USED_PRESENTATION_SCHEMA_EMBEDDED),
                &attrs.xslt_params,
            );
            element = element.with_child(embedded.with_child(parse_root(transformation)?));
        }

        Ok(element)
    }

    fn reference(&self, name: &str, content: &str) -> Result<XmlElement, Error> {
        let digest =
            xdc_crypto::compute_digest(content.as_bytes(), &self.canonicalization, self.digest_algorithm)?;
        Ok(XmlElement::new(name)
            .with_attribute(ns::attr::TRANSFORM_ALGORITHM, self.canonicalization.as_str())
            .with_attribute(ns::attr::DIGEST_METHOD, self.digest_algorithm.urn_oid())
            .with_attribute(ns::attr::DIGEST_VALUE, digest))
    }
}

fn with_xslt_params(element: XmlElement, params: &XsltParams) -> XmlElement {
    let destination_type = params.destination_type.as_ref().map(|dt| dt.as_str());
    element
        .with_optional_attribute(ns::attr::CONTENT_TYPE, params.media_type.as_deref())
        .with_optional_attribute(ns::attr::MEDIA_DESTINATION_TYPE_DESCRIPTION, destination_type)
        .with_optional_attribute(ns::attr::LANGUAGE, params.language.as_deref())
        .with_optional_attribute(ns::attr::TARGET_ENVIRONMENT, params.target.as_deref())
}

fn with_text(element: XmlElement, text: Option<String>) -> XmlElement {
    match text {
        Some(text) => element.with_text(text),
        None => element,
    }
}

fn parse_root(xml: &str) -> Result<XmlElement, Error> {
    let doc = roxmltree::Document::parse_with_options(xdc_xml::strip_bom(xml), xdc_xml::parsing_options())
        .map_err(|e| Error::XmlParse(e.to_string()))?;
    Ok(XmlElement::from_node(doc.root_element()))
}

/// `Version` of an identifier: its last path segment when that looks like a
/// version (`[v0-9.]+`), `1.0` otherwise.
fn identifier_version(identifier: &str) -> Result<&str, Error> {
    let (_, last) = identifier.rsplit_once('/').ok_or_else(|| {
        Error::XmlStructure(format!("XDC identifier has no slash: {identifier}"))
    })?;
    let is_version = !last.is_empty() && last.chars().all(|c| c == 'v' || c == '.' || c.is_ascii_digit());
    Ok(if is_version { last } else { DEFAULT_VERSION })
}

fn join(base: &str, file: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), file)
}

/// File name for the container of `name`: `.xml` becomes `.xdcf`, names
/// without the extension get it appended.
pub fn xdc_file_name(name: &str) -> String {
    let extension = format!(".{XDC_EXTENSION}");
    if !name.contains('.') {
        format!("{name}{extension}")
    } else if let Some(stem) = name.strip_suffix(".xml") {
        format!("{stem}{extension}")
    } else if !name.contains(&extension) {
        format!("{name}{extension}")
    } else {
        name.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xdc_eforms::DestinationType;

    const FORM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<GeneralAgenda xmlns="http://schemas.gov.sk/form/App.GeneralAgenda/1.9"><subject>Test</subject><text>Hello</text></GeneralAgenda>"#;
    const SCHEMA: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"><xs:element name="GeneralAgenda"/></xs:schema>"#;
    const XSLT: &str = r#"<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform"><xsl:output method="text"/></xsl:stylesheet>"#;

    fn attrs() -> EFormAttributes {
        EFormAttributes {
            identifier: Some("http://data.gov.sk/doc/eform/App.GeneralAgenda/1.9".into()),
            transformation: Some(XSLT.into()),
            schema: Some(SCHEMA.into()),
            container_xmlns: Some(ns::XDC.into()),
            xsd_identifier: Some("http://schemas.gov.sk/form/App.GeneralAgenda/1.9/form.xsd".into()),
            xslt_params: XsltParams {
                identifier: Some("http://schemas.gov.sk/form/App.GeneralAgenda/1.9/form.xslt".into()),
                language: Some("sk".into()),
                destination_type: Some(DestinationType::Txt),
                target: None,
                media_type: Some(ns::mime::XSLT.into()),
            },
            embed_used_schemas: false,
        }
    }

    #[test]
    fn test_build_referenced() {
        let out = XdcBuilder::default().build(FORM, &attrs()).unwrap();
        assert!(out.starts_with(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#));

        let doc = roxmltree::Document::parse(&out).unwrap();
        let root = doc.root_element();
        assert_eq!(root.tag_name().namespace(), Some(ns::XDC));
        assert_eq!(root.lookup_namespace_uri(Some("xsi")), Some(ns::XSI));

        let xml_data = root.first_element_child().unwrap();
        assert_eq!(xml_data.attribute("ContentType"), Some("application/xml; charset=UTF-8"));
        assert_eq!(xml_data.attribute("Version"), Some("1.9"));
        let form = xml_data.first_element_child().unwrap();
        assert_eq!(form.tag_name().namespace(), Some("http://schemas.gov.sk/form/App.GeneralAgenda/1.9"));
        let subject = form.first_element_child().unwrap();
        assert_eq!(subject.tag_name().namespace(), Some("http://schemas.gov.sk/form/App.GeneralAgenda/1.9"));

        let xsd = xdc_xml::XmlDocument::find_element(&doc, ns::XDC, "UsedXSDReference").unwrap();
        assert_eq!(xsd.attribute("DigestMethod"), Some("urn:oid:2.16.840.1.101.3.4.2.1"));
        assert_eq!(
            xsd.attribute("DigestValue").unwrap(),
            xdc_crypto::compute_digest(SCHEMA.as_bytes(), algorithm::C14N, DigestAlgorithm::Sha256).unwrap()
        );
        let xslt = xdc_xml::XmlDocument::find_element(&doc, ns::XDC, "UsedPresentationSchemaReference").unwrap();
        assert_eq!(xslt.attribute("MediaDestinationTypeDescription"), Some("TXT"));
        assert_eq!(xslt.attribute("Language"), Some("sk"));
        assert_eq!(xslt.attribute("TargetEnvironment"), None);
        assert_eq!(
            xslt.text(),
            Some("http://schemas.gov.sk/form/App.GeneralAgenda/1.9/form.xslt")
        );
    }

    #[test]
    fn test_idempotent() {
        let builder = XdcBuilder::default();
        let once = builder.build(FORM, &attrs()).unwrap();
        let twice = builder.build(&once, &attrs()).unwrap();
        assert_eq!(once, twice);

        let wrapped_again = builder.clone().idempotent(false).build(&once, &attrs()).unwrap();
        let doc = roxmltree::Document::parse(&wrapped_again).unwrap();
        let containers = doc
            .descendants()
            .filter(|n| n.has_tag_name((ns::XDC, "XMLDataContainer")))
            .count();
        assert_eq!(containers, 2);
    }

    #[test]
    fn test_reference_text_falls_back_to_form_namespace() {
        let mut attrs = attrs();
        attrs.xsd_identifier = None;
        attrs.xslt_params.identifier = None;
        let out = XdcBuilder::default().build(FORM, &attrs).unwrap();
        assert!(out.contains(">http://schemas.gov.sk/form/App.GeneralAgenda/1.9/form.xsd</UsedXSDReference>"));
        assert!(out.contains(">http://schemas.gov.sk/form/App.GeneralAgenda/1.9/form.xslt</UsedPresentationSchemaReference>"));
    }

    #[test]
    fn test_form_without_namespace_stays_unqualified() {
        let out = XdcBuilder::default().build("<form><a>1</a></form>", &attrs()).unwrap();
        let doc = roxmltree::Document::parse(&out).unwrap();
        let form = doc.descendants().find(|n| n.has_tag_name("form")).unwrap();
        // `xmlns=""` undeclares the container's default namespace.
        assert!(out.contains(r#"<form xmlns=""><a>1</a></form>"#));
        assert!(form.tag_name().namespace().map_or(true, str::is_empty));
        let a = form.first_element_child().unwrap();
        assert!(a.tag_name().namespace().map_or(true, str::is_empty));
    }

    #[test]
    fn test_identifier_without_slash() {
        let mut attrs = attrs();
        attrs.identifier = Some("GeneralAgenda".into());
        let err = XdcBuilder::default().build(FORM, &attrs).unwrap_err();
        assert!(matches!(err, Error::XmlStructure(_)));
    }

    #[test]
    fn test_identifier_version() {
        assert_eq!(identifier_version("http://a/b/1.9").unwrap(), "1.9");
        assert_eq!(identifier_version("http://a/b/v2.0").unwrap(), "v2.0");
        assert_eq!(identifier_version("http://a/b/latest").unwrap(), "1.0");
        assert_eq!(identifier_version("http://a/b/").unwrap(), "1.0");
    }

    #[test]
    fn test_build_embedded() {
        let mut attrs = attrs();
        attrs.embed_used_schemas = true;
        attrs.identifier = None;
        let out = XdcBuilder::default().build(FORM, &attrs).unwrap();
        let doc = roxmltree::Document::parse(&out).unwrap();
        let xml_data = xdc_xml::XmlDocument::find_element(&doc, ns::XDC, "XMLData").unwrap();
        assert_eq!(xml_data.attribute("Identifier"), None);
        let embedded = xdc_xml::XmlDocument::find_element(&doc, ns::XDC, "UsedXSDEmbedded").unwrap();
        let schema = embedded.first_element_child().unwrap();
        assert!(schema.has_tag_name((ns::XSD, "schema")));
        assert!(xdc_xml::XmlDocument::find_element(&doc, ns::XDC, "UsedSchemasReferenced").is_none());
    }

    #[test]
    fn test_xdc_file_name() {
        assert_eq!(xdc_file_name("form"), "form.xdcf");
        assert_eq!(xdc_file_name("form.xml"), "form.xdcf");
        assert_eq!(xdc_file_name("form.txt"), "form.txt.xdcf");
        assert_eq!(xdc_file_name("form.xdcf"), "form.xdcf");
    }
}
