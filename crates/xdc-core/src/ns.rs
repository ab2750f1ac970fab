#![forbid(unsafe_code)]

//! XML namespace constants used across the workspace.

/// XML DataContainer 1.1 namespace
pub const XDC: &str = "http://data.gov.sk/def/container/xmldatacontainer+xml/1.1";

/// XML Schema namespace
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema";

/// XML Schema instance namespace
pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// XSLT namespace
pub const XSLT: &str = "http://www.w3.org/1999/XSL/Transform";

/// Dublin Core elements namespace (FS `meta.xml`)
pub const DC: &str = "http://purl.org/dc/elements/1.1/";

/// OpenDocument manifest namespace
pub const MANIFEST: &str = "urn:oasis:names:tc:opendocument:xmlns:manifest:1.0";

/// XML namespace
pub const XML: &str = "http://www.w3.org/XML/1998/namespace";

// ── Element names ────────────────────────────────────────────────────

pub mod node {
    // XDC elements
    pub const XML_DATA_CONTAINER: &str = "XMLDataContainer";
    pub const XML_DATA: &str = "XMLData";
    pub const USED_SCHEMAS_REFERENCED: &str = "UsedSchemasReferenced";
    pub const USED_XSD_REFERENCE: &str = "UsedXSDReference";
    pub const USED_PRESENTATION_SCHEMA_REFERENCE: &str = "UsedPresentationSchemaReference";
    pub const USED_SCHEMAS_EMBEDDED: &str = "UsedSchemasEmbedded";
    pub const USED_XSD_EMBEDDED: &str = "UsedXSDEmbedded";
    pub const USED_PRESENTATION_SCHEMA_EMBEDDED: &str = "UsedPresentationSchemaEmbedded";

    // Manifest
    pub const FILE_ENTRY: &str = "file-entry";

    // XSLT
    pub const XSL_OUTPUT: &str = "output";

    // FS meta.xml
    pub const DC_IDENTIFIER: &str = "identifier";
    pub const XSD_IDENTIFIER: &str = "xsdIdentifier";
    pub const XSLT_IDENTIFIER: &str = "xsltIdentifier";
}

// ── Attribute names ──────────────────────────────────────────────────

pub mod attr {
    // XDC attributes
    pub const CONTENT_TYPE: &str = "ContentType";
    pub const IDENTIFIER: &str = "Identifier";
    pub const VERSION: &str = "Version";
    pub const TRANSFORM_ALGORITHM: &str = "TransformAlgorithm";
    pub const DIGEST_METHOD: &str = "DigestMethod";
    pub const DIGEST_VALUE: &str = "DigestValue";
    pub const MEDIA_DESTINATION_TYPE_DESCRIPTION: &str = "MediaDestinationTypeDescription";
    pub const LANGUAGE: &str = "Language";
    pub const TARGET_ENVIRONMENT: &str = "TargetEnvironment";
    pub const SCHEMA_LOCATION: &str = "schemaLocation";

    // Manifest attributes
    pub const FULL_PATH: &str = "full-path";
    pub const MEDIA_TYPE: &str = "media-type";
    pub const MEDIA_DESTINATION: &str = "media-destination";
    pub const MEDIA_LANGUAGE: &str = "media-language";
    pub const MEDIA_DESTINATION_TYPE: &str = "media-destination-type";
    pub const MEDIA_DESTINATION_TYPE_DESCRIPTION_MANIFEST: &str =
        "media-destination-type-description";
    pub const MANIFEST_TARGET_ENVIRONMENT: &str = "target-environment";

    // xsl:output attributes
    pub const METHOD: &str = "method";
    pub const DOCTYPE_PUBLIC: &str = "doctype-public";
    pub const DOCTYPE_SYSTEM: &str = "doctype-system";
}

// ── Media types ──────────────────────────────────────────────────────

pub mod mime {
    pub const XML_UTF8: &str = "application/xml; charset=UTF-8";
    pub const XSLT: &str = "application/xslt+xml";
    pub const TEXT_XSL: &str = "text/xsl";
    pub const TEXT_XML: &str = "text/xml";
    pub const APPLICATION_XML: &str = "application/xml";
    pub const TEXT_PLAIN: &str = "text/plain";
    pub const TEXT_HTML: &str = "text/html";
    pub const XHTML: &str = "application/xhtml+xml";
}
