#![forbid(unsafe_code)]

//! Output sniffing for XSLT transformations.
//!
//! Only the first `xsl:output` element is consulted. The stylesheet is never
//! executed.

use xdc_core::{ns, Error};
use xdc_xml::XmlDocument;

use crate::params::DestinationType;

/// Destination type a transformation produces, from its `xsl:output method`.
pub fn output_destination_type(xslt: &str) -> Result<DestinationType, Error> {
    let doc = roxmltree::Document::parse_with_options(
        xdc_xml::strip_bom(xslt),
        xdc_xml::parsing_options(),
    )
    .map_err(|e| Error::MalformedResource(format!("unparseable transformation: {e}")))?;

    let output = XmlDocument::find_element(&doc, ns::XSLT, ns::node::XSL_OUTPUT)
        .ok_or_else(|| Error::MalformedResource("transformation has no xsl:output".into()))?;
    let method = output
        .attribute(ns::attr::METHOD)
        .ok_or_else(|| Error::MalformedResource("xsl:output has no method".into()))?;

    match method.trim() {
        "html" => Ok(DestinationType::Html),
        "text" => Ok(DestinationType::Txt),
        "xml" if declares_xhtml(output) => Ok(DestinationType::Xhtml),
        other => Err(Error::MalformedResource(format!(
            "unsupported xsl:output method {other:?}"
        ))),
    }
}

fn declares_xhtml(output: roxmltree::Node<'_, '_>) -> bool {
    [ns::attr::DOCTYPE_PUBLIC, ns::attr::DOCTYPE_SYSTEM]
        .iter()
        .filter_map(|name| output.attribute(*name))
        .any(|value| value.to_ascii_lowercase().contains("xhtml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stylesheet(output: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  {output}
  <xsl:template match="/"><xsl:value-of select="."/></xsl:template>
</xsl:stylesheet>"#
        )
    }

    #[test]
    fn test_methods() {
        assert_eq!(
            output_destination_type(&stylesheet(r#"<xsl:output method="html"/>"#)).unwrap(),
            DestinationType::Html
        );
        assert_eq!(
            output_destination_type(&stylesheet(r#"<xsl:output method="text" encoding="UTF-8"/>"#))
                .unwrap(),
            DestinationType::Txt
        );
        assert_eq!(
            output_destination_type(&stylesheet(
                r#"<xsl:output method="xml" doctype-public="-//W3C//DTD XHTML 1.0 Strict//EN" doctype-system="http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd"/>"#
            ))
            .unwrap(),
            DestinationType::Xhtml
        );
    }

    #[test]
    fn test_uses_first_output() {
        let xslt = stylesheet(r#"<xsl:output method="text"/><xsl:output method="html"/>"#);
        assert_eq!(output_destination_type(&xslt).unwrap(), DestinationType::Txt);
    }

    #[test]
    fn test_malformed() {
        for xslt in [
            stylesheet(""),
            stylesheet(r#"<xsl:output encoding="UTF-8"/>"#),
            stylesheet(r#"<xsl:output method="xml"/>"#),
            "<xsl:stylesheet".to_owned(),
        ] {
            let err = output_destination_type(&xslt).unwrap_err();
            assert!(matches!(err, Error::MalformedResource(_)), "{err}");
        }
    }

    #[test]
    fn test_output_in_other_namespace_is_ignored() {
        let xslt = r#"<xsl:stylesheet xmlns:xsl="http://www.w3.org/1999/XSL/Transform" xmlns:o="urn:other"><o:output method="html"/></xsl:stylesheet>"#;
        assert!(output_destination_type(xslt).is_err());
    }
}
