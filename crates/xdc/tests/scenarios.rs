//! End-to-end scenarios over an in-memory form portal.

use xdc::core::ns;
use xdc::eforms::{DestinationType, FormAuthority};
use xdc::fetch::MemoryFetcher;
use xdc::{EFormPipeline, Error, SigningParameters, XdcBuilder, XdcValidator};

const UPVS_DIR: &str = "https://data.gov.sk/doc/egov/eform/App.GeneralAgenda/1.9";

const FORM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<GeneralAgenda xmlns="http://schemas.gov.sk/form/App.GeneralAgenda/1.9">
  <subject>Žiadosť o informácie</subject>
  <text>Dobrý deň</text>
</GeneralAgenda>"#;

const SCHEMA: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="http://schemas.gov.sk/form/App.GeneralAgenda/1.9" elementFormDefault="qualified">
  <xs:element name="GeneralAgenda">
    <xs:complexType><xs:sequence>
      <xs:element name="subject" type="xs:string"/>
      <xs:element name="text" type="xs:string"/>
    </xs:sequence></xs:complexType>
  </xs:element>
</xs:schema>"#;

fn stylesheet(method: &str, doctype: &str) -> String {
    format!(
        r#"<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform"><xsl:output method="{method}" {doctype}/><xsl:template match="/"><xsl:value-of select="."/></xsl:template></xsl:stylesheet>"#
    )
}

fn single_entry_portal() -> MemoryFetcher {
    let manifest = r#"<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0">
  <manifest:file-entry manifest:media-type="application/vnd.gov.sk.eform+xml" manifest:full-path="/"/>
  <manifest:file-entry manifest:media-type="application/xslt+xml" manifest:full-path="form.sb.xslt" media-destination="sign" media-destination-type-description="TXT" media-language="sk"/>
  <manifest:file-entry manifest:media-type="text/xml" manifest:full-path="schema.xsd"/>
</manifest:manifest>"#;
    MemoryFetcher::new()
        .with_resource(format!("{UPVS_DIR}/META-INF/manifest.xml"), manifest)
        .with_resource(format!("{UPVS_DIR}/form.sb.xslt"), stylesheet("text", ""))
        .with_resource(format!("{UPVS_DIR}/schema.xsd"), SCHEMA)
}

fn auto_load() -> SigningParameters {
    SigningParameters {
        auto_load_eform: true,
        ..SigningParameters::default()
    }
}

#[test]
fn scenario_a_raw_upvs_form_is_wrapped() {
    let fetcher = single_entry_portal();
    let pipeline = EFormPipeline::new(&fetcher);

    let set = pipeline.resolver().resolve(FORM, &auto_load()).unwrap();
    assert_eq!(set.authority, FormAuthority::Upvs);
    assert_eq!(set.identifier, "http://data.gov.sk/doc/eform/App.GeneralAgenda/1.9");
    assert!(fetcher
        .requests()
        .contains(&format!("{UPVS_DIR}/META-INF/manifest.xml")));

    let prepared = pipeline.prepare(FORM, &auto_load()).unwrap();
    assert!(xdc::container::is_xdc(&prepared.content));
    assert_eq!(
        prepared.attributes.identifier.as_deref(),
        Some("http://data.gov.sk/doc/eform/App.GeneralAgenda/1.9")
    );
    assert_eq!(
        prepared.attributes.xslt_params.destination_type,
        Some(DestinationType::Txt)
    );

    let validator = XdcValidator::new(prepared.content.clone()).unwrap();
    assert!(validator.validate_xsd_digest(SCHEMA).unwrap());
    assert!(validator.validate_xslt_digest(&stylesheet("text", "")).unwrap());
}

#[test]
fn scenario_b_tampered_schema_digest_is_rejected() {
    let pipeline = EFormPipeline::new(single_entry_portal());
    let xdc = pipeline.prepare(FORM, &auto_load()).unwrap().content;

    let start = xdc.find("<UsedXSDReference").unwrap();
    let value_at = start + xdc[start..].find("DigestValue=\"").unwrap() + "DigestValue=\"".len();
    let value_end = value_at + xdc[value_at..].find('"').unwrap();
    let tampered = format!("{}AAA={}", &xdc[..value_at], &xdc[value_end..]);

    let err = pipeline.prepare(&tampered, &auto_load()).unwrap_err();
    match &err {
        Error::DigestMismatch { reference, expected, .. } => {
            assert_eq!(reference, "UsedXSDReference");
            assert_eq!(expected, "AAA=");
        }
        other => panic!("expected digest mismatch, got {other}"),
    }
    assert_eq!(err.heading(), "XDC validation failed");
}

#[test]
fn scenario_c_unknown_form_fails_without_fetching() {
    let fetcher = MemoryFetcher::new();
    let pipeline = EFormPipeline::new(&fetcher);
    let err = pipeline
        .prepare(
            r#"<form xmlns="http://example.com/not-a-form"><a>1</a></form>"#,
            &auto_load(),
        )
        .unwrap_err();
    assert!(matches!(err, Error::UnknownFormFamily { .. }));
    assert!(!err.is_retryable());
    assert_eq!(fetcher.request_count(), 0);
}

#[test]
fn scenario_d_xhtml_transformation_is_preferred() {
    let manifest = r#"<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0">
  <manifest:file-entry manifest:media-type="application/xslt+xml" manifest:full-path="form.html.sb.xslt" media-destination="sign" media-destination-type-description="HTML" media-language="sk"/>
  <manifest:file-entry manifest:media-type="application/xslt+xml" manifest:full-path="form.txt.sb.xslt" media-destination="sign" media-destination-type-description="TXT" media-language="sk"/>
  <manifest:file-entry manifest:media-type="application/xslt+xml" manifest:full-path="form.xhtml.sb.xslt" media-destination="sign" media-language="sk"/>
</manifest:manifest>"#;
    let xhtml = stylesheet(
        "xml",
        r#"doctype-public="-//W3C//DTD XHTML 1.0 Strict//EN""#,
    );
    let fetcher = MemoryFetcher::new()
        .with_resource(format!("{UPVS_DIR}/META-INF/manifest.xml"), manifest)
        .with_resource(format!("{UPVS_DIR}/form.html.sb.xslt"), stylesheet("html", ""))
        .with_resource(format!("{UPVS_DIR}/form.txt.sb.xslt"), stylesheet("text", ""))
        .with_resource(format!("{UPVS_DIR}/form.xhtml.sb.xslt"), xhtml.clone())
        .with_resource(format!("{UPVS_DIR}/schema.xsd"), SCHEMA);
    let pipeline = EFormPipeline::new(fetcher);

    let set = pipeline.resolver().resolve(FORM, &auto_load()).unwrap();
    assert_eq!(set.transformation, xhtml);
    assert_eq!(set.xslt_params.destination_type, Some(DestinationType::Xhtml));
}

#[test]
fn existing_container_is_validated_and_kept() {
    let pipeline = EFormPipeline::new(single_entry_portal());
    let first = pipeline.prepare(FORM, &auto_load()).unwrap();
    let second = pipeline.prepare(&first.content, &auto_load()).unwrap();
    assert_eq!(first.content, second.content);
    assert_eq!(second.attributes.schema.as_deref(), Some(SCHEMA));
}

#[test]
fn container_hints_select_the_recorded_transformation() {
    let manifest = r#"<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0">
  <manifest:file-entry manifest:media-type="application/xslt+xml" manifest:full-path="form.html.sb.xslt" media-destination="sign" media-destination-type-description="HTML" media-language="sk"/>
  <manifest:file-entry manifest:media-type="application/xslt+xml" manifest:full-path="form.txt.sb.xslt" media-destination="sign" media-destination-type-description="TXT" media-language="sk"/>
</manifest:manifest>"#;
    let fetcher = MemoryFetcher::new()
        .with_resource(format!("{UPVS_DIR}/META-INF/manifest.xml"), manifest)
        .with_resource(format!("{UPVS_DIR}/form.html.sb.xslt"), stylesheet("html", ""))
        .with_resource(format!("{UPVS_DIR}/form.txt.sb.xslt"), stylesheet("text", ""))
        .with_resource(format!("{UPVS_DIR}/schema.xsd"), SCHEMA);
    let pipeline = EFormPipeline::new(fetcher);

    let mut request = auto_load();
    request.xslt_params.destination_type = Some(DestinationType::Txt);
    let xdc = pipeline.prepare(FORM, &request).unwrap().content;

    // Without hints HTML would win; the container records TXT.
    let again = pipeline.prepare(&xdc, &auto_load()).unwrap();
    assert_eq!(again.attributes.transformation.as_deref(), Some(stylesheet("text", "").as_str()));
}

#[test]
fn request_without_container_passes_through() {
    let pipeline = EFormPipeline::new(MemoryFetcher::new());
    let prepared = pipeline.prepare(FORM, &SigningParameters::default()).unwrap();
    assert_eq!(prepared.content, FORM);
}

#[test]
fn unavailable_portal_is_retryable() {
    let fetcher = single_entry_portal();
    fetcher.mark_unavailable(format!("{UPVS_DIR}/schema.xsd"));
    let pipeline = EFormPipeline::new(fetcher);
    let err = pipeline.prepare(FORM, &auto_load()).unwrap_err();
    assert!(matches!(err, Error::ServiceUnavailable { .. }));
    assert!(err.is_retryable());
}

#[test]
fn non_idempotent_builder_wraps_again() {
    let pipeline = EFormPipeline::new(single_entry_portal());
    let prepared = pipeline.prepare(FORM, &auto_load()).unwrap();
    let twice = XdcBuilder::default()
        .idempotent(false)
        .build(&prepared.content, &prepared.attributes)
        .unwrap();
    let doc = xdc::xml::roxmltree::Document::parse(&twice).unwrap();
    let inner = xdc::eforms::xdc::eform_root(&doc).unwrap();
    assert!(inner.has_tag_name((ns::XDC, "XMLDataContainer")));
}
