//! Print reference digests of an XML DataContainer next to the digests of
//! local schema and transformation files.
//!
//! usage: xdc_digest <xdc_file> [schema.xsd] [form.xslt]
//!
//! Set `RUST_LOG=debug` for the validator's own trace.

use tracing_subscriber::EnvFilter;
use xdc::core::{algorithm, ns};
use xdc::crypto::DigestAlgorithm;
use xdc::eforms::xdc as xdc_reader;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let path = args.next().expect("usage: xdc_digest <xdc_file> [schema.xsd] [form.xslt]");
    let text = std::fs::read_to_string(&path).unwrap();

    if !xdc::container::is_xdc(&text) {
        let digest =
            xdc::crypto::compute_digest(text.as_bytes(), algorithm::C14N, DigestAlgorithm::Sha256).unwrap();
        eprintln!("Not an XDC, whole document digest (C14N, SHA-256): {digest}");
        return;
    }

    let doc = roxmltree_doc(&text);
    for (reference, file) in [
        (ns::node::USED_XSD_REFERENCE, args.next()),
        (ns::node::USED_PRESENTATION_SCHEMA_REFERENCE, args.next()),
    ] {
        eprintln!("=== {reference}");
        let r = match xdc_reader::reference(&doc, reference) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("  {e}");
                continue;
            }
        };
        eprintln!("  Identifier:         {}", r.identifier.as_deref().unwrap_or("-"));
        eprintln!("  TransformAlgorithm: {}", r.transform_algorithm.as_deref().unwrap_or("-"));
        eprintln!("  DigestMethod:       {}", r.digest_method.as_deref().unwrap_or("-"));
        eprintln!("  Expected digest:    {}", r.digest_value);

        let Some(file) = file else { continue };
        let content = std::fs::read(&file).unwrap();
        let algorithm = r
            .digest_method
            .as_deref()
            .map(|m| DigestAlgorithm::parse(m).unwrap())
            .unwrap_or_default();
        let canonicalization = r.transform_algorithm.as_deref().unwrap_or(algorithm::C14N);
        let computed = xdc::crypto::compute_digest(&content, canonicalization, algorithm).unwrap();
        eprintln!("  Computed digest:    {computed}  ({file})");
        eprintln!("  Match: {}", computed == r.digest_value);
    }
}

fn roxmltree_doc(text: &str) -> xdc::xml::roxmltree::Document<'_> {
    xdc::xml::roxmltree::Document::parse_with_options(
        xdc::xml::strip_bom(text),
        xdc::xml::parsing_options(),
    )
    .unwrap()
}
