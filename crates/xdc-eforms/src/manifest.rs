#![forbid(unsafe_code)]

//! `META-INF/manifest.xml` parsing.
//!
//! A form directory lists its files in an OpenDocument style manifest. Only
//! entries describing a usable transformation survive parsing; everything
//! else is dropped with a warning.

use tracing::{debug, warn};
use xdc_core::{ns, Error};

use crate::params::{DestinationType, ManifestEntry, MediaDestination};
use crate::xslt;

const SIGN_SUFFIX: &str = ".sb.xslt";
const VIEW_SUFFIX: &str = ".html.xslt";

/// Parse a manifest into its transformation entries, in document order.
///
/// `sniff` fetches a transformation by its `full-path`; it is only called
/// when an entry declares no destination type. A missing or unreadable
/// transformation drops that entry, an unavailable service aborts.
pub fn parse_manifest<S>(manifest: &[u8], mut sniff: S) -> Result<Vec<ManifestEntry>, Error>
where
    S: FnMut(&str) -> Result<Option<String>, Error>,
{
    let text = std::str::from_utf8(manifest)
        .map_err(|e| Error::MalformedResource(format!("manifest is not UTF-8: {e}")))?;
    let doc = roxmltree::Document::parse_with_options(
        xdc_xml::strip_bom(text),
        xdc_xml::parsing_options(),
    )
    .map_err(|e| Error::MalformedResource(format!("manifest: {e}")))?;

    let mut entries = Vec::new();
    for node in doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == ns::node::FILE_ENTRY)
    {
        if let Some(entry) = parse_entry(node, &mut sniff)? {
            entries.push(entry);
        }
    }
    debug!(count = entries.len(), "parsed manifest");
    Ok(entries)
}

fn parse_entry<S>(
    node: roxmltree::Node<'_, '_>,
    sniff: &mut S,
) -> Result<Option<ManifestEntry>, Error>
where
    S: FnMut(&str) -> Result<Option<String>, Error>,
{
    let attr = |name: &str| xdc_xml::attribute_local(node, name);

    let Some(full_path) = attr(ns::attr::FULL_PATH) else {
        return Ok(None);
    };
    let full_path = full_path.replace('\\', "/");
    let media_type = attr(ns::attr::MEDIA_TYPE);

    let media_destination = match attr(ns::attr::MEDIA_DESTINATION) {
        Some(value) => {
            let Some(destination) = MediaDestination::parse(value) else {
                debug!(path = %full_path, media_destination = value, "skipping manifest entry");
                return Ok(None);
            };
            match media_type {
                Some(mt) if is_transformation_media_type(mt, &full_path) => destination,
                _ => {
                    debug!(path = %full_path, media_type, "skipping non-transformation entry");
                    return Ok(None);
                }
            }
        }
        None if full_path.contains(SIGN_SUFFIX) => MediaDestination::Sign,
        None if full_path.contains(VIEW_SUFFIX) => MediaDestination::View,
        None => return Ok(None),
    };

    let destination_type = match attr(ns::attr::MEDIA_DESTINATION_TYPE_DESCRIPTION_MANIFEST)
        .map(DestinationType::parse)
        .or_else(|| attr(ns::attr::MEDIA_DESTINATION_TYPE).and_then(DestinationType::from_media_type))
    {
        Some(dt) => dt,
        None => match sniff_destination_type(&full_path, sniff)? {
            Some(dt) => dt,
            None => return Ok(None),
        },
    };

    Ok(Some(ManifestEntry {
        media_type: media_type.unwrap_or(ns::mime::XSLT).to_owned(),
        language: attr(ns::attr::MEDIA_LANGUAGE).map(str::to_owned),
        destination_type,
        target_environment: attr(ns::attr::MANIFEST_TARGET_ENVIRONMENT).map(str::to_owned),
        full_path,
        media_destination,
    }))
}

fn is_transformation_media_type(media_type: &str, full_path: &str) -> bool {
    match media_type.trim() {
        ns::mime::XSLT | ns::mime::TEXT_XSL => true,
        ns::mime::TEXT_XML | ns::mime::APPLICATION_XML => full_path.contains(".xsl"),
        _ => false,
    }
}

fn sniff_destination_type<S>(full_path: &str, sniff: &mut S) -> Result<Option<DestinationType>, Error>
where
    S: FnMut(&str) -> Result<Option<String>, Error>,
{
    let xslt = match sniff(full_path) {
        Ok(Some(text)) => text,
        Ok(None) => {
            warn!(path = full_path, "transformation listed in manifest not found");
            return Ok(None);
        }
        Err(e @ Error::ServiceUnavailable { .. }) => return Err(e),
        Err(e) => {
            warn!(path = full_path, error = %e, "could not read transformation");
            return Ok(None);
        }
    };
    match xslt::output_destination_type(&xslt) {
        Ok(dt) => Ok(Some(dt)),
        Err(e) => {
            warn!(path = full_path, error = %e, "could not determine transformation output");
            Ok(None)
        }
    }
}
