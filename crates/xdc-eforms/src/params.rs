#![forbid(unsafe_code)]

//! Request and result records passed between the resolver, the attribute
//! builder and the container builder.

use std::fmt;

use serde::{Deserialize, Serialize};
use xdc_core::{algorithm, ns};
use xdc_crypto::DigestAlgorithm;

use crate::authority::{self, FormAuthority};

/// Output kind of a transformation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DestinationType {
    Txt,
    Html,
    Xhtml,
    /// Any other published value. Never equal to a known kind.
    Other(String),
}

impl DestinationType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Txt => "TXT",
            Self::Html => "HTML",
            Self::Xhtml => "XHTML",
            Self::Other(s) => s,
        }
    }

    /// Parse a `MediaDestinationTypeDescription` value.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "TXT" => Self::Txt,
            "HTML" => Self::Html,
            "XHTML" => Self::Xhtml,
            _ => Self::Other(value.trim().to_owned()),
        }
    }

    /// Map a `media-destination-type` MIME value.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        match media_type.trim() {
            ns::mime::TEXT_PLAIN => Some(Self::Txt),
            ns::mime::TEXT_HTML => Some(Self::Html),
            ns::mime::XHTML => Some(Self::Xhtml),
            _ => None,
        }
    }
}

impl fmt::Display for DestinationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for DestinationType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<DestinationType> for String {
    fn from(value: DestinationType) -> Self {
        value.as_str().to_owned()
    }
}

/// Whether a transformation renders the signed view or a preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaDestination {
    Sign,
    View,
}

impl MediaDestination {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "sign" => Some(Self::Sign),
            "view" => Some(Self::View),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sign => "sign",
            Self::View => "view",
        }
    }
}

/// Transformation parameters. Every field is optional; when used as
/// selection hints an absent field means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct XsltParams {
    pub identifier: Option<String>,
    pub language: Option<String>,
    pub destination_type: Option<DestinationType>,
    pub target: Option<String>,
    pub media_type: Option<String>,
}

impl XsltParams {
    /// Take every field of `self` that is set, the rest from `fallback`.
    pub fn or(self, fallback: &XsltParams) -> XsltParams {
        XsltParams {
            identifier: self.identifier.or_else(|| fallback.identifier.clone()),
            language: self.language.or_else(|| fallback.language.clone()),
            destination_type: self
                .destination_type
                .or_else(|| fallback.destination_type.clone()),
            target: self.target.or_else(|| fallback.target.clone()),
            media_type: self.media_type.or_else(|| fallback.media_type.clone()),
        }
    }
}

/// One usable transformation listed in a form's `manifest.xml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub media_type: String,
    pub language: Option<String>,
    pub destination_type: DestinationType,
    pub target_environment: Option<String>,
    pub full_path: String,
    pub media_destination: MediaDestination,
}

/// Digests an existing XDC expects its schema and transformation to have.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDigestPair {
    pub xsd_digest: Option<String>,
    pub xslt_digest: Option<String>,
}

/// Everything resolved for one form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EFormResourceSet {
    pub identifier: String,
    pub schema: String,
    pub transformation: String,
    pub container_xmlns: Option<String>,
    pub xsd_identifier: Option<String>,
    pub xslt_params: XsltParams,
    pub embed_used_schemas: bool,
    pub authority: FormAuthority,
}

/// A signing request as far as eForm handling is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SigningParameters {
    pub transformation: Option<String>,
    pub schema: Option<String>,
    /// C14N algorithm URI used for reference digests.
    pub properties_canonicalization: String,
    pub digest_algorithm: DigestAlgorithm,
    pub identifier: Option<String>,
    pub xslt_params: XsltParams,
    pub container_xmlns: Option<String>,
    pub xsd_identifier: Option<String>,
    pub embed_used_schemas: bool,
    pub auto_load_eform: bool,
    pub fs_form_id: Option<String>,
    /// Name of the submitted file, used to recognise FS forms.
    pub file_name: Option<String>,
}

impl Default for SigningParameters {
    fn default() -> Self {
        Self {
            transformation: None,
            schema: None,
            properties_canonicalization: algorithm::C14N.to_owned(),
            digest_algorithm: DigestAlgorithm::default(),
            identifier: None,
            xslt_params: XsltParams::default(),
            container_xmlns: None,
            xsd_identifier: None,
            embed_used_schemas: false,
            auto_load_eform: false,
            fs_form_id: None,
            file_name: None,
        }
    }
}

impl SigningParameters {
    /// The explicit FS form id, or the one encoded in the file name.
    pub fn effective_fs_form_id(&self) -> Option<String> {
        self.fs_form_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .or_else(|| {
                self.file_name
                    .as_deref()
                    .and_then(authority::fs_form_id_from_filename)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_type_parse() {
        assert_eq!(DestinationType::parse("xhtml"), DestinationType::Xhtml);
        assert_eq!(DestinationType::parse(" HTML "), DestinationType::Html);
        assert_eq!(
            DestinationType::parse("PDF"),
            DestinationType::Other("PDF".into())
        );
        assert_eq!(
            DestinationType::from_media_type("application/xhtml+xml"),
            Some(DestinationType::Xhtml)
        );
        assert_eq!(DestinationType::from_media_type("image/png"), None);
    }

    #[test]
    fn test_params_deserialize_from_json() {
        let json = r#"{
            "identifier": "http://data.gov.sk/doc/eform/App.GeneralAgenda/1.9",
            "autoLoadEform": true,
            "digestAlgorithm": "SHA256",
            "xsltParams": { "language": "sk", "destinationType": "XHTML" }
        }"#;
        let params: SigningParameters = serde_json::from_str(json).unwrap();
        assert!(params.auto_load_eform);
        assert_eq!(params.digest_algorithm, DigestAlgorithm::Sha256);
        assert_eq!(params.properties_canonicalization, algorithm::C14N);
        assert_eq!(
            params.xslt_params.destination_type,
            Some(DestinationType::Xhtml)
        );
        assert_eq!(params.xslt_params.target, None);
    }

    #[test]
    fn test_effective_fs_form_id() {
        let mut params = SigningParameters {
            file_name: Some("priznanie_fs792_772.xml".into()),
            ..SigningParameters::default()
        };
        assert_eq!(params.effective_fs_form_id().as_deref(), Some("792_772"));
        params.fs_form_id = Some("100_1".into());
        assert_eq!(params.effective_fs_form_id().as_deref(), Some("100_1"));
        params.fs_form_id = Some("  ".into());
        assert_eq!(params.effective_fs_form_id().as_deref(), Some("792_772"));
    }

    #[test]
    fn test_xslt_params_or() {
        let own = XsltParams {
            language: Some("en".into()),
            ..XsltParams::default()
        };
        let fallback = XsltParams {
            language: Some("sk".into()),
            target: Some("AppName".into()),
            ..XsltParams::default()
        };
        let merged = own.or(&fallback);
        assert_eq!(merged.language.as_deref(), Some("en"));
        assert_eq!(merged.target.as_deref(), Some("AppName"));
    }
}
