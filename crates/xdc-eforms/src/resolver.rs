#![forbid(unsafe_code)]

//! eForm resource resolution.
//!
//! Given a bare eForm or an XML DataContainer, find the schema and the
//! transformation the form must be signed with. Resources of UPVS and FS
//! forms come from a published form directory and are checked against the
//! digests of an existing container. ORSR resources are fetched by URL or
//! read from the container itself and are never digest-checked.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use xdc_core::{ns, Error};
use xdc_crypto::DigestAlgorithm;
use xdc_fetch::ResourceFetcher;
use xdc_xml::XmlDocument;

use crate::authority::{self, FormAuthority};
use crate::manifest;
use crate::params::{EFormResourceSet, ResourceDigestPair, SigningParameters, XsltParams};
use crate::selector;
use crate::xdc::{self, FormLocator};

pub const DEFAULT_UPVS_BASE_URL: &str = "https://data.gov.sk/doc/egov/eform/";
pub const DEFAULT_FS_BASE_URL: &str =
    "https://forms-slovensko-digital.s3.eu-central-1.amazonaws.com/fs/";

const UPVS_IDENTIFIER_BASE: &str = "http://data.gov.sk/doc/eform/";
const UPVS_SCHEMA_BASE: &str = "http://schemas.gov.sk/form/";

/// Where form directories are published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub upvs_base_url: String,
    pub fs_base_url: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            upvs_base_url: DEFAULT_UPVS_BASE_URL.to_owned(),
            fs_base_url: DEFAULT_FS_BASE_URL.to_owned(),
        }
    }
}

/// Resolves schema and transformation for eForms through a fetcher.
pub struct EFormResolver<F> {
    fetcher: F,
    config: ResolverConfig,
}

/// Canonicalization and digest algorithm one expected digest was made with.
#[derive(Debug, Clone)]
struct DigestMethod {
    canonicalization: String,
    algorithm: DigestAlgorithm,
}

impl DigestMethod {
    /// Method declared on an XDC reference, the request's where absent.
    fn of_reference(reference: &xdc::Reference, request: &SigningParameters) -> Result<Self, Error> {
        let algorithm = match &reference.digest_method {
            Some(method) => DigestAlgorithm::parse(method)?,
            None => request.digest_algorithm,
        };
        Ok(Self {
            canonicalization: reference
                .transform_algorithm
                .clone()
                .unwrap_or_else(|| request.properties_canonicalization.clone()),
            algorithm,
        })
    }
}

/// What an existing container says its resources must digest to.
struct Expected {
    digests: ResourceDigestPair,
    xsd_method: DigestMethod,
    xslt_method: DigestMethod,
}

/// Everything read from the input document before any fetch.
struct FormRequest {
    locator: FormLocator,
    expected: Option<Expected>,
    hints: XsltParams,
    xsd_identifier: Option<String>,
}

/// Identifiers published in an FS form's `meta.xml`.
#[derive(Debug, Default)]
struct FsMeta {
    identifier: Option<String>,
    xsd_identifier: Option<String>,
    xslt_identifier: Option<String>,
}

impl<F: ResourceFetcher> EFormResolver<F> {
    pub fn new(fetcher: F) -> Self {
        Self::with_config(fetcher, ResolverConfig::default())
    }

    pub fn with_config(fetcher: F, config: ResolverConfig) -> Self {
        Self { fetcher, config }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve the resources of `document`, a bare eForm or an XDC.
    pub fn resolve(
        &self,
        document: &str,
        request: &SigningParameters,
    ) -> Result<EFormResourceSet, Error> {
        let doc = roxmltree::Document::parse_with_options(
            xdc_xml::strip_bom(document),
            xdc_xml::parsing_options(),
        )
        .map_err(|e| Error::XmlParse(e.to_string()))?;

        if xdc::is_xdc_root(&doc) {
            if let Some(set) = embedded_orsr(&doc)? {
                debug!(identifier = %set.identifier, "using resources embedded in XDC");
                return Ok(set);
            }
        }

        let form = read_form_request(&doc, request)?;

        if let Some(form_id) = request.effective_fs_form_id() {
            return self.resolve_directory(FormAuthority::Fs, &form_id, &form);
        }

        let uri = form
            .locator
            .uri
            .clone()
            .ok_or(Error::UnknownFormFamily { uri: None })?;
        let authority = FormAuthority::classify(&uri)
            .ok_or_else(|| Error::UnknownFormFamily { uri: Some(uri.clone()) })?;
        info!(%authority, %uri, "resolving eForm resources");

        match authority {
            FormAuthority::Orsr => self.resolve_orsr(&form.locator, &uri),
            FormAuthority::Upvs | FormAuthority::Fs => {
                let directory = authority::form_directory(&uri)
                    .ok_or_else(|| Error::UnknownFormFamily { uri: Some(uri.clone()) })?;
                self.resolve_directory(authority, &directory, &form)
            }
        }
    }

    fn resolve_orsr(&self, locator: &FormLocator, uri: &str) -> Result<EFormResourceSet, Error> {
        let url = locator.orsr_url().unwrap_or_else(|| uri.to_owned());
        let schema = self
            .fetcher
            .fetch_text(&url)?
            .ok_or_else(|| Error::resource_not_found(format!("XSD schema {url}")))?;
        let transformation_url = url.replace(".xsd", ".xslt");
        let transformation = self
            .fetcher
            .fetch_text(&transformation_url)?
            .ok_or_else(|| {
                Error::resource_not_found(format!("XSLT transformation {transformation_url}"))
            })?;

        Ok(EFormResourceSet {
            identifier: url,
            schema,
            transformation,
            container_xmlns: Some(ns::XDC.to_owned()),
            xsd_identifier: None,
            xslt_params: XsltParams::default(),
            embed_used_schemas: true,
            authority: FormAuthority::Orsr,
        })
    }

    /// UPVS and FS: everything is found relative to a form directory.
    fn resolve_directory(
        &self,
        authority: FormAuthority,
        directory: &str,
        form: &FormRequest,
    ) -> Result<EFormResourceSet, Error> {
        let base = match authority {
            FormAuthority::Fs => self.config.fs_base_url.as_str(),
            _ => self.config.upvs_base_url.as_str(),
        };
        let directory_url = format!("{base}{directory}");
        debug!(%authority, url = %directory_url, "form directory");

        let meta = match authority {
            FormAuthority::Fs => self.fetch_fs_meta(&directory_url)?,
            _ => FsMeta::default(),
        };

        let manifest_url = format!("{directory_url}/META-INF/manifest.xml");
        let manifest = self
            .fetcher
            .fetch(&manifest_url)?
            .ok_or_else(|| Error::resource_not_found(format!("manifest {manifest_url}")))?;
        let entries = manifest::parse_manifest(&manifest, |path| {
            self.fetcher.fetch_text(&format!("{directory_url}/{path}"))
        })?;
        let entry = selector::select_xslt(&entries, &form.hints).ok_or_else(|| {
            Error::resource_not_found(format!("usable transformation in {manifest_url}"))
        })?;

        let xslt_url = format!("{directory_url}/{}", entry.full_path);
        let xslt = self
            .fetcher
            .fetch(&xslt_url)?
            .ok_or_else(|| Error::resource_not_found(format!("XSLT transformation {xslt_url}")))?;
        if let Some(expected) = &form.expected {
            verify(
                ns::node::USED_PRESENTATION_SCHEMA_REFERENCE,
                &xslt,
                expected.digests.xslt_digest.as_deref(),
                &expected.xslt_method,
            )?;
        }

        let xsd_url = format!("{directory_url}/schema.xsd");
        let xsd = self
            .fetcher
            .fetch(&xsd_url)?
            .ok_or_else(|| Error::resource_not_found(format!("XSD schema {xsd_url}")))?;
        if let Some(expected) = &form.expected {
            verify(
                ns::node::USED_XSD_REFERENCE,
                &xsd,
                expected.digests.xsd_digest.as_deref(),
                &expected.xsd_method,
            )?;
        }

        let (identifier, default_xsd_identifier, default_xslt_identifier) = match authority {
            FormAuthority::Fs => (
                meta.identifier
                    .ok_or_else(|| Error::MalformedResource(format!("{directory_url}/meta.xml has no identifier")))?,
                meta.xsd_identifier,
                meta.xslt_identifier,
            ),
            _ => (
                format!("{UPVS_IDENTIFIER_BASE}{directory}"),
                Some(format!("{UPVS_SCHEMA_BASE}{directory}/form.xsd")),
                Some(format!("{UPVS_SCHEMA_BASE}{directory}/form.xslt")),
            ),
        };

        Ok(EFormResourceSet {
            identifier,
            schema: into_text(xsd, &xsd_url)?,
            transformation: into_text(xslt, &xslt_url)?,
            container_xmlns: Some(ns::XDC.to_owned()),
            xsd_identifier: form.xsd_identifier.clone().or(default_xsd_identifier),
            xslt_params: XsltParams {
                identifier: form.hints.identifier.clone().or(default_xslt_identifier),
                language: entry.language,
                destination_type: Some(entry.destination_type),
                target: entry.target_environment,
                media_type: Some(entry.media_type),
            },
            embed_used_schemas: false,
            authority,
        })
    }

    fn fetch_fs_meta(&self, directory_url: &str) -> Result<FsMeta, Error> {
        let url = format!("{directory_url}/meta.xml");
        let text = self
            .fetcher
            .fetch_text(&url)?
            .ok_or_else(|| Error::resource_not_found(format!("form metadata {url}")))?;
        let doc = roxmltree::Document::parse_with_options(&text, xdc_xml::parsing_options())
            .map_err(|e| Error::MalformedResource(format!("{url}: {e}")))?;
        let value = |local: &str| {
            XmlDocument::find_element_local(&doc, local)
                .and_then(|n| n.text())
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_owned)
        };
        Ok(FsMeta {
            identifier: value(ns::node::DC_IDENTIFIER),
            xsd_identifier: value(ns::node::XSD_IDENTIFIER),
            xslt_identifier: value(ns::node::XSLT_IDENTIFIER),
        })
    }
}

/// ORSR container carrying its own schema and transformation.
///
/// The identifier is classified first: embedded resources of a UPVS or FS
/// container are ignored in favour of the published ones, and an identifier
/// of no known family is rejected.
fn embedded_orsr(doc: &roxmltree::Document<'_>) -> Result<Option<EFormResourceSet>, Error> {
    let Some((schema, transformation)) = xdc::embedded_resources(doc) else {
        return Ok(None);
    };
    let locator = FormLocator::of_xdc(doc);
    let uri = locator.uri.clone().ok_or(Error::UnknownFormFamily { uri: None })?;
    match FormAuthority::classify(&uri) {
        Some(FormAuthority::Orsr) => Ok(Some(EFormResourceSet {
            identifier: locator.orsr_url().unwrap_or(uri),
            schema,
            transformation,
            container_xmlns: Some(ns::XDC.to_owned()),
            xsd_identifier: None,
            xslt_params: XsltParams::default(),
            embed_used_schemas: true,
            authority: FormAuthority::Orsr,
        })),
        Some(authority) => {
            debug!(%authority, %uri, "ignoring embedded resources");
            Ok(None)
        }
        None => Err(Error::UnknownFormFamily { uri: Some(uri) }),
    }
}

fn read_form_request(
    doc: &roxmltree::Document<'_>,
    request: &SigningParameters,
) -> Result<FormRequest, Error> {
    if !xdc::is_xdc_root(doc) {
        return Ok(FormRequest {
            locator: FormLocator::of_eform(doc.root_element()),
            expected: None,
            hints: request.xslt_params.clone(),
            xsd_identifier: request.xsd_identifier.clone(),
        });
    }

    let locator = FormLocator::of_xdc(doc);
    let embedded = xdc::find(doc, ns::node::USED_SCHEMAS_EMBEDDED).is_some();
    let expected = if embedded || authority::is_orsr_uri(locator.uri.as_deref()) {
        None
    } else {
        let xsd = xdc::reference(doc, ns::node::USED_XSD_REFERENCE)?;
        let xslt = xdc::reference(doc, ns::node::USED_PRESENTATION_SCHEMA_REFERENCE)?;
        Some(Expected {
            xsd_method: DigestMethod::of_reference(&xsd, request)?,
            xslt_method: DigestMethod::of_reference(&xslt, request)?,
            digests: ResourceDigestPair {
                xsd_digest: Some(xsd.digest_value),
                xslt_digest: Some(xslt.digest_value),
            },
        })
    };
    Ok(FormRequest {
        locator,
        expected,
        hints: xdc::xslt_hints(doc).or(&request.xslt_params),
        xsd_identifier: xdc::xsd_identifier(doc).or_else(|| request.xsd_identifier.clone()),
    })
}

fn verify(
    reference: &str,
    content: &[u8],
    expected: Option<&str>,
    method: &DigestMethod,
) -> Result<(), Error> {
    let Some(expected) = expected else {
        return Ok(());
    };
    let actual = xdc_crypto::compute_digest(content, &method.canonicalization, method.algorithm)?;
    if actual != expected {
        return Err(Error::DigestMismatch {
            reference: reference.to_owned(),
            expected: expected.to_owned(),
            actual,
        });
    }
    debug!(reference, "digest verified");
    Ok(())
}

fn into_text(bytes: Vec<u8>, url: &str) -> Result<String, Error> {
    let text = String::from_utf8(bytes)
        .map_err(|_| Error::MalformedResource(format!("{url} is not UTF-8")))?;
    Ok(match text.strip_prefix('\u{FEFF}') {
        Some(rest) => rest.to_owned(),
        None => text,
    })
}
