#![forbid(unsafe_code)]

//! eForm resource resolution and XML DataContainer integrity.
//!
//! Re-exports the workspace crates and offers [`EFormPipeline`], which takes
//! a signing request from raw document to the document that gets signed.

pub use xdc_c14n as c14n;
pub use xdc_container as container;
pub use xdc_core as core;
pub use xdc_crypto as crypto;
pub use xdc_eforms as eforms;
pub use xdc_fetch as fetch;
pub use xdc_xml as xml;

pub use xdc_container::{XdcBuilder, XdcValidator};
pub use xdc_core::{Error, ErrorKind, Result};
pub use xdc_eforms::{EFormAttributes, EFormResolver, ResolverConfig, SigningParameters};
pub use xdc_fetch::ResourceFetcher;

use tracing::debug;

/// Result of [`EFormPipeline::prepare`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedDocument {
    /// The document to sign: a freshly built or a validated existing XDC,
    /// or the input unchanged when no container was requested.
    pub content: String,
    pub attributes: EFormAttributes,
}

/// Resolve, then build or validate.
pub struct EFormPipeline<F> {
    resolver: EFormResolver<F>,
}

impl<F: ResourceFetcher> EFormPipeline<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            resolver: EFormResolver::new(fetcher),
        }
    }

    pub fn with_config(fetcher: F, config: ResolverConfig) -> Self {
        Self {
            resolver: EFormResolver::with_config(fetcher, config),
        }
    }

    pub fn resolver(&self) -> &EFormResolver<F> {
        &self.resolver
    }

    /// Prepare `document` for signing.
    ///
    /// An existing container has its referenced digests checked against the
    /// resolved resources; a bare eForm is wrapped when the attributes ask
    /// for an XDC container.
    pub fn prepare(&self, document: &str, request: &SigningParameters) -> Result<PreparedDocument> {
        let attributes = EFormAttributes::build(request, document, &self.resolver)?;

        if xdc_container::is_xdc(document) {
            if !attributes.embed_used_schemas {
                if let (Some(schema), Some(transformation)) =
                    (attributes.schema.as_deref(), attributes.transformation.as_deref())
                {
                    XdcValidator::new(document)?
                        .with_defaults(
                            request.properties_canonicalization.clone(),
                            request.digest_algorithm,
                        )
                        .validate(schema, transformation)?;
                }
            }
            debug!("existing XDC validated");
            return Ok(PreparedDocument {
                content: document.to_owned(),
                attributes,
            });
        }

        if !attributes.is_xdc_container() {
            return Ok(PreparedDocument {
                content: document.to_owned(),
                attributes,
            });
        }

        let content = XdcBuilder::for_request(request).build(document, &attributes)?;
        debug!(identifier = ?attributes.identifier, "XDC built");
        Ok(PreparedDocument { content, attributes })
    }
}
