#![forbid(unsafe_code)]

//! The eForm attributes a signing request ends up with.

use serde::{Deserialize, Serialize};
use tracing::debug;
use xdc_core::{ns, Error};
use xdc_fetch::ResourceFetcher;

use crate::authority;
use crate::params::{EFormResourceSet, SigningParameters, XsltParams};
use crate::resolver::EFormResolver;
use crate::xslt;

/// Final eForm attributes, either resolved or taken from the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EFormAttributes {
    pub identifier: Option<String>,
    pub transformation: Option<String>,
    pub schema: Option<String>,
    pub container_xmlns: Option<String>,
    pub xsd_identifier: Option<String>,
    pub xslt_params: XsltParams,
    pub embed_used_schemas: bool,
}

impl From<EFormResourceSet> for EFormAttributes {
    fn from(set: EFormResourceSet) -> Self {
        Self {
            identifier: Some(set.identifier),
            transformation: Some(set.transformation),
            schema: Some(set.schema),
            container_xmlns: set.container_xmlns,
            xsd_identifier: set.xsd_identifier,
            xslt_params: set.xslt_params,
            embed_used_schemas: set.embed_used_schemas,
        }
    }
}

impl EFormAttributes {
    /// Attributes exactly as supplied by the request.
    pub fn from_request(request: &SigningParameters) -> Self {
        Self {
            identifier: request.identifier.clone(),
            transformation: request.transformation.clone(),
            schema: request.schema.clone(),
            container_xmlns: request.container_xmlns.clone(),
            xsd_identifier: request.xsd_identifier.clone(),
            xslt_params: request.xslt_params.clone(),
            embed_used_schemas: request.embed_used_schemas,
        }
    }

    /// Build the attributes for `document`.
    ///
    /// Resources are resolved when the request asks for automatic loading,
    /// for embedded schemas or names an FS form; otherwise the request's own
    /// values are used. Missing transformation parameters are then filled
    /// in, and an XDC container requires a schema, a transformation and
    /// (unless embedding) an identifier.
    pub fn build<F: ResourceFetcher>(
        request: &SigningParameters,
        document: &str,
        resolver: &EFormResolver<F>,
    ) -> Result<Self, Error> {
        let mut attrs = Self::from_request(request);

        if request.auto_load_eform
            || request.embed_used_schemas
            || request.effective_fs_form_id().is_some()
        {
            let resolved = resolver.resolve(document, request)?;
            debug!(identifier = %resolved.identifier, authority = %resolved.authority, "eForm resolved");
            let embed = attrs.embed_used_schemas;
            attrs = resolved.into();
            attrs.embed_used_schemas |= embed;
        }

        if let Some(transformation) = attrs.transformation.take() {
            let transformation = xdc_xml::strip_bom(&transformation).to_owned();
            attrs.xslt_params = fill_xslt_params(
                std::mem::take(&mut attrs.xslt_params),
                &transformation,
                attrs.identifier.as_deref(),
            );
            attrs.transformation = Some(transformation);
        }
        if let Some(schema) = attrs.schema.as_mut() {
            if let Some(rest) = schema.strip_prefix('\u{FEFF}') {
                *schema = rest.to_owned();
            }
        }

        if attrs.is_xdc_container() {
            if attrs.schema.is_none() {
                return Err(Error::resource_not_found("XSD schema of the eForm"));
            }
            if !attrs.embed_used_schemas && attrs.xsd_identifier.is_none() {
                attrs.xsd_identifier = attrs
                    .identifier
                    .as_deref()
                    .map(|id| sibling(id, "form.xsd"));
            }
            if attrs.transformation.is_none() {
                return Err(Error::resource_not_found("XSLT transformation of the eForm"));
            }
            if !attrs.embed_used_schemas && attrs.identifier.is_none() {
                return Err(Error::resource_not_found("eForm identifier"));
            }
        }

        if authority::is_orsr_uri(attrs.identifier.as_deref()) {
            attrs.embed_used_schemas = true;
        }
        Ok(attrs)
    }

    pub fn is_xdc_container(&self) -> bool {
        self.container_xmlns
            .as_deref()
            .is_some_and(|xmlns| xmlns.contains("xmldatacontainer"))
    }
}

/// Fill unset transformation parameters. The destination type is sniffed
/// from the transformation and stays unset when that fails.
fn fill_xslt_params(params: XsltParams, transformation: &str, identifier: Option<&str>) -> XsltParams {
    let destination_type = params.destination_type.or_else(|| {
        xslt::output_destination_type(transformation)
            .map_err(|e| debug!(error = %e, "transformation output not recognised"))
            .ok()
    });
    XsltParams {
        identifier: params
            .identifier
            .or_else(|| identifier.map(|id| sibling(id, "form.xslt"))),
        language: params.language.or_else(|| Some("sk".to_owned())),
        destination_type,
        target: params.target,
        media_type: params.media_type.or_else(|| Some(ns::mime::XSLT.to_owned())),
    }
}

fn sibling(identifier: &str, file: &str) -> String {
    format!("{}/{file}", identifier.trim_end_matches('/'))
}
