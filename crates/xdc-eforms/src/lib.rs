#![forbid(unsafe_code)]

//! eForm handling: authority classification, manifest parsing,
//! transformation selection and resource resolution.

pub mod attributes;
pub mod authority;
pub mod manifest;
pub mod params;
pub mod resolver;
pub mod selector;
pub mod xdc;
pub mod xslt;

pub use attributes::EFormAttributes;
pub use authority::FormAuthority;
pub use manifest::parse_manifest;
pub use params::{
    DestinationType, EFormResourceSet, ManifestEntry, MediaDestination, ResourceDigestPair,
    SigningParameters, XsltParams,
};
pub use resolver::{EFormResolver, ResolverConfig};
pub use selector::select_xslt;
pub use xslt::output_destination_type;
