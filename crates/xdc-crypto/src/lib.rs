#![forbid(unsafe_code)]

//! Canonical digests for XML DataContainer references.
//!
//! A reference digest is the base64 of `hash(C14N(document))`. Schema and
//! transformation files are always digested whole.

pub mod digest;

pub use digest::DigestAlgorithm;

use base64::Engine;
use xdc_c14n::C14nMode;
use xdc_core::Error;

/// Canonicalize `data` under the given C14N algorithm URI, hash it and
/// return the standard padded base64 encoding.
///
/// A leading UTF-8 byte order mark is stripped before parsing.
pub fn compute_digest(
    data: &[u8],
    canonicalization: &str,
    algorithm: DigestAlgorithm,
) -> Result<String, Error> {
    let mode = C14nMode::parse(canonicalization)?;
    let text = std::str::from_utf8(data)
        .map_err(|e| Error::XmlParse(format!("invalid UTF-8: {e}")))?;
    let canonical = xdc_c14n::canonicalize(text, mode)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(algorithm.digest(&canonical)))
}
