#![forbid(unsafe_code)]

//! Inclusive Canonical XML 1.1 (C14N 1.1).
//!
//! Algorithm URI: `http://www.w3.org/2006/12/xml-c14n11`
//! With comments: `http://www.w3.org/2006/12/xml-c14n11#WithComments`
//!
//! C14N 1.1 differs from 1.0 only in how `xml:id` and `xml:base` are
//! inherited into document subsets. For whole documents the output is
//! identical, so this delegates to C14N 1.0.

use xdc_core::Error;

/// Canonicalize a document using Inclusive C14N 1.1.
pub fn canonicalize(doc: &roxmltree::Document<'_>, with_comments: bool) -> Result<Vec<u8>, Error> {
    crate::inclusive::canonicalize(doc, with_comments)
}
