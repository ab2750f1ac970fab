#![forbid(unsafe_code)]

//! Algorithm URI and OID constants.
//!
//! Each URI constant is the string that appears in `TransformAlgorithm` /
//! `DigestMethod` attributes; OIDs are used in the `urn:oid:` form written
//! into XDC references.

// ── Canonicalization ─────────────────────────────────────────────────

pub const C14N: &str = "http://www.w3.org/TR/2001/REC-xml-c14n-20010315";
pub const C14N_WITH_COMMENTS: &str =
    "http://www.w3.org/TR/2001/REC-xml-c14n-20010315#WithComments";
pub const C14N11: &str = "http://www.w3.org/2006/12/xml-c14n11";
pub const C14N11_WITH_COMMENTS: &str = "http://www.w3.org/2006/12/xml-c14n11#WithComments";
pub const EXC_C14N: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";
pub const EXC_C14N_WITH_COMMENTS: &str = "http://www.w3.org/2001/10/xml-exc-c14n#WithComments";

// ── Digest algorithms ────────────────────────────────────────────────

pub const SHA1: &str = "http://www.w3.org/2000/09/xmldsig#sha1";
pub const SHA224: &str = "http://www.w3.org/2001/04/xmldsig-more#sha224";
pub const SHA256: &str = "http://www.w3.org/2001/04/xmlenc#sha256";
pub const SHA384: &str = "http://www.w3.org/2001/04/xmldsig-more#sha384";
pub const SHA512: &str = "http://www.w3.org/2001/04/xmlenc#sha512";
pub const SHA3_224: &str = "http://www.w3.org/2007/05/xmldsig-more#sha3-224";
pub const SHA3_256: &str = "http://www.w3.org/2007/05/xmldsig-more#sha3-256";
pub const SHA3_384: &str = "http://www.w3.org/2007/05/xmldsig-more#sha3-384";
pub const SHA3_512: &str = "http://www.w3.org/2007/05/xmldsig-more#sha3-512";

// ── Digest algorithm OIDs ────────────────────────────────────────────

pub const SHA1_OID: &str = "1.3.14.3.2.26";
pub const SHA224_OID: &str = "2.16.840.1.101.3.4.2.4";
pub const SHA256_OID: &str = "2.16.840.1.101.3.4.2.1";
pub const SHA384_OID: &str = "2.16.840.1.101.3.4.2.2";
pub const SHA512_OID: &str = "2.16.840.1.101.3.4.2.3";
pub const SHA3_224_OID: &str = "2.16.840.1.101.3.4.2.7";
pub const SHA3_256_OID: &str = "2.16.840.1.101.3.4.2.8";
pub const SHA3_384_OID: &str = "2.16.840.1.101.3.4.2.9";
pub const SHA3_512_OID: &str = "2.16.840.1.101.3.4.2.10";

/// Prefix of the namespaced OID form used by `DigestMethod` attributes.
pub const URN_OID_PREFIX: &str = "urn:oid:";
