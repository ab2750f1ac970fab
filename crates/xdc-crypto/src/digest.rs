#![forbid(unsafe_code)]

//! Digest (hash) algorithms.
//!
//! XDC references name their digest as `urn:oid:<oid>`; signing parameters
//! usually carry the XML-DSig URI or a short name such as `SHA256`. Every
//! spelling parses to the same [`DigestAlgorithm`].

use digest::Digest;
use std::fmt;
use std::str::FromStr;
use xdc_core::{algorithm, Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DigestAlgorithm {
    Sha1,
    Sha224,
    #[default]
    Sha256,
    Sha384,
    Sha512,
    Sha3_224,
    Sha3_256,
    Sha3_384,
    Sha3_512,
}

const ALL: [DigestAlgorithm; 9] = [
    DigestAlgorithm::Sha1,
    DigestAlgorithm::Sha224,
    DigestAlgorithm::Sha256,
    DigestAlgorithm::Sha384,
    DigestAlgorithm::Sha512,
    DigestAlgorithm::Sha3_224,
    DigestAlgorithm::Sha3_256,
    DigestAlgorithm::Sha3_384,
    DigestAlgorithm::Sha3_512,
];

impl DigestAlgorithm {
    /// XML-DSig algorithm URI.
    pub fn uri(&self) -> &'static str {
        match self {
            Self::Sha1 => algorithm::SHA1,
            Self::Sha224 => algorithm::SHA224,
            Self::Sha256 => algorithm::SHA256,
            Self::Sha384 => algorithm::SHA384,
            Self::Sha512 => algorithm::SHA512,
            Self::Sha3_224 => algorithm::SHA3_224,
            Self::Sha3_256 => algorithm::SHA3_256,
            Self::Sha3_384 => algorithm::SHA3_384,
            Self::Sha3_512 => algorithm::SHA3_512,
        }
    }

    pub fn oid(&self) -> &'static str {
        match self {
            Self::Sha1 => algorithm::SHA1_OID,
            Self::Sha224 => algorithm::SHA224_OID,
            Self::Sha256 => algorithm::SHA256_OID,
            Self::Sha384 => algorithm::SHA384_OID,
            Self::Sha512 => algorithm::SHA512_OID,
            Self::Sha3_224 => algorithm::SHA3_224_OID,
            Self::Sha3_256 => algorithm::SHA3_256_OID,
            Self::Sha3_384 => algorithm::SHA3_384_OID,
            Self::Sha3_512 => algorithm::SHA3_512_OID,
        }
    }

    /// The `urn:oid:` form written into `DigestMethod` attributes.
    pub fn urn_oid(&self) -> String {
        format!("{}{}", algorithm::URN_OID_PREFIX, self.oid())
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha1 => "SHA1",
            Self::Sha224 => "SHA224",
            Self::Sha256 => "SHA256",
            Self::Sha384 => "SHA384",
            Self::Sha512 => "SHA512",
            Self::Sha3_224 => "SHA3-224",
            Self::Sha3_256 => "SHA3-256",
            Self::Sha3_384 => "SHA3-384",
            Self::Sha3_512 => "SHA3-512",
        }
    }

    /// Parse from a URI, OID, `urn:oid:` string or short name.
    pub fn parse(value: &str) -> Result<Self, Error> {
        let value = value.trim();
        let oid = value.strip_prefix(algorithm::URN_OID_PREFIX).unwrap_or(value);
        let short = normalize_name(value);
        ALL.into_iter()
            .find(|alg| {
                alg.uri() == value || alg.oid() == oid || normalize_name(alg.name()) == short
            })
            .ok_or_else(|| Error::UnsupportedAlgorithm(format!("digest algorithm: {value}")))
    }

    /// Hash `data` in one shot.
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        macro_rules! one_shot {
            ($hasher:ty) => {
                <$hasher>::digest(data).to_vec()
            };
        }
        match self {
            Self::Sha1 => one_shot!(sha1::Sha1),
            Self::Sha224 => one_shot!(sha2::Sha224),
            Self::Sha256 => one_shot!(sha2::Sha256),
            Self::Sha384 => one_shot!(sha2::Sha384),
            Self::Sha512 => one_shot!(sha2::Sha512),
            Self::Sha3_224 => one_shot!(sha3::Sha3_224),
            Self::Sha3_256 => one_shot!(sha3::Sha3_256),
            Self::Sha3_384 => one_shot!(sha3::Sha3_384),
            Self::Sha3_512 => one_shot!(sha3::Sha3_512),
        }
    }
}

/// `SHA-256`, `sha256` and `SHA_256` all compare equal.
fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DigestAlgorithm {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DigestAlgorithm> for String {
    fn from(alg: DigestAlgorithm) -> Self {
        alg.name().to_owned()
    }
}
