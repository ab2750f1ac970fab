#![forbid(unsafe_code)]

/// Errors produced by the XDC eForm pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required artifact (manifest, schema, transformation, meta) does not
    /// exist for the form.
    #[error("resource not found: {resource}")]
    ResourceNotFound { resource: String },

    /// The remote authority answered with an outage page instead of the resource.
    #[error("service unavailable: {url}")]
    ServiceUnavailable { url: String },

    /// A fetched or supplied resource does not match the digest embedded in the XDC.
    #[error("digest mismatch for {reference}: expected {expected}, got {actual}")]
    DigestMismatch {
        reference: String,
        expected: String,
        actual: String,
    },

    /// The document does not belong to any supported form authority.
    #[error("unknown eForm: {}", uri.as_deref().unwrap_or("<no form identifier>"))]
    UnknownFormFamily { uri: Option<String> },

    /// A fetched manifest or transformation could not be interpreted.
    #[error("malformed manifest or transformation: {0}")]
    MalformedResource(String),

    #[error("XML parsing error: {0}")]
    XmlParse(String),

    #[error("invalid XML structure: {0}")]
    XmlStructure(String),

    #[error("missing required element: {0}")]
    MissingElement(String),

    #[error("missing required attribute: {0}")]
    MissingAttribute(String),

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("canonicalization error: {0}")]
    Canonicalization(String),

    #[error("cache error: {0}")]
    Cache(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Coarse classification of [`Error`], used by callers to pick remediation
/// advice without matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ResourceNotFound,
    ServiceUnavailable,
    DigestMismatch,
    UnknownFormFamily,
    MalformedResource,
    /// Structural XDC problems, unsupported algorithms, local I/O.
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ResourceNotFound { .. } => ErrorKind::ResourceNotFound,
            Self::ServiceUnavailable { .. } => ErrorKind::ServiceUnavailable,
            Self::DigestMismatch { .. } => ErrorKind::DigestMismatch,
            Self::UnknownFormFamily { .. } => ErrorKind::UnknownFormFamily,
            Self::MalformedResource(_) => ErrorKind::MalformedResource,
            _ => ErrorKind::Internal,
        }
    }

    /// Short heading for the failure, without the detailed cause.
    pub fn heading(&self) -> &'static str {
        match self.kind() {
            ErrorKind::ResourceNotFound | ErrorKind::MalformedResource => {
                "eForm preparation failed"
            }
            ErrorKind::ServiceUnavailable => "eForm service unavailable",
            ErrorKind::DigestMismatch => "XDC validation failed",
            ErrorKind::UnknownFormFamily => "unknown eForm",
            ErrorKind::Internal => match self {
                Self::MissingElement(_) | Self::MissingAttribute(_) | Self::XmlStructure(_) => {
                    "XDC validation failed"
                }
                _ => "eForm processing failed",
            },
        }
    }

    /// Whether the caller may try the same operation again later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::ServiceUnavailable | ErrorKind::ResourceNotFound
        )
    }

    pub fn resource_not_found(resource: impl Into<String>) -> Self {
        Self::ResourceNotFound {
            resource: resource.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_headings() {
        let err = Error::DigestMismatch {
            reference: "UsedXSDReference".into(),
            expected: "AAA=".into(),
            actual: "BBB=".into(),
        };
        assert_eq!(err.kind(), ErrorKind::DigestMismatch);
        assert_eq!(err.heading(), "XDC validation failed");
        assert!(!err.is_retryable());

        let err = Error::resource_not_found("manifest.xml");
        assert_eq!(err.heading(), "eForm preparation failed");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_unknown_form_display() {
        let err = Error::UnknownFormFamily { uri: None };
        assert_eq!(err.to_string(), "unknown eForm: <no form identifier>");
        let err = Error::UnknownFormFamily {
            uri: Some("http://example.com/not-a-form".into()),
        };
        assert!(err.to_string().contains("not-a-form"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_service_unavailable_is_retryable() {
        let err = Error::ServiceUnavailable {
            url: "https://data.gov.sk/doc/egov/eform/x".into(),
        };
        assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
        assert!(err.is_retryable());
    }
}
