#![forbid(unsafe_code)]

//! Form authority classification.
//!
//! Every supported eForm URI belongs to exactly one publishing authority,
//! decided purely by prefix.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// ORSR namespace prefix.
pub const ORSR_PREFIX: &str = "http://www.justice.gov.sk/Forms";

/// ORSR `xsi:schemaLocation` values carry the namespace, a space, and then
/// the real schema URL.
pub const ORSR_SCHEMA_LOCATION_PREFIX: &str = "http://www.justice.gov.sk/Forms ";

const FS_PREFIXES: [&str; 2] = ["http://www.drsr.sk/", "https://ekr.financnasprava.sk/"];

const UPVS_PREFIXES: [&str; 3] = [
    "http://schemas.gov.sk/form/",
    "http://data.gov.sk/doc/eform/",
    "https://data.gov.sk/id/egov/eform/",
];

const FS_FILENAME_PATTERN: &str = r"^.+_fs(\d{2,4}_\d{2,4}).*\.(xml|xdcf|asice|sce|)$";

/// Publisher of a form's schema and transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FormAuthority {
    /// Central government portal (slovensko.sk).
    Upvs,
    /// Financial administration.
    Fs,
    /// Business register. Resources are embedded, never digest-checked.
    Orsr,
}

impl FormAuthority {
    /// Classify a form URI. `None` means the form is not supported.
    pub fn classify(uri: &str) -> Option<Self> {
        if uri.starts_with(ORSR_PREFIX) {
            Some(Self::Orsr)
        } else if FS_PREFIXES.iter().any(|p| uri.starts_with(p)) {
            Some(Self::Fs)
        } else if UPVS_PREFIXES.iter().any(|p| uri.starts_with(p)) {
            Some(Self::Upvs)
        } else {
            None
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Upvs => "UPVS",
            Self::Fs => "FS",
            Self::Orsr => "ORSR",
        }
    }
}

impl fmt::Display for FormAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn is_orsr_uri(uri: Option<&str>) -> bool {
    uri.is_some_and(|u| u.starts_with(ORSR_PREFIX))
}

/// Form URI carried by an `xsi:schemaLocation` value.
///
/// ORSR values yield the schema URL following the namespace; any other value
/// yields its first token.
pub fn uri_from_schema_location(location: &str) -> Option<String> {
    let location = location.trim();
    if let Some(url) = location.strip_prefix(ORSR_SCHEMA_LOCATION_PREFIX) {
        let url = url.trim();
        return (!url.is_empty()).then(|| url.to_owned());
    }
    location.split_whitespace().next().map(str::to_owned)
}

/// `{formIdentifier}/{formVersion}` from the last two path segments.
///
/// A trailing slash is ignored.
pub fn form_directory(uri: &str) -> Option<String> {
    let mut segments = uri.trim_end_matches('/').rsplit('/');
    let version = segments.next().filter(|s| !s.is_empty())?;
    let identifier = segments.next().filter(|s| !s.is_empty())?;
    Some(format!("{identifier}/{version}"))
}

/// FS form id encoded in a file name such as `podanie_fs792_772.xml`.
pub fn fs_form_id_from_filename(filename: &str) -> Option<String> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    let pattern = PATTERN
        .get_or_init(|| Regex::new(FS_FILENAME_PATTERN).ok())
        .as_ref()?;
    pattern
        .captures(filename)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_owned())
}
