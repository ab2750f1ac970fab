#![forbid(unsafe_code)]

//! Fetcher and cache configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default cache expiration window (6 hours).
pub const DEFAULT_TTL_SECS: u64 = 6 * 60 * 60;

/// Default HTTP timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const USER_AGENT_VALUE: &str = concat!("xdc-fetch/", env!("CARGO_PKG_VERSION"));

/// HTTP fetch settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Case-insensitive substrings that mark an HTML body as an outage page.
    pub unavailable_markers: Vec<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: USER_AGENT_VALUE.to_owned(),
            unavailable_markers: vec![
                "dočasne nedostupn".to_owned(),
                "služba nie je dostupná".to_owned(),
                "odstávka".to_owned(),
                "service unavailable".to_owned(),
                "temporarily unavailable".to_owned(),
            ],
        }
    }
}

/// File cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub dir: PathBuf,
    pub ttl_secs: u64,
}

impl CacheConfig {
    /// `<platform cache dir>/xdc/eforms`, falling back to the home directory
    /// and finally the system temp directory.
    pub fn default_dir() -> PathBuf {
        dirs::cache_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(std::env::temp_dir)
            .join("xdc")
            .join("eforms")
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: Self::default_dir(),
            ttl_secs: DEFAULT_TTL_SECS,
        }
    }
}
