#![forbid(unsafe_code)]

//! Time-bounded file cache for fetched resources.
//!
//! # Cache Structure
//!
//! ```text
//! <cache dir>/
//!   {sha256(url)}.data   # resource bytes
//!   {sha256(url)}.json   # CacheMeta
//! ```
//!
//! Both files are written through a temporary file in the same directory and
//! renamed into place. The content digest recorded in the metadata is checked
//! on every read, so a reader that races a writer sees either a complete
//! entry or a miss.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use xdc_core::Error;

use crate::config::CacheConfig;

/// Upper bound on the expiration window (100 years).
const MAX_TTL_SECS: u64 = 100 * 365 * 24 * 60 * 60;

/// Metadata stored alongside cached content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMeta {
    /// URL the content was fetched from.
    pub url: String,
    pub fetched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Content digest (`sha256:<hex>`).
    pub digest: String,
}

/// Cache of fetched resources keyed by URL.
#[derive(Debug, Clone)]
pub struct FileCache {
    cache_dir: PathBuf,
    ttl: Duration,
}

impl FileCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_dir(&config.dir, config.ttl_secs)
    }

    /// Create a cache in a custom directory.
    pub fn with_dir(cache_dir: impl Into<PathBuf>, ttl_secs: u64) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            ttl: Duration::seconds(ttl_secs.min(MAX_TTL_SECS) as i64),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Get cached content for `url`.
    ///
    /// Returns `None` when the entry is absent, expired or fails its
    /// integrity check; the latter two are evicted.
    pub fn get(&self, url: &str) -> Result<Option<Vec<u8>>, Error> {
        let (data_path, meta_path) = self.entry_paths(url);
        if !data_path.exists() || !meta_path.exists() {
            debug!(url, "cache miss");
            return Ok(None);
        }

        let Some(meta) = self.metadata(url) else {
            warn!(url, "unreadable cache metadata");
            self.evict(url)?;
            return Ok(None);
        };

        if meta.expires_at <= Utc::now() {
            debug!(url, expires_at = %meta.expires_at, "cache entry expired");
            self.evict(url)?;
            return Ok(None);
        }

        let content = match fs::read(&data_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Cache(format!("failed to read cached resource: {e}"))),
        };

        let actual = content_digest(&content);
        if actual != meta.digest {
            warn!(
                url,
                expected = %meta.digest,
                actual = %actual,
                "cache integrity check failed"
            );
            self.evict(url)?;
            return Ok(None);
        }

        debug!(url, "cache hit");
        Ok(Some(content))
    }

    /// Store `content` for `url`.
    pub fn put(&self, url: &str, content: &[u8]) -> Result<(), Error> {
        fs::create_dir_all(&self.cache_dir)
            .map_err(|e| Error::Cache(format!("failed to create cache directory: {e}")))?;

        let fetched_at = Utc::now();
        let meta = CacheMeta {
            url: url.to_owned(),
            fetched_at,
            expires_at: fetched_at + self.ttl,
            digest: content_digest(content),
        };
        let meta_json = serde_json::to_vec_pretty(&meta)
            .map_err(|e| Error::Cache(format!("failed to serialize metadata: {e}")))?;

        let (data_path, meta_path) = self.entry_paths(url);
        self.write_atomic(&data_path, content)?;
        self.write_atomic(&meta_path, &meta_json)?;

        debug!(url, path = %data_path.display(), "cached resource");
        Ok(())
    }

    /// Metadata for `url`, if present and readable.
    pub fn metadata(&self, url: &str) -> Option<CacheMeta> {
        let (_, meta_path) = self.entry_paths(url);
        let content = fs::read(meta_path).ok()?;
        serde_json::from_slice(&content).ok()
    }

    /// Remove the entry for `url`.
    pub fn evict(&self, url: &str) -> Result<(), Error> {
        let (data_path, meta_path) = self.entry_paths(url);
        for path in [meta_path, data_path] {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(Error::Cache(format!("failed to evict cache entry: {e}"))),
            }
        }
        debug!(url, "evicted from cache");
        Ok(())
    }

    /// Remove every cached entry.
    pub fn clear(&self) -> Result<(), Error> {
        if self.cache_dir.exists() {
            fs::remove_dir_all(&self.cache_dir)
                .map_err(|e| Error::Cache(format!("failed to clear cache: {e}")))?;
            debug!(path = %self.cache_dir.display(), "cleared resource cache");
        }
        Ok(())
    }

    fn entry_paths(&self, url: &str) -> (PathBuf, PathBuf) {
        let key = hex::encode(Sha256::digest(url.as_bytes()));
        (
            self.cache_dir.join(format!("{key}.data")),
            self.cache_dir.join(format!("{key}.json")),
        )
    }

    fn write_atomic(&self, path: &Path, content: &[u8]) -> Result<(), Error> {
        let mut temp = tempfile::NamedTempFile::new_in(&self.cache_dir)
            .map_err(|e| Error::Cache(format!("failed to create temp file: {e}")))?;
        temp.write_all(content)
            .map_err(|e| Error::Cache(format!("failed to write temp file: {e}")))?;
        temp.persist(path)
            .map_err(|e| Error::Cache(format!("failed to rename temp file: {}", e.error)))?;
        Ok(())
    }
}

impl Default for FileCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

fn content_digest(content: &[u8]) -> String {
    format!("sha256:{}", hex::encode(Sha256::digest(content)))
}
