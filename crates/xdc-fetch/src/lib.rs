#![forbid(unsafe_code)]

//! Resource fetching for eForm schemas, transformations and manifests.
//!
//! A fetch has three outcomes that callers must keep apart:
//! - `Ok(Some(bytes))`: the resource exists
//! - `Ok(None)`: the resource does not exist (or could not be reached)
//! - `Err(Error::ServiceUnavailable)`: the authority answered with an outage
//!   page, try again later
//!
//! [`HttpFetcher`] talks to the network, [`CachingFetcher`] puts a
//! [`FileCache`] in front of any fetcher and [`MemoryFetcher`] serves a fixed
//! map for tests and offline use.

pub mod cache;
pub mod caching;
pub mod config;
pub mod http;
pub mod memory;

pub use cache::{CacheMeta, FileCache};
pub use caching::CachingFetcher;
pub use config::{CacheConfig, FetchConfig};
pub use http::HttpFetcher;
pub use memory::MemoryFetcher;

use std::sync::Arc;
use xdc_core::Error;

/// Fetches a byte resource by URL.
pub trait ResourceFetcher: Send + Sync {
    /// Fetch the resource at `url`.
    fn fetch(&self, url: &str) -> Result<Option<Vec<u8>>, Error>;

    /// Fetch the resource as UTF-8 text with any leading byte order mark removed.
    fn fetch_text(&self, url: &str) -> Result<Option<String>, Error> {
        match self.fetch(url)? {
            None => Ok(None),
            Some(bytes) => {
                let text = String::from_utf8(bytes)
                    .map_err(|_| Error::MalformedResource(format!("{url} is not UTF-8")))?;
                Ok(Some(match text.strip_prefix('\u{FEFF}') {
                    Some(rest) => rest.to_owned(),
                    None => text,
                }))
            }
        }
    }
}

impl<T: ResourceFetcher + ?Sized> ResourceFetcher for &T {
    fn fetch(&self, url: &str) -> Result<Option<Vec<u8>>, Error> {
        (**self).fetch(url)
    }
}

impl<T: ResourceFetcher + ?Sized> ResourceFetcher for Box<T> {
    fn fetch(&self, url: &str) -> Result<Option<Vec<u8>>, Error> {
        (**self).fetch(url)
    }
}

impl<T: ResourceFetcher + ?Sized> ResourceFetcher for Arc<T> {
    fn fetch(&self, url: &str) -> Result<Option<Vec<u8>>, Error> {
        (**self).fetch(url)
    }
}

/// An HTTP fetcher behind the default file cache.
pub fn default_fetcher(
    fetch: &FetchConfig,
    cache: &CacheConfig,
) -> Result<CachingFetcher<HttpFetcher>, Error> {
    Ok(CachingFetcher::new(
        HttpFetcher::new(fetch)?,
        FileCache::new(cache),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_text_strips_bom() {
        let fetcher = MemoryFetcher::new().with_resource("mem://a", "\u{FEFF}<a/>");
        assert_eq!(fetcher.fetch_text("mem://a").unwrap().as_deref(), Some("<a/>"));
        assert_eq!(fetcher.fetch_text("mem://missing").unwrap(), None);
    }

    #[test]
    fn test_fetch_text_rejects_invalid_utf8() {
        let fetcher = MemoryFetcher::new().with_resource("mem://bin", vec![0xff, 0xfe, 0x00]);
        assert!(matches!(
            fetcher.fetch_text("mem://bin"),
            Err(Error::MalformedResource(_))
        ));
    }

    #[test]
    fn test_shared_fetcher_forwards() {
        let fetcher = Arc::new(MemoryFetcher::new().with_resource("mem://a", "x"));
        let boxed: Box<dyn ResourceFetcher> = Box::new(Arc::clone(&fetcher));
        assert_eq!(boxed.fetch("mem://a").unwrap(), Some(b"x".to_vec()));
        assert_eq!(fetcher.requests(), vec!["mem://a".to_owned()]);
    }
}
