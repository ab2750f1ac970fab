#![forbid(unsafe_code)]

//! Cache-in-front-of-fetcher composition.

use tracing::warn;
use xdc_core::Error;

use crate::cache::FileCache;
use crate::ResourceFetcher;

/// Serves resources from a [`FileCache`], falling back to the wrapped fetcher.
///
/// Only found resources are stored. Not-found and unavailable outcomes are
/// passed through untouched, so the next call asks the network again.
#[derive(Debug, Clone)]
pub struct CachingFetcher<F> {
    inner: F,
    cache: FileCache,
}

impl<F: ResourceFetcher> CachingFetcher<F> {
    pub fn new(inner: F, cache: FileCache) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &FileCache {
        &self.cache
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }
}

impl<F: ResourceFetcher> ResourceFetcher for CachingFetcher<F> {
    fn fetch(&self, url: &str) -> Result<Option<Vec<u8>>, Error> {
        match self.cache.get(url) {
            Ok(Some(content)) => return Ok(Some(content)),
            Ok(None) => {}
            Err(e) => warn!(url, error = %e, "cache read failed"),
        }

        let fetched = self.inner.fetch(url)?;
        if let Some(content) = &fetched {
            if let Err(e) = self.cache.put(url, content) {
                warn!(url, error = %e, "cache write failed");
            }
        }
        Ok(fetched)
    }
}
