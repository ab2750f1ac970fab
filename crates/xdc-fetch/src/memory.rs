#![forbid(unsafe_code)]

//! In-memory fetcher.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use xdc_core::Error;

use crate::ResourceFetcher;

/// Serves resources from a map. Every requested URL is recorded.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    resources: Mutex<HashMap<String, Vec<u8>>>,
    unavailable: Mutex<HashSet<String>>,
    requests: Mutex<Vec<String>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource(self, url: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(url, content);
        self
    }

    pub fn insert(&self, url: impl Into<String>, content: impl Into<Vec<u8>>) {
        lock(&self.resources).insert(url.into(), content.into());
    }

    /// Report `url` as [`Error::ServiceUnavailable`] from now on.
    pub fn mark_unavailable(&self, url: impl Into<String>) {
        lock(&self.unavailable).insert(url.into());
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        lock(&self.requests).clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }
}

impl ResourceFetcher for MemoryFetcher {
    fn fetch(&self, url: &str) -> Result<Option<Vec<u8>>, Error> {
        lock(&self.requests).push(url.to_owned());
        if lock(&self.unavailable).contains(url) {
            return Err(Error::ServiceUnavailable { url: url.to_owned() });
        }
        Ok(lock(&self.resources).get(url).cloned())
    }
}

// A panic while holding one of these locks cannot leave the maps half-updated.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_requests() {
        let fetcher = MemoryFetcher::new().with_resource("mem://a", "A");
        assert_eq!(fetcher.fetch("mem://a").unwrap(), Some(b"A".to_vec()));
        assert_eq!(fetcher.fetch("mem://b").unwrap(), None);
        assert_eq!(fetcher.requests(), vec!["mem://a", "mem://b"]);
    }

    #[test]
    fn test_unavailable_overrides_content() {
        let fetcher = MemoryFetcher::new().with_resource("mem://a", "A");
        fetcher.mark_unavailable("mem://a");
        assert!(matches!(
            fetcher.fetch("mem://a"),
            Err(Error::ServiceUnavailable { .. })
        ));
    }
}
