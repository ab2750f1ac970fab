#![forbid(unsafe_code)]

//! Blocking HTTP fetcher.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use tracing::{debug, warn};
use xdc_core::Error;

use crate::config::FetchConfig;
use crate::ResourceFetcher;

/// Fetches resources over HTTP(S).
///
/// Transport failures and non-success statuses are reported as not-found.
/// HTTP 503, and HTML bodies containing one of the configured outage
/// markers, are reported as [`Error::ServiceUnavailable`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    markers: Vec<String>,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, Error> {
        let mut default_headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| Error::Other(format!("invalid user agent: {e}")))?;
        default_headers.insert(USER_AGENT, agent);

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|e| Error::Other(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            markers: config
                .unavailable_markers
                .iter()
                .map(|m| m.to_lowercase())
                .collect(),
        })
    }
}

impl ResourceFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Option<Vec<u8>>, Error> {
        debug!(url, "fetching resource");
        let response = match self.client.get(url).send() {
            Ok(response) => response,
            Err(e) => {
                warn!(url, error = %e, "request failed");
                return Ok(None);
            }
        };

        let status = response.status().as_u16();
        let html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("html"));
        let body = match response.bytes() {
            Ok(body) => body.to_vec(),
            Err(e) => {
                warn!(url, error = %e, "failed to read response body");
                return Ok(None);
            }
        };

        classify_response(url, status, html, body, &self.markers)
    }
}

/// Decide what a response means for the caller.
pub(crate) fn classify_response(
    url: &str,
    status: u16,
    html_content_type: bool,
    body: Vec<u8>,
    markers: &[String],
) -> Result<Option<Vec<u8>>, Error> {
    if status == 503 {
        warn!(url, status, "service unavailable");
        return Err(Error::ServiceUnavailable { url: url.to_owned() });
    }
    if !(200..300).contains(&status) {
        debug!(url, status, "resource not found");
        return Ok(None);
    }
    if (html_content_type || looks_like_html(&body)) && contains_marker(&body, markers) {
        warn!(url, "outage page returned instead of resource");
        return Err(Error::ServiceUnavailable { url: url.to_owned() });
    }
    Ok(Some(body))
}

fn looks_like_html(body: &[u8]) -> bool {
    let head = String::from_utf8_lossy(&body[..body.len().min(512)]).to_ascii_lowercase();
    let head = head.trim_start_matches('\u{FEFF}').trim_start();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}

fn contains_marker(body: &[u8], markers: &[String]) -> bool {
    let text = String::from_utf8_lossy(body).to_lowercase();
    markers.iter().any(|m| text.contains(m.as_str()))
}
