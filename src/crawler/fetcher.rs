//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - The `LinkFetcher` trait the crawl workers call
//! - Building HTTP clients from configuration
//! - Content-Type checks that reject non-HTML resources
//! - Resolving a scheme-less root URL to https or http

use crate::config::HttpConfig;
use crate::crawler::parser::extract_links;
use crate::url::{has_http_scheme, parse_http_url};
use crate::UrlError;
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors a fetch attempt can end with
#[derive(Debug, Error)]
pub enum FetchError {
    /// The resource was fetched but is not HTML
    #[error("Expected text/html, got '{content_type}'")]
    ContentTypeMismatch { content_type: String },

    #[error("HTTP status {status}")]
    Http { status: u16 },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Returns true for the content-type rejection, which produces a
    /// rejected page instead of no page at all
    pub fn is_content_mismatch(&self) -> bool {
        matches!(self, Self::ContentTypeMismatch { .. })
    }
}

/// Turns a URL into the absolute URLs it links to
///
/// Implementations handle redirects, decoding, and timeouts themselves.
#[async_trait]
pub trait LinkFetcher: Send + Sync {
    /// Fetches `url` and returns its distinct absolute out-links
    ///
    /// # Errors
    ///
    /// * `FetchError::ContentTypeMismatch` - the resource is not HTML
    /// * any other variant - the fetch failed and produced nothing
    async fn fetch_links(&self, url: &str) -> Result<Vec<String>, FetchError>;
}

/// `LinkFetcher` backed by a `reqwest` client and the HTML link parser
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher with a client configured from `config`
    pub fn from_config(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

#[async_trait]
impl LinkFetcher for HttpFetcher {
    async fn fetch_links(&self, url: &str) -> Result<Vec<String>, FetchError> {
        let base = Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_html(&content_type) {
            return Err(FetchError::ContentTypeMismatch { content_type });
        }

        // Relative links resolve against where we ended up after redirects
        let final_url = response.url().clone();
        let body = response.text().await?;

        tracing::trace!("Fetched {} ({} bytes) from {}", base, body.len(), final_url);
        Ok(extract_links(&body, &final_url))
    }
}

/// Returns true if a Content-Type header value denotes HTML
fn is_html(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("text/html")
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use site_ranker::config::HttpConfig;
/// use site_ranker::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Resolves user input into an absolute root URL
///
/// Input that already carries an http(s) scheme is only parsed. Otherwise
/// `https://<input>` is probed first, then `http://<input>`; the first that
/// answers with a success status wins.
///
/// # Errors
///
/// * `UrlError::Unreachable` - neither scheme answered successfully
/// * any parse error for input that cannot form a URL at all
pub async fn resolve_root_url(client: &Client, input: &str) -> Result<Url, UrlError> {
    let input = input.trim();
    if has_http_scheme(input) {
        return parse_http_url(input);
    }

    for scheme in ["https", "http"] {
        let candidate = parse_http_url(&format!("{}://{}", scheme, input))?;
        match client.get(candidate.clone()).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::info!("Resolved root URL to {}", candidate);
                return Ok(candidate);
            }
            Ok(response) => {
                tracing::debug!("{} answered {}", candidate, response.status());
            }
            Err(e) => {
                tracing::debug!("{} not reachable: {}", candidate, e);
            }
        }
    }

    Err(UrlError::Unreachable(input.to_string()))
}
