//! Upstream feed client
//!
//! Performs a single GET per call against i.mjh.nz style feeds and the Plex
//! channel catalog, buffering the full body before decoding it as JSON.

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use crate::config::Config;
use crate::models::{FeedDocument, PlexCatalogEntry};
use crate::services::metrics;

/// Path of the PBS Kids feed below the upstream base URL
const PBS_KIDS_FEED_PATH: [&str; 2] = ["PBS", ".kids_app.json"];

/// File name of a service feed below `<base>/<service>/`
const FEED_FILE_NAME: &str = ".app.json";

/// Feed fetch error types
#[derive(Debug, Error)]
pub enum FetchError {
    /// Base URL could not be turned into a feed URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// HTTP client could not be built
    #[error("Client error: {0}")]
    Client(String),
    /// Network/connection error
    #[error("Network error: {0}")]
    Network(String),
    /// HTTP error (non-2xx status)
    #[error("HTTP error: {0}")]
    Http(u16),
    /// JSON parsing error
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Client for upstream channel feeds
#[derive(Clone)]
pub struct FeedFetcher {
    http: Client,
    upstream_base_url: String,
    plex_catalog_url: String,
}

impl FeedFetcher {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.fetch_timeout_ms))
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            http,
            upstream_base_url: config.upstream_base_url.clone(),
            plex_catalog_url: config.plex_catalog_url.clone(),
        })
    }

    /// Append path segments to the upstream base URL, percent-encoding each one
    fn upstream_url(&self, segments: &[&str]) -> Result<String, FetchError> {
        let mut url = Url::parse(&self.upstream_base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", self.upstream_base_url, e)))?;

        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(self.upstream_base_url.clone()))?
            .pop_if_empty()
            .extend(segments);

        Ok(url.into())
    }

    /// Feed URL for a service: `<base>/<service>/.app.json`
    pub fn feed_url(&self, service: &str) -> Result<String, FetchError> {
        self.upstream_url(&[service, FEED_FILE_NAME])
    }

    pub fn pbs_kids_url(&self) -> Result<String, FetchError> {
        self.upstream_url(&PBS_KIDS_FEED_PATH)
    }

    /// GET `url` once and decode the whole body as JSON
    async fn get_json<T: DeserializeOwned>(&self, url: &str, target: &str) -> Result<T, FetchError> {
        let result = self.try_get_json(url).await;
        if let Err(e) = &result {
            error!("Upstream fetch failed for {}: {}", url, e);
            metrics::UPSTREAM_FETCH_FAILURES
                .with_label_values(&[target])
                .inc();
        }
        result
    }

    async fn try_get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        debug!("Fetching {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| FetchError::Parse(e.to_string()))
    }

    /// Fetch the `.app.json` feed of a service
    pub async fn fetch_feed(&self, service: &str) -> Result<FeedDocument, FetchError> {
        let url = self.feed_url(service)?;
        self.get_json(&url, "feed").await
    }

    pub async fn fetch_pbs_kids(&self) -> Result<FeedDocument, FetchError> {
        let url = self.pbs_kids_url()?;
        self.get_json(&url, "pbs_kids").await
    }

    /// Fetch the third-party Plex catalog used for genre lookup
    pub async fn fetch_plex_catalog(&self) -> Result<Vec<PlexCatalogEntry>, FetchError> {
        self.get_json(&self.plex_catalog_url, "plex_catalog").await
    }
}
