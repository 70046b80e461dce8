//! HTTP page fetcher for the YouTube Data API
//!
//! This module handles all HTTP requests to the upstream API:
//! - Building the HTTP client with finite request and connect timeouts
//! - Issuing one GET per page against a list endpoint
//! - Classifying failures as transport or malformed-response errors
//!
//! There is no retry: a failed fetch aborts the traversal that issued it.

use crate::config::YouTubeConfig;
use crate::youtube::types::Page;
use crate::{ConfigError, HarvestError, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use url::Url;

/// Longest slice of an error body carried into an error message
const MAX_ERROR_BODY: usize = 512;

/// The two list endpoints the pipeline reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `playlistItems.list`, filtered by `playlistId`
    PlaylistItems,
    /// `videos.list`, filtered by `id`
    Videos,
}

impl Endpoint {
    /// Path relative to the API base URL
    pub fn path(&self) -> &'static str {
        match self {
            Self::PlaylistItems => "playlistItems",
            Self::Videos => "videos",
        }
    }

    /// The `part` selector requested from this endpoint
    pub fn part(&self) -> &'static str {
        match self {
            Self::PlaylistItems => "contentDetails",
            Self::Videos => "snippet,statistics",
        }
    }

    /// Whether `maxResults` may be sent; `videos.list` rejects it alongside `id`
    pub fn supports_page_size(&self) -> bool {
        matches!(self, Self::PlaylistItems)
    }

    /// Query parameter carrying this endpoint's filter value
    pub fn filter_param(&self) -> &'static str {
        match self {
            Self::PlaylistItems => "playlistId",
            Self::Videos => "id",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A list request: an endpoint plus its filter value
///
/// The cursor is not part of the request; it is supplied per page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub endpoint: Endpoint,
    pub filter: String,
}

impl ListRequest {
    pub fn playlist_items(playlist_id: &str) -> Self {
        Self {
            endpoint: Endpoint::PlaylistItems,
            filter: playlist_id.to_string(),
        }
    }

    pub fn videos(video_id: &str) -> Self {
        Self {
            endpoint: Endpoint::Videos,
            filter: video_id.to_string(),
        }
    }
}

/// Builds an HTTP client with the configured timeouts
///
/// # Arguments
///
/// * `config` - The upstream API configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &YouTubeConfig) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .timeout(config.request_timeout())
        .connect_timeout(config.connect_timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Client for the playlistItems and videos list endpoints
#[derive(Debug)]
pub struct YouTubeClient {
    client: Client,
    base_url: Url,
    api_key: String,
    max_results: Option<u32>,
    fetches: AtomicU64,
}

impl YouTubeClient {
    /// Creates a client with its own HTTP connection pool
    pub fn new(config: &YouTubeConfig) -> Result<Self> {
        let client = build_http_client(config)?;
        Self::with_client(client, config)
    }

    /// Creates a client around an existing HTTP client
    pub fn with_client(client: Client, config: &YouTubeConfig) -> Result<Self> {
        let mut base_url = Url::parse(&config.base_url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid base-url '{}': {}", config.base_url, e))
        })?;

        // Url::join drops the last segment unless the path ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
            max_results: config.max_results,
            fetches: AtomicU64::new(0),
        })
    }

    /// Number of page requests issued so far
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }

    /// Fetches one page of a list endpoint
    ///
    /// # Request Flow
    ///
    /// 1. GET `{base}/{endpoint}` with `key`, `part`, the filter parameter,
    ///    `maxResults` when configured and `pageToken` when `cursor` is set
    /// 2. Non-2xx status → `Transport`
    /// 3. Body decoded as JSON; not JSON or no `items` → `MalformedResponse`
    ///
    /// # Arguments
    ///
    /// * `request` - The endpoint and its filter value
    /// * `cursor` - Page token from the previous page, `None` for the first page
    pub async fn fetch_page<T>(&self, request: &ListRequest, cursor: Option<&str>) -> Result<Page<T>>
    where
        T: DeserializeOwned,
    {
        let endpoint = request.endpoint.path();
        let url = self.base_url.join(endpoint).map_err(|e| {
            ConfigError::InvalidUrl(format!("Cannot resolve endpoint '{}': {}", endpoint, e))
        })?;

        let max_results = self
            .max_results
            .filter(|_| request.endpoint.supports_page_size())
            .map(|n| n.to_string());
        let mut query: Vec<(&str, &str)> = vec![
            ("key", self.api_key.as_str()),
            ("part", request.endpoint.part()),
            (request.endpoint.filter_param(), request.filter.as_str()),
        ];
        if let Some(max_results) = max_results.as_deref() {
            query.push(("maxResults", max_results));
        }
        if let Some(token) = cursor {
            query.push(("pageToken", token));
        }

        self.fetches.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            endpoint,
            filter = %request.filter,
            cursor = cursor.unwrap_or("<first>"),
            "fetching page"
        );

        let response = self
            .client
            .get(url)
            .query(&query)
            .send()
            .await
            .map_err(|e| HarvestError::transport(endpoint, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| HarvestError::transport(endpoint, e))?;

        if !status.is_success() {
            return Err(HarvestError::Transport {
                endpoint: endpoint.to_string(),
                message: format!("HTTP {}: {}", status.as_u16(), truncate(&body)),
            });
        }

        tracing::debug!(endpoint, payload = %body, "GOT page");

        let page: Page<T> = serde_json::from_str(&body)
            .map_err(|e| HarvestError::malformed(endpoint, e.to_string()))?;

        tracing::debug!(
            endpoint,
            items = page.items.len(),
            has_next = page.next_page_token.is_some(),
            "decoded page"
        );

        Ok(page)
    }
}

fn truncate(body: &str) -> &str {
    if body.len() <= MAX_ERROR_BODY {
        return body;
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
