// crates/network/src/client.rs
//! HTTP client wrapper

use crate::error::{NetworkError, NetworkResult};
use bytes::Bytes;
use reqwest::{Client as ReqwestClient, Response, Url};
use std::time::Duration;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Maximum redirects to follow
    pub max_redirects: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("Chronicle/{}", env!("CARGO_PKG_VERSION")),
            max_redirects: 10,
        }
    }
}

/// HTTP client for content requests
///
/// Requests are made exactly once. Non-success statuses are turned into
/// [`NetworkError::Status`] carrying the status text.
#[derive(Debug, Clone)]
pub struct Client {
    inner: ReqwestClient,
    config: ClientConfig,
}

impl Client {
    /// Creates a new client with default configuration
    pub fn new() -> NetworkResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> NetworkResult<Self> {
        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(NetworkError::Http)?;

        Ok(Self {
            inner: client,
            config,
        })
    }

    /// Returns the active configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Performs a GET request, failing on non-success statuses
    pub async fn get(&self, url: &str) -> NetworkResult<Response> {
        let url = parse_url(url)?;
        log::debug!("GET {}", url);

        let response = self.inner.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            log::debug!("GET {} answered {}", response.url(), status);
            return Err(NetworkError::from_status(status));
        }

        Ok(response)
    }

    /// Performs a GET request and returns the full body
    pub async fn get_bytes(&self, url: &str) -> NetworkResult<Bytes> {
        let response = self.get(url).await?;
        Ok(response.bytes().await?)
    }
}

/// Parses an absolute URL
pub fn parse_url(url: &str) -> NetworkResult<Url> {
    Url::parse(url).map_err(|e| NetworkError::InvalidUrl(format!("{}: {}", url, e)))
}

/// Joins a relative path onto a base URL
///
/// The base is treated as a directory even without a trailing slash, so
/// `https://host/content` + `books/b1.json` gives
/// `https://host/content/books/b1.json`.
pub fn join_url(base: &Url, relative: &str) -> NetworkResult<Url> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    base.join(relative.trim_start_matches('/'))
        .map_err(|e| NetworkError::InvalidUrl(format!("{}: {}", relative, e)))
}
