//! Remote image fetching

use crate::error::{ImageSourceError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// A read-only source of status code images, consulted on cache miss
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Fetch the raw image bytes for `code`
    async fn fetch(&self, code: &str) -> Result<Vec<u8>>;
}

/// HTTP client for an http.cat-style image service
pub struct HttpCatClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpCatClient {
    /// Public http.cat instance
    pub const DEFAULT_BASE_URL: &'static str = "https://http.cat";

    /// Create a client against the public service (30 second timeout)
    pub fn new() -> Result<Self> {
        Self::with_base_url(Self::DEFAULT_BASE_URL, Duration::from_secs(30))
    }

    /// Create a client against a custom base URL with a request timeout
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn image_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url, code)
    }
}

#[async_trait]
impl ImageSource for HttpCatClient {
    async fn fetch(&self, code: &str) -> Result<Vec<u8>> {
        let url = self.image_url(code);
        debug!(url = %url, "Fetching image from remote source");

        let response = self.http.get(&url).send().await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), url = %url, "Remote source rejected image request");
            return Err(ImageSourceError::Status(response.status().as_u16()));
        }

        let data = response.bytes().await?.to_vec();

        debug!(size = data.len(), url = %url, "Fetched image from remote source");

        Ok(data)
    }
}
