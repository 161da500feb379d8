//! Cache-backed image fetching with remote fallback

use crate::error::AppError;
use file_image_cache::{CacheError, ImageCache, ImageCode};
use http_cat_client::ImageSource;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where a served image came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    /// Value for the `X-Cache` response header
    pub fn as_header(self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

/// Reads, writes and deletes cached images, falling back to the remote
/// source when a read misses.
///
/// Concurrent requests for the same code are not coordinated: two reads
/// that both miss will both hit the remote source.
pub struct ImageFetcher {
    cache: ImageCache,
    source: Arc<dyn ImageSource>,
}

impl ImageFetcher {
    pub fn new(cache: ImageCache, source: Arc<dyn ImageSource>) -> Self {
        Self { cache, source }
    }

    /// Serve an image from the cache, or fetch it remotely and cache it
    pub async fn read(&self, code: &ImageCode) -> Result<(Vec<u8>, CacheStatus), AppError> {
        match self.cache.read(code).await {
            Ok(data) => {
                debug!(code = %code, "Cache hit");
                return Ok((data, CacheStatus::Hit));
            }
            Err(CacheError::NotFound) => {
                debug!(code = %code, "Cache miss");
            }
            Err(e) => {
                // Unreadable entries are refetched rather than failing the request
                warn!(code = %code, error = %e, "Failed to read cached image, treating as miss");
            }
        }

        let data = self.source.fetch(code.as_str()).await.map_err(|e| {
            warn!(code = %code, error = %e, "Failed to fetch image from remote source");
            AppError::NotFound
        })?;

        if let Err(e) = self.cache.write(code, &data).await {
            warn!(code = %code, error = %e, "Failed to cache fetched image");
            // Continue even if caching fails
        } else {
            info!(code = %code, size = data.len(), "Cached image from remote source");
        }

        Ok((data, CacheStatus::Miss))
    }

    /// Store an uploaded image, replacing any existing entry
    pub async fn write(&self, code: &ImageCode, data: &[u8]) -> Result<(), AppError> {
        self.cache
            .write(code, data)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        info!(code = %code, size = data.len(), "Saved image");
        Ok(())
    }

    /// Remove a cached image
    pub async fn delete(&self, code: &ImageCode) -> Result<(), AppError> {
        match self.cache.remove(code).await {
            Ok(()) => {
                info!(code = %code, "Deleted image");
                Ok(())
            }
            Err(CacheError::NotFound) => Err(AppError::NotFound),
            Err(e) => Err(AppError::Internal(e.to_string())),
        }
    }
}
