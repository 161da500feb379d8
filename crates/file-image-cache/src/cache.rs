//! File-based image storage, one file per code

use crate::error::{CacheError, Result};
use crate::types::ImageCode;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tracing::{debug, info, warn};

/// An image cache backed by a flat directory
///
/// Every call goes to the filesystem. Operations on different codes touch
/// different files and never conflict; operations on the same code are not
/// serialized.
pub struct ImageCache {
    /// Directory where cached images are stored
    cache_dir: PathBuf,
    /// Suffix source for temporary files written before the final rename
    tmp_counter: AtomicU64,
}

impl ImageCache {
    /// Create a new image cache rooted at `cache_dir`
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            tmp_counter: AtomicU64::new(0),
        }
    }

    /// Initialize the cache by ensuring the cache directory exists and
    /// clearing temporary files left behind by an interrupted write
    pub async fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| CacheError::Io(Box::new(e)))?;

        let removed = self.remove_stale_tmp_files().await?;
        info!(cache_dir = ?self.cache_dir, removed, "Cache initialized");
        Ok(())
    }

    /// Root directory of the cache
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Path of the file that holds the entry for `code`
    pub fn entry_path(&self, code: &ImageCode) -> PathBuf {
        self.cache_dir.join(code.file_name())
    }

    /// Read the full entry for `code`
    pub async fn read(&self, code: &ImageCode) -> Result<Vec<u8>> {
        let data = fs::read(self.entry_path(code)).await?;
        debug!(code = %code, size = data.len(), "Read cached image");
        Ok(data)
    }

    /// Store `data` as the entry for `code`, replacing any existing entry.
    ///
    /// The bytes land in a temporary file first and are renamed into place,
    /// so readers see either the old entry or the new one.
    pub async fn write(&self, code: &ImageCode, data: &[u8]) -> Result<()> {
        let path = self.entry_path(code);
        let tmp_path = self.tmp_path(code);

        if let Err(e) = fs::write(&tmp_path, data).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(CacheError::Io(Box::new(e)));
        }

        if let Err(e) = fs::rename(&tmp_path, &path).await {
            warn!(code = %code, error = %e, "Failed to move cached image into place");
            let _ = fs::remove_file(&tmp_path).await;
            return Err(CacheError::Io(Box::new(e)));
        }

        debug!(code = %code, size = data.len(), "Cached image");
        Ok(())
    }

    /// Delete the entry for `code`
    pub async fn remove(&self, code: &ImageCode) -> Result<()> {
        match fs::remove_file(self.entry_path(code)).await {
            Ok(()) => {
                debug!(code = %code, "Removed cached image");
                Ok(())
            }
            // A name the filesystem rejects can never have been stored
            Err(e) if e.kind() == io::ErrorKind::InvalidFilename => Err(CacheError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove_stale_tmp_files(&self) -> Result<usize> {
        let mut dir = fs::read_dir(&self.cache_dir)
            .await
            .map_err(|e| CacheError::Io(Box::new(e)))?;
        let mut removed = 0;

        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| CacheError::Io(Box::new(e)))?
        {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !(name.starts_with('.') && name.ends_with(".tmp")) {
                continue;
            }

            match fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(e) => warn!(file = %name, error = %e, "Failed to remove stale temporary file"),
            }
        }

        Ok(removed)
    }

    fn tmp_path(&self, code: &ImageCode) -> PathBuf {
        let n = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        self.cache_dir.join(format!(
            ".{}.{}.{}.tmp",
            code.file_name(),
            std::process::id(),
            n
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn code(raw: &str) -> ImageCode {
        ImageCode::parse(raw).unwrap()
    }

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_init_creates_nested_directory() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("a").join("b");
        let cache = ImageCache::new(root.clone());

        cache.init().await.unwrap();
        assert!(root.is_dir());

        // Idempotent
        cache.init().await.unwrap();
    }

    #[tokio::test]
    async fn test_init_removes_stale_tmp_files() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("200.jpg"), b"kept").unwrap();
        std::fs::write(dir.path().join(".200.jpg.4242.0.tmp"), b"half").unwrap();
        std::fs::write(dir.path().join(".500.jpg.4242.7.tmp"), b"").unwrap();

        let cache = ImageCache::new(dir.path().to_path_buf());
        cache.init().await.unwrap();

        assert_eq!(file_names(dir.path()), vec!["200.jpg"]);
        assert_eq!(cache.read(&code("200")).await.unwrap(), b"kept");
    }

    #[tokio::test]
    async fn test_init_over_a_file_is_io_error() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("not-a-dir");
        std::fs::write(&root, b"").unwrap();

        let cache = ImageCache::new(root);
        let result = cache.init().await;
        assert!(matches!(result, Err(CacheError::Io(_))));
    }

    #[test]
    fn test_cache_dir() {
        let cache = ImageCache::new(PathBuf::from("/var/cache/cats"));
        assert_eq!(cache.cache_dir(), Path::new("/var/cache/cats"));
        assert_eq!(
            cache.entry_path(&code("200")),
            PathBuf::from("/var/cache/cats/200.jpg")
        );
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let dir = tempdir().unwrap();
        let cache = ImageCache::new(dir.path().to_path_buf());
        cache.init().await.unwrap();

        cache.write(&code("200"), b"\xff\xd8jpeg").await.unwrap();

        let data = cache.read(&code("200")).await.unwrap();
        assert_eq!(data, b"\xff\xd8jpeg");
        assert_eq!(file_names(dir.path()), vec!["200.jpg"]);
    }

    #[tokio::test]
    async fn test_write_overwrites() {
        let dir = tempdir().unwrap();
        let cache = ImageCache::new(dir.path().to_path_buf());
        cache.init().await.unwrap();

        cache.write(&code("500"), b"first").await.unwrap();
        cache.write(&code("500"), b"second").await.unwrap();

        assert_eq!(cache.read(&code("500")).await.unwrap(), b"second");
        // No leftover temporary files
        assert_eq!(file_names(dir.path()), vec!["500.jpg"]);
    }

    #[tokio::test]
    async fn test_empty_entry() {
        let dir = tempdir().unwrap();
        let cache = ImageCache::new(dir.path().to_path_buf());
        cache.init().await.unwrap();

        cache.write(&code("204"), b"").await.unwrap();
        assert!(cache.read(&code("204")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_read_missing() {
        let dir = tempdir().unwrap();
        let cache = ImageCache::new(dir.path().to_path_buf());
        cache.init().await.unwrap();

        let result = cache.read(&code("404")).await;
        assert!(matches!(result, Err(CacheError::NotFound)));
    }

    #[tokio::test]
    async fn test_remove() {
        let dir = tempdir().unwrap();
        let cache = ImageCache::new(dir.path().to_path_buf());
        cache.init().await.unwrap();

        cache.write(&code("301"), b"moved").await.unwrap();
        cache.remove(&code("301")).await.unwrap();

        assert!(matches!(
            cache.read(&code("301")).await,
            Err(CacheError::NotFound)
        ));
        assert!(file_names(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_remove_missing() {
        let dir = tempdir().unwrap();
        let cache = ImageCache::new(dir.path().to_path_buf());
        cache.init().await.unwrap();

        let result = cache.remove(&code("999")).await;
        assert!(matches!(result, Err(CacheError::NotFound)));
    }

    #[tokio::test]
    async fn test_remove_name_too_long_is_not_found() {
        let dir = tempdir().unwrap();
        let cache = ImageCache::new(dir.path().to_path_buf());
        cache.init().await.unwrap();

        let result = cache.remove(&code(&"9".repeat(400))).await;
        assert!(matches!(result, Err(CacheError::NotFound)));
    }

    #[tokio::test]
    async fn test_codes_are_independent() {
        let dir = tempdir().unwrap();
        let cache = ImageCache::new(dir.path().to_path_buf());
        cache.init().await.unwrap();

        cache.write(&code("200"), b"ok").await.unwrap();
        cache.write(&code("0200"), b"padded").await.unwrap();
        cache.remove(&code("200")).await.unwrap();

        assert_eq!(cache.read(&code("0200")).await.unwrap(), b"padded");
    }

    #[tokio::test]
    async fn test_write_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let cache = ImageCache::new(dir.path().join("never-created"));

        let result = cache.write(&code("201"), b"data").await;
        assert!(matches!(result, Err(CacheError::Io(_))));
    }
}
