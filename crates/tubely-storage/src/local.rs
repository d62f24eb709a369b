use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Local filesystem storage backed by the assets directory.
///
/// Objects are served directly by the HTTP server under `base_url`.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance, creating the assets directory if it is missing.
    ///
    /// # Arguments
    /// * `base_path` - Root directory for assets (e.g., "./assets")
    /// * `base_url` - Base URL for serving assets (e.g., "http://localhost:8091/assets")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create assets directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Convert storage key to filesystem path, rejecting anything that could
    /// escape the assets directory.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.is_empty() || storage_key.contains("..") || storage_key.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        let relative = Path::new(storage_key);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::InvalidKey(
                "Storage key resolves outside storage directory".to_string(),
            ));
        }

        Ok(self.base_path.join(relative))
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload_file(
        &self,
        storage_key: &str,
        path: &Path,
        _content_type: &str,
    ) -> StorageResult<String> {
        let dest = self.key_to_path(storage_key)?;
        self.ensure_parent_dir(&dest).await?;

        let start = std::time::Instant::now();

        let size = fs::copy(path, &dest).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to copy {} to {}: {}",
                path.display(),
                dest.display(),
                e
            ))
        })?;

        let url = self.public_url(storage_key);

        tracing::info!(
            path = %dest.display(),
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(url)
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(StorageError::DeleteFailed(format!(
                    "Failed to delete file {}: {}",
                    path.display(),
                    e
                )))
            }
        }

        tracing::info!(key = %storage_key, "Local storage delete successful");
        Ok(())
    }

    fn public_url(&self, storage_key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), storage_key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn storage() -> (TempDir, LocalStorage) {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(
            temp_dir.path().join("assets"),
            "http://localhost:8091/assets/".to_string(),
        )
        .await
        .unwrap();
        (temp_dir, storage)
    }

    #[tokio::test]
    async fn test_new_creates_assets_dir() {
        let (temp_dir, _storage) = storage().await;
        assert!(temp_dir.path().join("assets").is_dir());
    }

    #[tokio::test]
    async fn test_upload_file_copies_and_returns_url() {
        let (temp_dir, storage) = storage().await;
        let source = temp_dir.path().join("source.png");
        tokio::fs::write(&source, b"png-bytes").await.unwrap();

        let url = storage
            .upload_file("landscape/abc.png", &source, "image/png")
            .await
            .unwrap();

        assert_eq!(url, "http://localhost:8091/assets/landscape/abc.png");
        let stored = temp_dir.path().join("assets/landscape/abc.png");
        assert_eq!(tokio::fs::read(stored).await.unwrap(), b"png-bytes");
        // the source is left for its owner to remove
        assert!(source.exists());
    }

    #[tokio::test]
    async fn test_rejects_traversal_keys() {
        let (temp_dir, storage) = storage().await;
        let source = temp_dir.path().join("source.png");
        tokio::fs::write(&source, b"x").await.unwrap();

        for key in ["../escape.png", "/etc/passwd", "a/../../b", ""] {
            let result = storage.upload_file(key, &source, "image/png").await;
            assert!(
                matches!(result, Err(StorageError::InvalidKey(_))),
                "key {key:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (temp_dir, storage) = storage().await;
        let source = temp_dir.path().join("source.mp4");
        tokio::fs::write(&source, b"x").await.unwrap();
        storage
            .upload_file("other/v.mp4", &source, "video/mp4")
            .await
            .unwrap();

        storage.delete("other/v.mp4").await.unwrap();
        assert!(!temp_dir.path().join("assets/other/v.mp4").exists());
        storage.delete("other/v.mp4").await.unwrap();
    }

    #[tokio::test]
    async fn test_upload_missing_source_fails() {
        let (temp_dir, storage) = storage().await;
        let result = storage
            .upload_file("x.mp4", &temp_dir.path().join("missing.mp4"), "video/mp4")
            .await;
        assert!(matches!(result, Err(StorageError::UploadFailed(_))));
    }
}
