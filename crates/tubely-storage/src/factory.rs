use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use std::sync::Arc;
use tubely_core::Config;

/// Create a storage backend from configuration.
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    match config.storage_backend() {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let bucket = config
                .s3_bucket()
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?
                .to_string();
            let region = config
                .s3_region()
                .ok_or_else(|| StorageError::ConfigError("S3_REGION not configured".to_string()))?
                .to_string();
            let distribution = config
                .s3_cf_distribution()
                .ok_or_else(|| {
                    StorageError::ConfigError("S3_CF_DISTRIBUTION not configured".to_string())
                })?
                .to_string();
            let endpoint = config.s3_endpoint().map(|s| s.to_string());

            tracing::info!(
                bucket = %bucket,
                region = %region,
                distribution = %distribution,
                "Initializing S3 storage backend"
            );

            let storage =
                crate::s3::S3Storage::new(bucket, region, endpoint, distribution).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            tracing::info!(
                assets_root = %config.assets_root().display(),
                "Initializing local storage backend"
            );

            let storage = crate::local::LocalStorage::new(
                config.assets_root().clone(),
                config.assets_base_url().to_string(),
            )
            .await?;
            Ok(Arc::new(storage))
        }

        #[allow(unreachable_patterns)]
        backend => Err(StorageError::ConfigError(format!(
            "Storage backend '{}' is not enabled. Enable the corresponding feature flag.",
            backend
        ))),
    }
}
