use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::path::Path;

/// S3 storage implementation
///
/// Objects are written to the bucket and read back through a CDN distribution,
/// so public URLs take the form `https://{distribution}/{key}`.
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
    distribution: String,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    /// * `distribution` - Host name of the distribution serving the bucket
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
        distribution: String,
    ) -> StorageResult<Self> {
        if bucket.is_empty() {
            return Err(StorageError::ConfigError("S3 bucket is empty".to_string()));
        }

        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region));
        if let Some(ref endpoint) = endpoint_url {
            loader = loader.endpoint_url(endpoint.clone());
        }
        let shared_config = loader.load().await;

        // Path-style addressing for S3-compatible providers behind a custom endpoint
        let s3_config = aws_sdk_s3::config::Builder::from(&shared_config)
            .force_path_style(endpoint_url.is_some())
            .build();

        Ok(S3Storage {
            client: Client::from_conf(s3_config),
            bucket,
            distribution: distribution_host(&distribution).to_string(),
        })
    }
}

/// Bare host of a distribution given with or without a scheme or trailing slash.
fn distribution_host(distribution: &str) -> &str {
    let host = distribution
        .split_once("://")
        .map_or(distribution, |(_, rest)| rest);
    host.trim_end_matches('/')
}

#[async_trait]
impl Storage for S3Storage {
    #[tracing::instrument(skip(self, path), fields(bucket = %self.bucket))]
    async fn upload_file(
        &self,
        storage_key: &str,
        path: &Path,
        content_type: &str,
    ) -> StorageResult<String> {
        let start = std::time::Instant::now();

        let body = ByteStream::from_path(path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to open {}: {}", path.display(), e))
        })?;
        let size = body.size_hint().0;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(storage_key)
            .content_type(content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %storage_key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                StorageError::UploadFailed(e.to_string())
            })?;

        let url = self.public_url(storage_key);

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(url)
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let start = std::time::Instant::now();

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(storage_key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %storage_key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 delete failed"
                );
                StorageError::DeleteFailed(e.to_string())
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    fn public_url(&self, storage_key: &str) -> String {
        format!("https://{}/{}", self.distribution, storage_key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_public_url_uses_distribution_host() {
        let storage = S3Storage::new(
            "tubely-bucket".to_string(),
            "us-east-1".to_string(),
            Some("http://localhost:9000".to_string()),
            "https://d111111abcdef8.cloudfront.net/".to_string(),
        )
        .await
        .unwrap();

        assert_eq!(
            storage.public_url("landscape/abc.mp4"),
            "https://d111111abcdef8.cloudfront.net/landscape/abc.mp4"
        );
        assert_eq!(storage.backend_type(), StorageBackend::S3);
    }

    #[test]
    fn test_distribution_scheme_is_stripped() {
        assert_eq!(distribution_host("cdn.example.com"), "cdn.example.com");
        assert_eq!(distribution_host("https://cdn.example.com/"), "cdn.example.com");
        assert_eq!(distribution_host("http://cdn.example.com"), "cdn.example.com");
        assert_eq!(distribution_host("HTTP://cdn.example.com//"), "cdn.example.com");
    }

    #[tokio::test]
    async fn test_http_distribution_is_served_over_https() {
        let storage = S3Storage::new(
            "tubely-bucket".to_string(),
            "us-east-1".to_string(),
            Some("http://localhost:9000".to_string()),
            "http://cdn.example.com".to_string(),
        )
        .await
        .unwrap();

        assert_eq!(
            storage.public_url("portrait/xyz.mp4"),
            "https://cdn.example.com/portrait/xyz.mp4"
        );
    }

    #[tokio::test]
    async fn test_empty_bucket_is_config_error() {
        let result = S3Storage::new(
            String::new(),
            "us-east-1".to_string(),
            None,
            "cdn.example.com".to_string(),
        )
        .await;
        assert!(matches!(result, Err(StorageError::ConfigError(_))));
    }
}
