//! Object store setup

use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::Config;
use tubely_storage::{create_storage, LocalStorage, Storage};

/// Published videos go to the configured backend; thumbnails always live in the
/// local assets directory served under `/assets`.
pub struct Stores {
    pub videos: Arc<dyn Storage>,
    pub thumbnails: Arc<dyn Storage>,
}

pub async fn setup_storage(config: &Config) -> Result<Stores> {
    tracing::info!("Initializing storage...");

    let thumbnails = LocalStorage::new(
        config.assets_root().clone(),
        config.assets_base_url().to_string(),
    )
    .await
    .with_context(|| {
        format!(
            "Failed to prepare assets directory {}",
            config.assets_root().display()
        )
    })?;

    let videos = create_storage(config)
        .await
        .context("Failed to initialize video storage")?;

    tracing::info!(
        backend = ?videos.backend_type(),
        assets_root = %config.assets_root().display(),
        "Storage initialized successfully"
    );

    Ok(Stores {
        videos,
        thumbnails: Arc::new(thumbnails),
    })
}
