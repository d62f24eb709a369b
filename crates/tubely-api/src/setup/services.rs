//! Service wiring

use crate::auth::JwtValidator;
use crate::setup::storage::Stores;
use crate::state::AppState;
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::VideoRepository;
use tubely_processing::{IngestConfig, IngestPipeline, TokioCommandRunner};
use tubely_storage::KeyBuilder;

pub fn initialize_services(
    config: &Config,
    videos: Arc<dyn VideoRepository>,
    stores: Stores,
) -> Arc<AppState> {
    let ingest_config = IngestConfig::from_config(config);
    tracing::info!(
        scratch_dir = %ingest_config.scratch_dir.display(),
        ffmpeg_path = %ingest_config.ffmpeg_path,
        ffprobe_path = %ingest_config.ffprobe_path,
        "Ingestion pipeline configured"
    );

    let pipeline = IngestPipeline::new(
        videos.clone(),
        stores.videos,
        stores.thumbnails,
        Arc::new(TokioCommandRunner),
        KeyBuilder::default(),
        ingest_config,
    );

    Arc::new(AppState {
        config: config.clone(),
        videos,
        pipeline: Arc::new(pipeline),
        jwt: JwtValidator::new(config.jwt_secret()),
    })
}
