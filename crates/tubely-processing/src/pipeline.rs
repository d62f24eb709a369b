//! Video ingestion orchestration: authorize → validate → stage → probe → remux →
//! key → publish → update record.
//!
//! Each run is a single attempt. The first failure aborts the run; staged files
//! are released by their owners going out of scope and the record is left as it was.

use bytes::Bytes;
use futures::Stream;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use tubely_core::models::{AssetClass, VideoRecord};
use tubely_core::{AppError, Config};
use tubely_db::VideoRepository;
use tubely_storage::{KeyBuilder, Storage, StorageError};

use crate::command::CommandRunner;
use crate::staging::{StagingError, StagingStore};
use crate::validator::{MediaValidator, ValidationError};
use crate::video::{FastStartTranscoder, GeometryProber, ProbeError, TranscodeError};

/// Settings for the ingestion pipeline.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub scratch_dir: PathBuf,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub max_video_size: usize,
    pub max_thumbnail_size: usize,
}

impl IngestConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            scratch_dir: config.scratch_dir().clone(),
            ffmpeg_path: config.ffmpeg_path().to_string(),
            ffprobe_path: config.ffprobe_path().to_string(),
            max_video_size: config.max_video_size_bytes(),
            max_thumbnail_size: config.max_thumbnail_size_bytes(),
        }
    }
}

/// Pipeline progress, logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestState {
    Received,
    Validated,
    Staged,
    Probed,
    Transcoded,
    KeyAssigned,
    Published,
    MetadataUpdated,
    Failed,
}

impl Display for IngestState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            IngestState::Received => "received",
            IngestState::Validated => "validated",
            IngestState::Staged => "staged",
            IngestState::Probed => "probed",
            IngestState::Transcoded => "transcoded",
            IngestState::KeyAssigned => "key_assigned",
            IngestState::Published => "published",
            IngestState::MetadataUpdated => "metadata_updated",
            IngestState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Which record column a published object's URL goes into.
#[derive(Debug, Clone, Copy)]
pub(crate) enum PublishedUrl<'a> {
    Video(&'a str),
    Thumbnail(&'a str),
}

/// One upload: the declared media type and body of a single multipart file field.
pub struct UploadRequest<S> {
    pub video_id: Uuid,
    pub user_id: Uuid,
    pub media_type: String,
    pub stream: S,
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Video {0} not found")]
    NotFound(Uuid),

    #[error("Not the owner of video {0}")]
    NotOwner(Uuid),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Staging(#[from] StagingError),

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Metadata store error: {0}")]
    Repository(#[source] AppError),
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::NotFound(_) => AppError::NotFound(err.to_string()),
            IngestError::NotOwner(_) => AppError::Forbidden(err.to_string()),
            IngestError::Validation(e) => AppError::InvalidInput(e.to_string()),
            IngestError::Staging(StagingError::TooLarge { .. }) => {
                AppError::PayloadTooLarge(err.to_string())
            }
            IngestError::Staging(StagingError::Stream(e)) => AppError::BadRequest(e),
            IngestError::Staging(StagingError::Io(e)) => AppError::Storage(e.to_string()),
            IngestError::Probe(e) => AppError::ExternalTool(e.to_string()),
            IngestError::Transcode(e) => AppError::ExternalTool(e.to_string()),
            IngestError::Storage(e) => AppError::Storage(e.to_string()),
            IngestError::Repository(e) => e,
        }
    }
}

/// Runs uploads through validation, staging, inspection and publication.
pub struct IngestPipeline {
    pub(crate) videos: Arc<dyn VideoRepository>,
    pub(crate) video_storage: Arc<dyn Storage>,
    pub(crate) thumbnail_storage: Arc<dyn Storage>,
    pub(crate) staging: StagingStore,
    pub(crate) prober: GeometryProber,
    pub(crate) transcoder: FastStartTranscoder,
    pub(crate) keys: KeyBuilder,
    pub(crate) config: IngestConfig,
}

impl IngestPipeline {
    pub fn new(
        videos: Arc<dyn VideoRepository>,
        video_storage: Arc<dyn Storage>,
        thumbnail_storage: Arc<dyn Storage>,
        runner: Arc<dyn CommandRunner>,
        keys: KeyBuilder,
        config: IngestConfig,
    ) -> Self {
        Self {
            videos,
            video_storage,
            thumbnail_storage,
            staging: StagingStore::new(config.scratch_dir.clone()),
            prober: GeometryProber::new(runner.clone(), config.ffprobe_path.clone()),
            transcoder: FastStartTranscoder::new(runner, config.ffmpeg_path.clone()),
            keys,
            config,
        }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Load a record and require `user_id` to own it.
    pub async fn load_owned(&self, video_id: Uuid, user_id: Uuid) -> Result<VideoRecord, IngestError> {
        let record = self
            .videos
            .get_video(video_id)
            .await
            .map_err(IngestError::Repository)?
            .ok_or(IngestError::NotFound(video_id))?;

        if !record.is_owned_by(user_id) {
            tracing::warn!(
                video_id = %video_id,
                user_id = %user_id,
                "Upload rejected: user does not own video"
            );
            return Err(IngestError::NotOwner(video_id));
        }

        Ok(record)
    }

    /// Ingest a video upload and point the record's `video_url` at the published object.
    #[tracing::instrument(skip(self, request), fields(video_id = %request.video_id, user_id = %request.user_id))]
    pub async fn ingest_video<S>(&self, request: UploadRequest<S>) -> Result<VideoRecord, IngestError>
    where
        S: Stream<Item = Result<Bytes, StagingError>> + Unpin + Send,
    {
        let video_id = request.video_id;
        let start = std::time::Instant::now();

        let result = self.run_video(request).await;
        match &result {
            Ok(record) => tracing::info!(
                video_id = %video_id,
                video_url = record.video_url.as_deref().unwrap_or_default(),
                duration_ms = start.elapsed().as_millis() as u64,
                "Video ingestion completed"
            ),
            Err(e) => log_failure(video_id, e),
        }
        result
    }

    async fn run_video<S>(&self, request: UploadRequest<S>) -> Result<VideoRecord, IngestError>
    where
        S: Stream<Item = Result<Bytes, StagingError>> + Unpin + Send,
    {
        let UploadRequest {
            video_id,
            user_id,
            media_type,
            stream,
        } = request;
        transition(video_id, IngestState::Received);

        self.load_owned(video_id, user_id).await?;

        MediaValidator::new(AssetClass::Video).validate_content_type(&media_type)?;
        transition(video_id, IngestState::Validated);

        let staged = self
            .staging
            .stage(stream, self.config.max_video_size)
            .await?;
        tracing::info!(
            video_id = %video_id,
            state = %IngestState::Staged,
            size_bytes = staged.size(),
            "Ingest state transition"
        );

        let orientation = self.prober.probe_orientation(staged.path()).await?;
        tracing::info!(
            video_id = %video_id,
            state = %IngestState::Probed,
            orientation = %orientation,
            "Ingest state transition"
        );

        let processed = self.transcoder.rewrite_for_fast_start(&staged).await?;
        drop(staged);
        transition(video_id, IngestState::Transcoded);

        let key = self.keys.build_key(orientation, &media_type);
        tracing::info!(
            video_id = %video_id,
            state = %IngestState::KeyAssigned,
            key = %key,
            "Ingest state transition"
        );

        let url = self
            .video_storage
            .upload_file(key.as_str(), processed.path(), &media_type)
            .await?;
        transition(video_id, IngestState::Published);

        let updated = self
            .update_record(
                video_id,
                PublishedUrl::Video(&url),
                self.video_storage.as_ref(),
                key.as_str(),
            )
            .await?;
        transition(video_id, IngestState::MetadataUpdated);

        Ok(updated)
    }

    /// Write the published URL into its column only, leaving every other field
    /// as currently stored. On failure remove the object just published under
    /// `key` so nothing unreferenced is left in `storage`.
    pub(crate) async fn update_record(
        &self,
        video_id: Uuid,
        url: PublishedUrl<'_>,
        storage: &dyn Storage,
        key: &str,
    ) -> Result<VideoRecord, IngestError> {
        let result = match url {
            PublishedUrl::Video(url) => self.videos.set_video_url(video_id, url).await,
            PublishedUrl::Thumbnail(url) => self.videos.set_thumbnail_url(video_id, url).await,
        };
        match result {
            Ok(updated) => Ok(updated),
            Err(e) => {
                if let Err(delete_err) = storage.delete(key).await {
                    tracing::error!(
                        error = %delete_err,
                        video_id = %video_id,
                        key = %key,
                        "Failed to remove published object after metadata update failure"
                    );
                }
                Err(IngestError::Repository(e))
            }
        }
    }
}

pub(crate) fn transition(video_id: Uuid, state: IngestState) {
    tracing::info!(video_id = %video_id, state = %state, "Ingest state transition");
}

pub(crate) fn log_failure(video_id: Uuid, err: &IngestError) {
    let reason = err.to_string();
    match err {
        IngestError::NotFound(_)
        | IngestError::NotOwner(_)
        | IngestError::Validation(_)
        | IngestError::Staging(StagingError::TooLarge { .. })
        | IngestError::Staging(StagingError::Stream(_)) => tracing::warn!(
            video_id = %video_id,
            state = %IngestState::Failed,
            reason = %reason,
            "Ingest state transition"
        ),
        _ => tracing::error!(
            video_id = %video_id,
            state = %IngestState::Failed,
            reason = %reason,
            "Ingest state transition"
        ),
    }
}
