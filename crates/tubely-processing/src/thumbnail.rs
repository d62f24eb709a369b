//! Thumbnail ingestion: authorize → validate → stage → publish to the assets
//! directory → update record. No probing or remuxing.

use bytes::Bytes;
use futures::Stream;
use tubely_core::models::{AssetClass, VideoRecord};

use crate::pipeline::{
    log_failure, transition, IngestError, IngestPipeline, IngestState, PublishedUrl, UploadRequest,
};
use crate::staging::StagingError;
use crate::validator::MediaValidator;

impl IngestPipeline {
    /// Store an image upload under `{random-id}{ext}` and point the record's
    /// `thumbnail_url` at it.
    #[tracing::instrument(skip(self, request), fields(video_id = %request.video_id, user_id = %request.user_id))]
    pub async fn ingest_thumbnail<S>(
        &self,
        request: UploadRequest<S>,
    ) -> Result<VideoRecord, IngestError>
    where
        S: Stream<Item = Result<Bytes, StagingError>> + Unpin + Send,
    {
        let video_id = request.video_id;
        let result = self.run_thumbnail(request).await;
        match &result {
            Ok(record) => tracing::info!(
                video_id = %video_id,
                thumbnail_url = record.thumbnail_url.as_deref().unwrap_or_default(),
                "Thumbnail ingestion completed"
            ),
            Err(e) => log_failure(video_id, e),
        }
        result
    }

    async fn run_thumbnail<S>(&self, request: UploadRequest<S>) -> Result<VideoRecord, IngestError>
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

        MediaValidator::new(AssetClass::Image).validate_content_type(&media_type)?;
        transition(video_id, IngestState::Validated);

        let staged = self
            .staging
            .stage(stream, self.config.max_thumbnail_size)
            .await?;
        transition(video_id, IngestState::Staged);

        let key = self.keys.build_asset_key(&media_type);
        transition(video_id, IngestState::KeyAssigned);

        let url = self
            .thumbnail_storage
            .upload_file(key.as_str(), staged.path(), &media_type)
            .await?;
        drop(staged);
        transition(video_id, IngestState::Published);

        let updated = self
            .update_record(
                video_id,
                PublishedUrl::Thumbnail(&url),
                self.thumbnail_storage.as_ref(),
                key.as_str(),
            )
            .await?;
        transition(video_id, IngestState::MetadataUpdated);

        Ok(updated)
    }
}
