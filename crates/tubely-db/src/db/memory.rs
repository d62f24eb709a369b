use super::video::VideoRepository;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tubely_core::{models::VideoRecord, AppError};
use uuid::Uuid;

/// Process-local video repository. Records are lost on restart.
#[derive(Clone, Default)]
pub struct InMemoryVideoRepository {
    videos: Arc<RwLock<HashMap<Uuid, VideoRecord>>>,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn modify(
        &self,
        id: Uuid,
        apply: impl FnOnce(&mut VideoRecord),
    ) -> Result<VideoRecord, AppError> {
        let mut videos = self.videos.write().await;
        let existing = videos
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", id)))?;

        apply(existing);
        existing.updated_at = Utc::now();

        Ok(existing.clone())
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn create_video(&self, video: &VideoRecord) -> Result<VideoRecord, AppError> {
        let mut videos = self.videos.write().await;
        if videos.contains_key(&video.id) {
            return Err(AppError::Database(format!(
                "Video {} already exists",
                video.id
            )));
        }
        videos.insert(video.id, video.clone());
        Ok(video.clone())
    }

    async fn get_video(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError> {
        Ok(self.videos.read().await.get(&id).cloned())
    }

    async fn list_videos(&self, user_id: Uuid) -> Result<Vec<VideoRecord>, AppError> {
        let mut records: Vec<VideoRecord> = self
            .videos
            .read()
            .await
            .values()
            .filter(|v| v.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn set_video_url(&self, id: Uuid, url: &str) -> Result<VideoRecord, AppError> {
        self.modify(id, |record| record.video_url = Some(url.to_string()))
            .await
    }

    async fn set_thumbnail_url(&self, id: Uuid, url: &str) -> Result<VideoRecord, AppError> {
        self.modify(id, |record| record.thumbnail_url = Some(url.to_string()))
            .await
    }

    async fn delete_video(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.videos.write().await.remove(&id).is_some())
    }
}
