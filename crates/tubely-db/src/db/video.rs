use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres};
use tubely_core::{models::VideoRecord, AppError};
use uuid::Uuid;

const VIDEO_COLUMNS: &str =
    "id, user_id, title, description, thumbnail_url, video_url, created_at, updated_at";

/// Storage of video metadata records.
///
/// Lookups return `Ok(None)` for a missing record; only backend failures are errors.
#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Insert a new record as given.
    async fn create_video(&self, video: &VideoRecord) -> Result<VideoRecord, AppError>;

    async fn get_video(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError>;

    /// Records owned by `user_id`, newest first.
    async fn list_videos(&self, user_id: Uuid) -> Result<Vec<VideoRecord>, AppError>;

    /// Point `video_url` at `url` and bump `updated_at`. No other column is written.
    ///
    /// Fails with [`AppError::NotFound`] when the record has been removed meanwhile.
    async fn set_video_url(&self, id: Uuid, url: &str) -> Result<VideoRecord, AppError>;

    /// Same as [`VideoRepository::set_video_url`] for `thumbnail_url`.
    async fn set_thumbnail_url(&self, id: Uuid, url: &str) -> Result<VideoRecord, AppError>;

    /// Returns `false` when there was nothing to delete.
    async fn delete_video(&self, id: Uuid) -> Result<bool, AppError>;
}

/// PostgreSQL-backed video repository
#[derive(Clone)]
pub struct PgVideoRepository {
    pool: PgPool,
}

impl PgVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoRepository for PgVideoRepository {
    #[tracing::instrument(skip(self, video), fields(db.table = "videos", db.operation = "insert", db.record_id = %video.id))]
    async fn create_video(&self, video: &VideoRecord) -> Result<VideoRecord, AppError> {
        let record = sqlx::query_as::<Postgres, VideoRecord>(&format!(
            r#"
            INSERT INTO videos (id, user_id, title, description, thumbnail_url, video_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            VIDEO_COLUMNS
        ))
        .bind(video.id)
        .bind(video.user_id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.thumbnail_url)
        .bind(&video.video_url)
        .bind(video.created_at)
        .bind(video.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select", db.record_id = %id))]
    async fn get_video(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError> {
        let record = sqlx::query_as::<Postgres, VideoRecord>(&format!(
            "SELECT {} FROM videos WHERE id = $1",
            VIDEO_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select"))]
    async fn list_videos(&self, user_id: Uuid) -> Result<Vec<VideoRecord>, AppError> {
        let records = sqlx::query_as::<Postgres, VideoRecord>(&format!(
            "SELECT {} FROM videos WHERE user_id = $1 ORDER BY created_at DESC",
            VIDEO_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    #[tracing::instrument(skip(self, url), fields(db.table = "videos", db.operation = "update", db.record_id = %id))]
    async fn set_video_url(&self, id: Uuid, url: &str) -> Result<VideoRecord, AppError> {
        let record = sqlx::query_as::<Postgres, VideoRecord>(&format!(
            r#"
            UPDATE videos
            SET video_url = $2, updated_at = $3
            WHERE id = $1
            RETURNING {}
            "#,
            VIDEO_COLUMNS
        ))
        .bind(id)
        .bind(url)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        record.ok_or_else(|| AppError::NotFound(format!("Video {} not found", id)))
    }

    #[tracing::instrument(skip(self, url), fields(db.table = "videos", db.operation = "update", db.record_id = %id))]
    async fn set_thumbnail_url(&self, id: Uuid, url: &str) -> Result<VideoRecord, AppError> {
        let record = sqlx::query_as::<Postgres, VideoRecord>(&format!(
            r#"
            UPDATE videos
            SET thumbnail_url = $2, updated_at = $3
            WHERE id = $1
            RETURNING {}
            "#,
            VIDEO_COLUMNS
        ))
        .bind(id)
        .bind(url)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        record.ok_or_else(|| AppError::NotFound(format!("Video {} not found", id)))
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "delete", db.record_id = %id))]
    async fn delete_video(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
