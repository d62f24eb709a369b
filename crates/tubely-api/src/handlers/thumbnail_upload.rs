use crate::auth::AuthUser;
use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::parse_video_id;
use crate::utils::upload::{field_stream, multipart_error, parse_media_type};
use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use std::sync::Arc;
use tubely_core::models::VideoRecord;
use tubely_core::AppError;
use tubely_processing::UploadRequest;

const THUMBNAIL_FIELD: &str = "thumbnail";

#[tracing::instrument(
    skip(state, auth, multipart),
    fields(user_id = %auth.user_id, video_id = %video_id, operation = "upload_thumbnail")
)]
pub async fn upload_thumbnail(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(video_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<VideoRecord>, HttpAppError> {
    let video_id = parse_video_id(&video_id)?;
    let limit = state.pipeline.config().max_thumbnail_size;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(THUMBNAIL_FIELD) {
            continue;
        }

        let media_type = parse_media_type(field.content_type())?;
        let record = state
            .pipeline
            .ingest_thumbnail(UploadRequest {
                video_id,
                user_id: auth.user_id,
                media_type,
                stream: field_stream(field, limit),
            })
            .await?;

        return Ok(Json(record));
    }

    Err(AppError::InvalidInput(format!("Missing multipart field '{}'", THUMBNAIL_FIELD)).into())
}
