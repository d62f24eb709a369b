//! Video record CRUD

use crate::auth::AuthUser;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use crate::utils::parse_video_id;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tubely_core::models::{CreateVideoParams, VideoRecord};
use tubely_core::AppError;

const MAX_TITLE_LEN: usize = 255;

#[tracing::instrument(skip(state, auth, params), fields(user_id = %auth.user_id))]
pub async fn create_video(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidatedJson(params): ValidatedJson<CreateVideoParams>,
) -> Result<(StatusCode, Json<VideoRecord>), HttpAppError> {
    let title = params.title.trim();
    if title.is_empty() {
        return Err(AppError::InvalidInput("Title is required".to_string()).into());
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::InvalidInput(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LEN
        ))
        .into());
    }

    let record = VideoRecord::new(
        auth.user_id,
        CreateVideoParams {
            title: title.to_string(),
            description: params.description,
        },
    );
    let created = state.videos.create_video(&record).await?;
    tracing::info!(video_id = %created.id, "Video record created");

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_videos(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<Vec<VideoRecord>>, HttpAppError> {
    let videos = state.videos.list_videos(auth.user_id).await?;
    Ok(Json(videos))
}

pub async fn get_video(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
) -> Result<Json<VideoRecord>, HttpAppError> {
    let video_id = parse_video_id(&video_id)?;
    state
        .videos
        .get_video(video_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)).into())
}

#[tracing::instrument(skip(state, auth), fields(user_id = %auth.user_id, video_id = %video_id))]
pub async fn delete_video(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(video_id): Path<String>,
) -> Result<StatusCode, HttpAppError> {
    let video_id = parse_video_id(&video_id)?;
    let record = state
        .videos
        .get_video(video_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))?;

    if !record.is_owned_by(auth.user_id) {
        return Err(AppError::Forbidden("You are not the owner of this video".to_string()).into());
    }

    if !state.videos.delete_video(video_id).await? {
        return Err(AppError::NotFound(format!("Video {} not found", video_id)).into());
    }
    tracing::info!("Video record deleted");

    Ok(StatusCode::NO_CONTENT)
}
