//! Common utilities for file upload handlers

use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;
use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use tubely_core::AppError;
use tubely_processing::StagingError;

/// Media type of a multipart part, without parameters (`image/png; q=1` -> `image/png`).
pub fn parse_media_type(content_type: Option<&str>) -> Result<String, AppError> {
    let raw = content_type
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Missing Content-Type for file".to_string()))?;

    let mime: mime::Mime = raw
        .parse()
        .map_err(|e| AppError::InvalidInput(format!("Invalid Content-Type '{}': {}", raw, e)))?;

    Ok(mime.essence_str().to_string())
}

/// Body of a file field as a stream the staging area can consume.
///
/// `limit` is reported when the request body limit trips before staging does.
pub fn field_stream(field: Field<'_>, limit: usize) -> BoxStream<'_, Result<Bytes, StagingError>> {
    field
        .map_err(move |err| {
            // RequestBodyLimitLayer surfaces as a multipart error carrying 413.
            if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
                StagingError::TooLarge { limit }
            } else {
                StagingError::Stream(err.body_text())
            }
        })
        .boxed()
}

pub fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(format!("Failed to read multipart: {}", err.body_text()))
    }
}
