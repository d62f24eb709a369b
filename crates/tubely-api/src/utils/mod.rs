pub mod upload;

use tubely_core::AppError;
use uuid::Uuid;

/// Parse a `{videoID}` path segment.
pub fn parse_video_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidInput(format!("Invalid video ID: {}", raw)))
}
