//! Geometry probing through ffprobe

use crate::command::{CommandError, CommandRunner};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tubely_core::models::Orientation;

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("ffprobe failed: {0}")]
    ToolFailed(String),

    #[error("Failed to parse ffprobe output: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No video stream found")]
    NoVideoStream,

    #[error("Video stream has no display aspect ratio")]
    MissingAspectRatio,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    #[serde(default)]
    codec_type: Option<String>,
    #[serde(default)]
    display_aspect_ratio: Option<String>,
}

/// Reads the display aspect ratio of the primary video stream.
#[derive(Clone)]
pub struct GeometryProber {
    runner: Arc<dyn CommandRunner>,
    ffprobe_path: String,
}

impl GeometryProber {
    pub fn new(runner: Arc<dyn CommandRunner>, ffprobe_path: impl Into<String>) -> Self {
        Self {
            runner,
            ffprobe_path: ffprobe_path.into(),
        }
    }

    /// `W:H` display aspect ratio of the first stream with `codec_type == "video"`.
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    pub async fn probe_aspect_ratio(&self, path: &Path) -> Result<String, ProbeError> {
        let args = vec![
            "-v".to_string(),
            "error".to_string(),
            "-print_format".to_string(),
            "json".to_string(),
            "-show_streams".to_string(),
            path.to_string_lossy().to_string(),
        ];

        let output = self.runner.run(&self.ffprobe_path, &args).await?;
        if !output.success {
            return Err(ProbeError::ToolFailed(output.stderr_lossy()));
        }

        parse_aspect_ratio(&output.stdout)
    }

    pub async fn probe_orientation(&self, path: &Path) -> Result<Orientation, ProbeError> {
        let ratio = self.probe_aspect_ratio(path).await?;
        let orientation = Orientation::from_aspect_ratio(&ratio);

        tracing::info!(
            aspect_ratio = %ratio,
            orientation = %orientation,
            "Video probe completed"
        );

        Ok(orientation)
    }
}

fn parse_aspect_ratio(stdout: &[u8]) -> Result<String, ProbeError> {
    let probe: ProbeOutput = serde_json::from_slice(stdout)?;

    let stream = probe
        .streams
        .into_iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or(ProbeError::NoVideoStream)?;

    stream
        .display_aspect_ratio
        .filter(|r| !r.trim().is_empty())
        .ok_or(ProbeError::MissingAspectRatio)
}
