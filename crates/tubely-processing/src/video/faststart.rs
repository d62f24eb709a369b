//! Fast-start remuxing through ffmpeg

use crate::command::{CommandError, CommandRunner};
use crate::staging::StagedAsset;
use std::sync::Arc;

/// Suffix of the remuxed output, placed next to its input.
pub const PROCESSING_SUFFIX: &str = ".processing";

#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("ffmpeg failed: {0}")]
    ToolFailed(String),

    #[error("ffmpeg produced no output: {0}")]
    MissingOutput(#[source] std::io::Error),
}

/// Moves the container index to the front of the file for progressive playback.
///
/// Streams are copied, never re-encoded.
#[derive(Clone)]
pub struct FastStartTranscoder {
    runner: Arc<dyn CommandRunner>,
    ffmpeg_path: String,
}

impl FastStartTranscoder {
    pub fn new(runner: Arc<dyn CommandRunner>, ffmpeg_path: impl Into<String>) -> Self {
        Self {
            runner,
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    /// Remux `input` into `<input>.processing`. The input is left untouched and
    /// the output is a new staged asset owned by the caller.
    #[tracing::instrument(skip(self, input), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "faststart"
    ))]
    pub async fn rewrite_for_fast_start(
        &self,
        input: &StagedAsset,
    ) -> Result<StagedAsset, TranscodeError> {
        let start = std::time::Instant::now();

        // Claimed before ffmpeg runs so a half-written output is removed too.
        let mut output = input.sibling(PROCESSING_SUFFIX);

        let args = vec![
            "-y".to_string(),
            "-i".to_string(),
            input.path().to_string_lossy().to_string(),
            "-c".to_string(),
            "copy".to_string(),
            "-movflags".to_string(),
            "faststart".to_string(),
            "-f".to_string(),
            "mp4".to_string(),
            output.path().to_string_lossy().to_string(),
        ];

        let result = self.runner.run(&self.ffmpeg_path, &args).await?;
        if !result.success {
            return Err(TranscodeError::ToolFailed(result.stderr_lossy()));
        }

        let size = output
            .sync_size()
            .await
            .map_err(TranscodeError::MissingOutput)?;

        tracing::info!(
            input_size_bytes = input.size(),
            size_bytes = size,
            duration_ms = start.elapsed().as_millis() as u64,
            "Fast-start remux completed"
        );

        Ok(output)
    }
}
