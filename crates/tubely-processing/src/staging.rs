//! Scratch-file staging for inbound uploads.
//!
//! A [`StagedAsset`] owns its file: dropping the value removes it from disk, so a
//! pipeline that bails out at any point leaves nothing behind.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Staging errors
#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    #[error("Upload exceeds the limit of {limit} bytes")]
    TooLarge { limit: usize },

    #[error("Failed to read upload stream: {0}")]
    Stream(String),

    #[error("Scratch file error: {0}")]
    Io(#[from] io::Error),
}

/// A temporary file owned by exactly one pipeline run.
#[derive(Debug)]
pub struct StagedAsset {
    path: PathBuf,
    size: u64,
}

impl StagedAsset {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path, size: 0 }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Claim `<path><suffix>` next to this asset. Nothing is created on disk;
    /// whatever ends up there is removed with the returned value.
    pub(crate) fn sibling(&self, suffix: &str) -> StagedAsset {
        let mut name = self.path.clone().into_os_string();
        name.push(suffix);
        StagedAsset::new(PathBuf::from(name))
    }

    /// Refresh the recorded length from disk.
    pub(crate) async fn sync_size(&mut self) -> io::Result<u64> {
        self.size = fs::metadata(&self.path).await?.len();
        Ok(self.size)
    }
}

impl Drop for StagedAsset {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Removed staged file");
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove staged file"
                );
            }
        }
    }
}

/// Writes inbound streams to uniquely named files in the scratch directory.
#[derive(Debug, Clone)]
pub struct StagingStore {
    scratch_dir: PathBuf,
}

impl StagingStore {
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Drain `stream` into a fresh scratch file, reading at most `limit` bytes.
    ///
    /// Fails with [`StagingError::TooLarge`] on the first chunk that crosses the
    /// limit. On any error the partial file is removed before returning.
    pub async fn stage<S>(&self, mut stream: S, limit: usize) -> Result<StagedAsset, StagingError>
    where
        S: Stream<Item = Result<Bytes, StagingError>> + Unpin,
    {
        fs::create_dir_all(&self.scratch_dir).await?;

        let path = self
            .scratch_dir
            .join(format!("tubely-upload-{}", Uuid::new_v4()));
        let mut asset = StagedAsset::new(path);

        let mut file: File = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(asset.path())
            .await?;

        let mut written: usize = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            written = written.saturating_add(chunk.len());
            if written > limit {
                tracing::debug!(limit = limit, "Upload exceeded size limit while staging");
                return Err(StagingError::TooLarge { limit });
            }
            file.write_all(&chunk).await?;
        }

        file.flush().await?;
        drop(file);

        asset.size = written as u64;

        tracing::debug!(
            path = %asset.path().display(),
            size_bytes = asset.size,
            "Upload staged"
        );

        Ok(asset)
    }
}
