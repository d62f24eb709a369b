//! Tubely ingestion pipeline
//!
//! Validation, staging, probing, fast-start remuxing and publishing of uploaded
//! assets. [`IngestPipeline`] sequences the stages and owns every temporary file
//! it creates; nothing staged outlives a pipeline run.

pub mod command;
pub mod pipeline;
pub mod staging;
pub mod thumbnail;
pub mod validator;
pub mod video;

pub use command::{CommandError, CommandOutput, CommandRunner, TokioCommandRunner};
pub use pipeline::{IngestConfig, IngestError, IngestPipeline, IngestState, UploadRequest};
pub use staging::{StagedAsset, StagingError, StagingStore};
pub use validator::{validate, MediaValidator, ValidationError};
pub use video::{FastStartTranscoder, GeometryProber, ProbeError, TranscodeError};

#[cfg(test)]
pub(crate) mod test_support;
