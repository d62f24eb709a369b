//! Video inspection and container rewriting

pub mod faststart;
pub mod probe;

pub use faststart::{FastStartTranscoder, TranscodeError};
pub use probe::{GeometryProber, ProbeError};
