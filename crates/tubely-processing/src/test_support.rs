//! Test doubles for external tools and the object store.

use crate::command::{CommandError, CommandOutput, CommandRunner};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Mutex;
use tubely_storage::{Storage, StorageBackend, StorageError, StorageResult};

pub struct ScriptedRunner {
    probe: CommandOutput,
    remux: Option<String>,
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl ScriptedRunner {
    /// ffprobe prints `json`; ffmpeg copies its input to its output.
    pub fn with_probe(json: &str) -> Self {
        Self {
            probe: CommandOutput {
                success: true,
                code: Some(0),
                stdout: json.as_bytes().to_vec(),
                stderr: Vec::new(),
            },
            remux: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_probe(stderr: &str) -> Self {
        let mut runner = Self::with_probe("");
        runner.probe = CommandOutput {
            success: false,
            code: Some(1),
            stdout: Vec::new(),
            stderr: stderr.as_bytes().to_vec(),
        };
        runner
    }

    /// Reports a 16:9 stream, then ffmpeg writes a partial output file and exits non-zero.
    pub fn failing_remux(stderr: &str) -> Self {
        let mut runner = Self::landscape();
        runner.remux = Some(stderr.to_string());
        runner
    }

    pub fn landscape() -> Self {
        Self::with_probe(
            r#"{"streams":[{"codec_type":"video","display_aspect_ratio":"16:9"}]}"#,
        )
    }

    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, CommandError> {
        self.calls
            .lock()
            .unwrap()
            .push((program.to_string(), args.to_vec()));

        if program.ends_with("ffprobe") {
            return Ok(self.probe.clone());
        }

        let input = args
            .iter()
            .position(|a| a == "-i")
            .and_then(|i| args.get(i + 1))
            .cloned()
            .unwrap_or_default();
        let output = args.last().cloned().unwrap_or_default();

        match &self.remux {
            None => {
                std::fs::copy(&input, &output).unwrap();
                Ok(CommandOutput {
                    success: true,
                    code: Some(0),
                    ..Default::default()
                })
            }
            Some(stderr) => {
                std::fs::write(&output, b"partial").unwrap();
                Ok(CommandOutput {
                    success: false,
                    code: Some(1),
                    stdout: Vec::new(),
                    stderr: stderr.as_bytes().to_vec(),
                })
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Upload {
    pub key: String,
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Object store double that keeps every put in memory.
#[derive(Default)]
pub struct RecordingStorage {
    uploads: Mutex<Vec<Upload>>,
    deletes: Mutex<Vec<String>>,
    fail_uploads: bool,
}

impl RecordingStorage {
    pub fn failing() -> Self {
        Self {
            fail_uploads: true,
            ..Default::default()
        }
    }

    pub fn uploads(&self) -> Vec<Upload> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }
}

#[async_trait]
impl Storage for RecordingStorage {
    async fn upload_file(
        &self,
        storage_key: &str,
        path: &Path,
        content_type: &str,
    ) -> StorageResult<String> {
        if self.fail_uploads {
            return Err(StorageError::UploadFailed("bucket unavailable".to_string()));
        }
        let body = std::fs::read(path)?;
        self.uploads.lock().unwrap().push(Upload {
            key: storage_key.to_string(),
            content_type: content_type.to_string(),
            body,
        });
        Ok(self.public_url(storage_key))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.deletes.lock().unwrap().push(storage_key.to_string());
        Ok(())
    }

    fn public_url(&self, storage_key: &str) -> String {
        format!("https://cdn.example.com/{}", storage_key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
