//! Shared setup for API integration tests: real router, in-memory metadata,
//! recording object store, scripted ffmpeg/ffprobe and a temp assets directory.

#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tubely_api::auth::JwtValidator;
use tubely_api::setup::routes::setup_routes;
use tubely_api::AppState;
use tubely_core::config::TubelyConfig;
use tubely_core::{Config, MetadataBackend, StorageBackend};
use tubely_db::{InMemoryVideoRepository, VideoRepository};
use tubely_processing::{
    CommandError, CommandOutput, CommandRunner, IngestConfig, IngestPipeline,
};
use tubely_storage::{KeyBuilder, LocalStorage, Storage, StorageResult};
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters-long";

/// Largest accepted video body in tests.
pub const TEST_MAX_VIDEO_SIZE: usize = 64 * 1024;

pub const LANDSCAPE_PROBE: &str =
    r#"{"streams":[{"codec_type":"video","display_aspect_ratio":"16:9"}]}"#;

pub struct TestApp {
    pub client: TestServer,
    pub state: Arc<AppState>,
    pub repo: Arc<InMemoryVideoRepository>,
    pub video_store: Arc<RecordingStorage>,
    pub runner: Arc<ScriptedRunner>,
    pub scratch_dir: PathBuf,
    pub assets_dir: PathBuf,
    _temp_dir: TempDir,
}

impl TestApp {
    /// Bearer token for `user_id`, valid for an hour.
    pub fn token_for(&self, user_id: Uuid) -> String {
        self.state
            .jwt
            .issue_token(user_id, chrono::Duration::hours(1))
            .expect("Failed to issue test token")
    }

    pub fn scratch_is_clean(&self) -> bool {
        !self.scratch_dir.exists()
            || std::fs::read_dir(&self.scratch_dir)
                .expect("Failed to read scratch dir")
                .next()
                .is_none()
    }

    /// Create a record through the API and return its id.
    pub async fn create_video(&self, user_id: Uuid, title: &str) -> Uuid {
        let response = self
            .client
            .post("/api/videos")
            .add_header("Authorization", format!("Bearer {}", self.token_for(user_id)))
            .json(&serde_json::json!({ "title": title, "description": "test upload" }))
            .await;
        assert_eq!(response.status_code(), 201, "{}", response.text());
        let body: serde_json::Value = response.json();
        body["id"]
            .as_str()
            .and_then(|id| Uuid::parse_str(id).ok())
            .expect("created record has an id")
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with_probe(LANDSCAPE_PROBE).await
}

pub async fn setup_test_app_with_probe(probe_json: &str) -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let scratch_dir = temp_dir.path().join("scratch");
    let assets_dir = temp_dir.path().join("assets");

    let config = Config(Box::new(TubelyConfig {
        server_port: 8091,
        environment: "test".to_string(),
        metadata_backend: MetadataBackend::Memory,
        database_url: None,
        db_max_connections: 1,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        assets_root: assets_dir.clone(),
        assets_base_url: "http://localhost:8091/assets".to_string(),
        storage_backend: StorageBackend::S3,
        s3_bucket: Some("tubely-test".to_string()),
        s3_region: Some("us-east-1".to_string()),
        s3_endpoint: None,
        s3_cf_distribution: Some("cdn.example.com".to_string()),
        scratch_dir: scratch_dir.clone(),
        ffmpeg_path: "ffmpeg".to_string(),
        ffprobe_path: "ffprobe".to_string(),
        max_video_size_bytes: TEST_MAX_VIDEO_SIZE,
        max_thumbnail_size_bytes: 16 * 1024,
    }));

    let repo = Arc::new(InMemoryVideoRepository::new());
    let video_store = Arc::new(RecordingStorage::default());
    let runner = Arc::new(ScriptedRunner::new(probe_json));
    let thumbnails = LocalStorage::new(
        config.assets_root().clone(),
        config.assets_base_url().to_string(),
    )
    .await
    .expect("Failed to create assets storage");

    let pipeline = IngestPipeline::new(
        repo.clone(),
        video_store.clone(),
        Arc::new(thumbnails),
        runner.clone(),
        KeyBuilder::default(),
        IngestConfig::from_config(&config),
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        videos: repo.clone() as Arc<dyn VideoRepository>,
        pipeline: Arc::new(pipeline),
        jwt: JwtValidator::new(config.jwt_secret()),
    });

    let app = setup_routes(&config, state.clone());
    let client = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        client,
        state,
        repo,
        video_store,
        runner,
        scratch_dir,
        assets_dir,
        _temp_dir: temp_dir,
    }
}

/// ffprobe prints a fixed document; ffmpeg copies `-i <input>` to its last argument.
pub struct ScriptedRunner {
    probe_json: String,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new(probe_json: &str) -> Self {
        Self {
            probe_json: probe_json.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Programs invoked so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, CommandError> {
        self.calls.lock().unwrap().push(program.to_string());

        if program.ends_with("ffprobe") {
            return Ok(CommandOutput {
                success: true,
                code: Some(0),
                stdout: self.probe_json.as_bytes().to_vec(),
                stderr: Vec::new(),
            });
        }

        let input = args
            .iter()
            .position(|a| a == "-i")
            .and_then(|i| args.get(i + 1))
            .expect("ffmpeg called without -i");
        let output = args.last().expect("ffmpeg called without output");
        std::fs::copy(input, output).expect("Failed to copy remux input");

        Ok(CommandOutput {
            success: true,
            code: Some(0),
            stdout: Vec::new(),
            stderr: Vec::new(),
        })
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
}

impl RecordingStorage {
    pub fn uploads(&self) -> Vec<Upload> {
        self.uploads.lock().unwrap().clone()
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
        let body = std::fs::read(path)?;
        self.uploads.lock().unwrap().push(Upload {
            key: storage_key.to_string(),
            content_type: content_type.to_string(),
            body,
        });
        Ok(self.public_url(storage_key))
    }

    async fn delete(&self, _storage_key: &str) -> StorageResult<()> {
        Ok(())
    }

    fn public_url(&self, storage_key: &str) -> String {
        format!("https://cdn.example.com/{}", storage_key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
