//! Application state shared by every handler.

use crate::auth::JwtValidator;
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::VideoRepository;
use tubely_processing::IngestPipeline;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub videos: Arc<dyn VideoRepository>,
    pub pipeline: Arc<IngestPipeline>,
    pub jwt: JwtValidator,
}
