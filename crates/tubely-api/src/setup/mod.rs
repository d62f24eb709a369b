//! Application setup and initialization
//!
//! Everything main.rs needs before serving: telemetry, metadata store, object
//! stores, the ingestion pipeline and the router.

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::Config;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry(config.environment());

    // Fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;
    tracing::info!("Configuration loaded and validated successfully");

    let videos = database::setup_repository(&config).await?;
    let stores = storage::setup_storage(&config).await?;
    let state = services::initialize_services(&config, videos, stores);
    let router = routes::setup_routes(&config, state.clone());

    Ok((state, router))
}
