//! Tubely HTTP API
//!
//! Video record CRUD, authenticated video and thumbnail ingestion, and static
//! serving of locally stored assets.

pub mod auth;
pub mod error;
mod handlers;
pub mod setup;
pub mod state;
pub mod telemetry;
mod utils;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
