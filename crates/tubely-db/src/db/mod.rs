//! Database repositories for data access layer
//
// Repository trait and PostgreSQL implementation
pub mod video;
//
// In-memory implementation
pub mod memory;

pub use memory::InMemoryVideoRepository;
pub use video::{PgVideoRepository, VideoRepository};
