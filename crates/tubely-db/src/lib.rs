//! Tubely metadata store
//!
//! Video records live behind the [`VideoRepository`] trait. PostgreSQL is the
//! production backend; the in-memory backend serves local development and tests.

pub mod db;

pub use db::{InMemoryVideoRepository, PgVideoRepository, VideoRepository};
