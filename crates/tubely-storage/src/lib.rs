//! Tubely Storage Library
//!
//! This crate provides the object storage abstraction used to publish uploaded
//! assets, with implementations for S3 (served through a CDN distribution) and the
//! local assets directory.
//!
//! # Storage key format
//!
//! - **Videos**: `{orientation}/{random-id}{extension}`, e.g. `landscape/3q2-…x.mp4`
//! - **Thumbnails**: `{random-id}{extension}`
//!
//! Keys must not contain `..` or a leading `/`. Key generation is centralized in the
//! `keys` module; backends never invent keys themselves.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::{extension_for, AssetKey, EntropySource, KeyBuilder, OsEntropy};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
pub use tubely_core::StorageBackend;
