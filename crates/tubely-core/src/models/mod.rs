//! Domain models

pub mod asset;
pub mod video;

pub use asset::{AssetClass, Orientation};
pub use video::{CreateVideoParams, VideoRecord};
