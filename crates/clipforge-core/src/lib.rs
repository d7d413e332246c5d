//! Core types for the clipforge media service: models, errors,
//! configuration and telemetry bootstrap.
//!
//! This crate carries no I/O of its own; the processing and store crates
//! build on the types defined here.

pub mod config;
pub mod error;
pub mod models;
pub mod telemetry;

pub use config::{ProcessingConfig, StoreConfig};
pub use error::{AppError, AppResult};
pub use models::{
    Crop, Cut, EditParams, MediaRecord, Quality, Rotate, ThumbnailInfo, VideoMetadata,
};
