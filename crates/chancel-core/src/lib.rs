//! Chancel Core Library
//!
//! Core domain models, error types, and configuration shared across all
//! Chancel components: the media asset entity and its lifecycle state
//! machine, upload-slot types, and the unified application error taxonomy.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{Config, StorageConfig, StorageEndpoint};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{MediaAsset, MediaAssetStatus, MediaKind, UploadSlot};
