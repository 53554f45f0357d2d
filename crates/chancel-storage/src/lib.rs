//! Chancel Storage Library
//!
//! Object Storage Gateway for the ingestion pipeline. Provides the
//! `ObjectStorage` trait and two implementations: an S3-compatible gateway
//! (MinIO, AWS S3) and an in-memory backend for tests and local development.
//!
//! # Endpoints
//!
//! The gateway is configured with two endpoint/credential pairs. The
//! *internal* endpoint is used by this service for puts, stats, and probes;
//! the *public* endpoint is embedded in presigned URLs handed to browsers and
//! mobile clients that cannot reach the internal network. Which endpoint a
//! presigned URL is minted against is an explicit parameter on each call,
//! never runtime detection.
//!
//! # Object name format
//!
//! Object names are `media/{uuid}.{ext}`, one fresh name per upload attempt.
//! Generation is centralized in the `keys` module.

pub mod keys;
pub mod memory;
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use keys::generate_object_name;
pub use memory::MemoryStorage;
pub use s3::S3Gateway;
pub use traits::{
    Endpoint, ObjectNameStream, ObjectStat, ObjectStorage, StorageError, StorageResult,
};
