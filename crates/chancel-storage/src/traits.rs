//! Storage abstraction trait
//!
//! This module defines the ObjectStorage trait that all storage backends must
//! implement. The gateway performs no retries itself; every network or
//! credential failure propagates as a typed `StorageError` and callers must
//! not assume a retry happened.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

/// Which configured endpoint a presigned URL is minted against.
///
/// The two endpoints may differ in hostname, TLS termination, and port;
/// selection is a per-call configuration decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Reachable only by trusted backend processes.
    Internal,
    /// Reachable by browsers/mobile clients.
    Public,
}

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Lazy listing of object names. Not restartable: a fresh `list` call
/// re-lists from the start.
pub type ObjectNameStream = Pin<Box<dyn Stream<Item = StorageResult<String>> + Send>>;

/// Metadata for a stored object.
#[derive(Debug, Clone)]
pub struct ObjectStat {
    pub size: u64,
}

/// Storage abstraction trait
///
/// All storage backends (S3/MinIO, in-memory) must implement this trait so
/// the ingestion orchestrator can work with any backend without coupling to
/// implementation details.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Generate a time-limited, single-object PUT URL against the given
    /// endpoint.
    async fn presigned_put_url(
        &self,
        endpoint: Endpoint,
        object_name: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Generate a time-limited GET URL against the given endpoint.
    async fn presigned_get_url(
        &self,
        endpoint: Endpoint,
        object_name: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Deterministic, non-expiring URL, assuming the object lives under the
    /// bucket's public-read prefix. Canonical form: the port is omitted when
    /// it equals the protocol default (80 for HTTP, 443 for HTTPS).
    fn public_url(&self, object_name: &str) -> String;

    /// Upload data under the given object name.
    async fn put(&self, object_name: &str, data: Bytes, content_type: &str) -> StorageResult<()>;

    /// Download an object.
    async fn get(&self, object_name: &str) -> StorageResult<Bytes>;

    /// Delete an object. Deleting a missing object is not an error.
    async fn delete(&self, object_name: &str) -> StorageResult<()>;

    /// Object metadata; `NotFound` if the object does not exist. This is the
    /// existence check the orchestrator runs before submitting to the
    /// transcoding provider.
    async fn stat(&self, object_name: &str) -> StorageResult<ObjectStat>;

    /// Lazily list object names under a prefix.
    async fn list(&self, prefix: &str) -> StorageResult<ObjectNameStream>;

    /// Idempotent initialization: ensure the bucket exists, and if newly
    /// created, apply a read policy scoping public access to the configured
    /// sub-prefix only (never the whole bucket).
    async fn ensure_bucket(&self) -> StorageResult<()>;

    /// Connectivity probe (lists buckets). Used by the fatal startup check.
    async fn probe(&self) -> StorageResult<()>;
}
