//! Transcoding provider abstraction.
//!
//! The provider's `status` field is the only authoritative signal of
//! processing completion; there is no push notification in this design.
//! Callers poll `get_asset` on demand.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Playback visibility for the produced asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackPolicy {
    Public,
    Signed,
}

impl PlaybackPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            PlaybackPolicy::Public => "public",
            PlaybackPolicy::Signed => "signed",
        }
    }
}

/// Submission settings.
#[derive(Debug, Clone)]
pub struct SubmitOptions {
    pub policy: PlaybackPolicy,
    /// Whether the provider should also produce a progressive-download
    /// (MP4) variant alongside the streaming renditions.
    pub progressive_download: bool,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        SubmitOptions {
            policy: PlaybackPolicy::Public,
            progressive_download: false,
        }
    }
}

/// Coarse provider state, mapped from the provider's raw status string.
/// Unknown strings map to `Preparing` so a new intermediate state introduced
/// upstream never gets mistaken for a terminal one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderStatus {
    Preparing,
    Ready,
    Errored,
}

impl ProviderStatus {
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "ready" => ProviderStatus::Ready,
            "errored" => ProviderStatus::Errored,
            _ => ProviderStatus::Preparing,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ProviderStatus::Ready | ProviderStatus::Errored)
    }
}

/// Provider view of an asset.
#[derive(Debug, Clone)]
pub struct ProviderAsset {
    pub provider_asset_id: String,
    /// `None` until the provider allocates one; "not yet derivable", never an
    /// error.
    pub playback_id: Option<String>,
    pub status: ProviderStatus,
    /// The raw status string, kept verbatim for display.
    pub raw_status: String,
    pub duration_seconds: Option<f64>,
    pub aspect_ratio: Option<String>,
    pub max_resolution: Option<String>,
    /// Provider error detail when `status` is `Errored`.
    pub error_message: Option<String>,
}

/// A provider-native direct-upload slot (bypasses the object-storage hop).
#[derive(Debug, Clone)]
pub struct DirectUpload {
    pub upload_id: String,
    /// PUT target for the raw bytes. Absent when querying status after the
    /// upload already completed.
    pub upload_url: Option<String>,
    pub raw_status: String,
    /// Set once the provider has turned the upload into an asset.
    pub asset_id: Option<String>,
}

/// Provider errors. The provider's own message is preserved so it can be
/// surfaced to the operator unchanged.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider authentication failed: {0}")]
    Unauthorized(String),

    #[error("Provider request failed: {0}")]
    Request(String),

    #[error("Provider rejected the request ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode provider response: {0}")]
    Decode(String),
}

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Transcoding provider abstraction.
#[async_trait]
pub trait TranscodeProvider: Send + Sync {
    /// Submit a source URL for ingestion. The returned `playback_id` may be
    /// absent even though submission succeeded.
    async fn submit_from_url(
        &self,
        source_url: &str,
        options: &SubmitOptions,
    ) -> ProviderResult<ProviderAsset>;

    /// Fetch the provider's current view of an asset.
    async fn get_asset(&self, provider_asset_id: &str) -> ProviderResult<ProviderAsset>;

    /// Delete an asset; the only way to stop consuming provider resources
    /// once submitted.
    async fn delete_asset(&self, provider_asset_id: &str) -> ProviderResult<()>;

    /// Create a direct-upload slot so a client can upload straight to the
    /// provider.
    async fn create_direct_upload(&self, options: &SubmitOptions) -> ProviderResult<DirectUpload>;

    /// Query the state of a direct upload.
    async fn get_direct_upload(&self, upload_id: &str) -> ProviderResult<DirectUpload>;
}
