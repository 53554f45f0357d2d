use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::media_asset::{MediaAssetStatus, PlaybackUrls};

/// Request for a presigned upload URL.
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateUploadUrlRequest {
    /// Original filename; only its extension influences the object name.
    #[validate(length(
        min = 1,
        max = 255,
        message = "Filename must be between 1 and 255 characters"
    ))]
    pub filename: String,
    /// Content type (MIME type)
    #[validate(length(
        min = 1,
        max = 255,
        message = "Content type must be between 1 and 255 characters"
    ))]
    pub content_type: String,
}

/// An ephemeral upload slot. Single-use: once the client has PUT the file or
/// the expiry passes, the slot is dead. The object-storage service is the
/// source of truth for whether the object now exists; nothing here tracks
/// consumption.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadSlot {
    pub object_name: String,
    pub upload_url: String,
    pub expires_at: DateTime<Utc>,
}

/// Response containing the presigned upload URL.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadUrlResponse {
    pub upload_url: String,
    pub object_name: String,
    pub expires_at: DateTime<Utc>,
}

impl From<UploadSlot> for UploadUrlResponse {
    fn from(slot: UploadSlot) -> Self {
        UploadUrlResponse {
            upload_url: slot.upload_url,
            object_name: slot.object_name,
            expires_at: slot.expires_at,
        }
    }
}

/// Request to hand a stored object to the transcoding provider.
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct ProcessRequest {
    #[validate(length(min = 1, max = 1024, message = "Object name is required"))]
    pub object_name: String,
}

/// Response after submission to the transcoding provider.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProcessResponse {
    pub asset_id: Uuid,
    pub status: MediaAssetStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_asset_id: Option<String>,
    /// Absent until the provider allocates a playback id; "not yet
    /// derivable", not an error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playback: Option<PlaybackUrls>,
}

/// Response for the provider-native direct-upload mode.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DirectUploadResponse {
    pub asset_id: Uuid,
    pub upload_url: String,
    pub status: MediaAssetStatus,
}

/// Response after an operator retry: the reset record plus a fresh slot.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RetryResponse {
    pub asset_id: Uuid,
    pub status: MediaAssetStatus,
    pub upload_url: String,
    pub object_name: String,
    pub expires_at: DateTime<Utc>,
}
