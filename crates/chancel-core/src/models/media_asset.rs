use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;
use uuid::Uuid;

/// Media category. Only video and audio enter the transcoding path; images
/// and documents are served straight from object storage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
    Image,
    Document,
}

impl MediaKind {
    /// Derive the kind from a MIME type. Returns `None` for types the
    /// pipeline does not accept.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let ct = content_type.split(';').next().unwrap_or("").trim();
        if ct.starts_with("video/") {
            Some(MediaKind::Video)
        } else if ct.starts_with("audio/") {
            Some(MediaKind::Audio)
        } else if ct.starts_with("image/") {
            Some(MediaKind::Image)
        } else if matches!(
            ct,
            "application/pdf"
                | "application/msword"
                | "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
                | "text/plain"
        ) {
            Some(MediaKind::Document)
        } else {
            None
        }
    }

    pub fn is_transcodable(self) -> bool {
        matches!(self, MediaKind::Video | MediaKind::Audio)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::Image => "image",
            MediaKind::Document => "document",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "video" => Some(MediaKind::Video),
            "audio" => Some(MediaKind::Audio),
            "image" => Some(MediaKind::Image),
            "document" => Some(MediaKind::Document),
            _ => None,
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// Server-side lifecycle state of a media asset.
///
/// `pending → submitting → processing → ready | errored`. There is no
/// `uploading` state here: the server has no visibility into the client's PUT
/// in progress, so that state exists only in the uploading client. Transitions
/// are forward-only; the sole regression path is the explicit operator retry,
/// which replaces the attempt wholesale (fresh object name) through a
/// dedicated store operation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaAssetStatus {
    Pending,
    Submitting,
    Processing,
    Ready,
    Errored,
}

impl MediaAssetStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, MediaAssetStatus::Ready | MediaAssetStatus::Errored)
    }

    /// Whether a write moving this status to `next` is allowed.
    ///
    /// Same-status writes are permitted so concurrent refreshes can update
    /// provider metadata; regressions are rejected (writing `processing` over
    /// an already-`ready` record must fail).
    pub fn can_transition_to(self, next: MediaAssetStatus) -> bool {
        if self == next {
            return true;
        }
        if self.is_terminal() {
            return false;
        }
        if next == MediaAssetStatus::Errored {
            return true;
        }
        next.rank() > self.rank()
    }

    fn rank(self) -> u8 {
        match self {
            MediaAssetStatus::Pending => 0,
            MediaAssetStatus::Submitting => 1,
            MediaAssetStatus::Processing => 2,
            MediaAssetStatus::Ready => 3,
            // Errored is terminal but not "further along" than ready; it is
            // only reachable through the explicit arm in can_transition_to.
            MediaAssetStatus::Errored => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MediaAssetStatus::Pending => "pending",
            MediaAssetStatus::Submitting => "submitting",
            MediaAssetStatus::Processing => "processing",
            MediaAssetStatus::Ready => "ready",
            MediaAssetStatus::Errored => "errored",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(MediaAssetStatus::Pending),
            "submitting" => Some(MediaAssetStatus::Submitting),
            "processing" => Some(MediaAssetStatus::Processing),
            "ready" => Some(MediaAssetStatus::Ready),
            "errored" => Some(MediaAssetStatus::Errored),
            _ => None,
        }
    }
}

impl Display for MediaAssetStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// The unit the ingestion pipeline produces.
///
/// The `id` is assigned here, not by the transcoding provider, so internal
/// references stay stable even if the provider is swapped. `object_name` is
/// unique per upload attempt; a retry allocates a fresh one rather than
/// reusing a dead attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaAsset {
    pub id: Uuid,
    pub object_name: String,
    pub kind: MediaKind,
    /// MIME type the upload slot was issued for; a retry slot is signed for
    /// the same type.
    pub content_type: String,
    /// Identifier from the transcoding provider; absent until submission
    /// succeeds, immutable afterwards.
    pub provider_asset_id: Option<String>,
    /// Provider-native direct-upload id, for assets ingested without the
    /// object-storage hop. Absent for presigned-URL uploads.
    pub provider_upload_id: Option<String>,
    /// Stable identifier from which playback/thumbnail/preview URLs derive.
    /// May remain absent while submission is still settling.
    pub playback_id: Option<String>,
    pub status: MediaAssetStatus,
    /// The provider's raw status string, surfaced verbatim to viewers while
    /// the asset is processing.
    pub provider_status: Option<String>,
    pub error_message: Option<String>,
    pub duration_seconds: Option<f64>,
    pub aspect_ratio: Option<String>,
    pub max_resolution: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MediaAsset {
    pub fn new(
        object_name: String,
        kind: MediaKind,
        content_type: String,
        now: DateTime<Utc>,
    ) -> Self {
        MediaAsset {
            id: Uuid::new_v4(),
            object_name,
            kind,
            content_type,
            provider_asset_id: None,
            provider_upload_id: None,
            playback_id: None,
            status: MediaAssetStatus::Pending,
            provider_status: None,
            error_message: None,
            duration_seconds: None,
            aspect_ratio: None,
            max_resolution: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// True once the provider reports the asset ready and playback URLs can
    /// be derived.
    pub fn playback_ready(&self) -> bool {
        self.status == MediaAssetStatus::Ready && self.playback_id.is_some()
    }
}

/// Playback URLs derived from the playback id. All absent while the asset is
/// still processing; callers must treat that as "not yet", not as an error.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlaybackUrls {
    pub hls_url: String,
    pub thumbnail_url: String,
    pub preview_url: String,
}

/// API representation of a media asset.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MediaAssetResponse {
    pub id: Uuid,
    pub object_name: String,
    pub kind: MediaKind,
    pub content_type: String,
    pub status: MediaAssetStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_asset_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playback_id: Option<String>,
    /// Raw provider status string; rendered next to the spinner while
    /// processing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playback: Option<PlaybackUrls>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_resolution: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MediaAssetResponse {
    /// Build the response; `playback` is supplied by the caller because URL
    /// derivation lives in the transcoding adapter, not in core.
    pub fn from_asset(asset: MediaAsset, playback: Option<PlaybackUrls>) -> Self {
        MediaAssetResponse {
            id: asset.id,
            object_name: asset.object_name,
            kind: asset.kind,
            content_type: asset.content_type,
            status: asset.status,
            provider_asset_id: asset.provider_asset_id,
            playback_id: asset.playback_id,
            provider_status: asset.provider_status,
            error_message: asset.error_message,
            playback,
            duration_seconds: asset.duration_seconds,
            aspect_ratio: asset.aspect_ratio,
            max_resolution: asset.max_resolution,
            created_at: asset.created_at,
            updated_at: asset.updated_at,
        }
    }
}
