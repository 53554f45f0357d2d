//! Media asset store trait and transition rules.

use async_trait::async_trait;
use chancel_core::models::{MediaAsset, MediaAssetStatus};
use chancel_core::AppError;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A forward progress write against an asset record.
///
/// `provider_asset_id` and `playback_id` are set-once: if the stored record
/// already carries a value, the stored value wins and the incoming one is
/// ignored. The remaining fields overwrite when present.
#[derive(Debug, Clone)]
pub struct AssetProgress {
    pub status: MediaAssetStatus,
    pub provider_asset_id: Option<String>,
    pub provider_upload_id: Option<String>,
    pub playback_id: Option<String>,
    pub provider_status: Option<String>,
    pub error_message: Option<String>,
    pub duration_seconds: Option<f64>,
    pub aspect_ratio: Option<String>,
    pub max_resolution: Option<String>,
}

impl AssetProgress {
    /// A bare status move with no metadata.
    pub fn to(status: MediaAssetStatus) -> Self {
        AssetProgress {
            status,
            provider_asset_id: None,
            provider_upload_id: None,
            playback_id: None,
            provider_status: None,
            error_message: None,
            duration_seconds: None,
            aspect_ratio: None,
            max_resolution: None,
        }
    }

    pub fn errored(message: impl Into<String>) -> Self {
        AssetProgress {
            error_message: Some(message.into()),
            ..AssetProgress::to(MediaAssetStatus::Errored)
        }
    }
}

/// Apply a progress write to the current record, or `None` if the transition
/// would regress the lifecycle. Shared by every store implementation so the
/// rules cannot drift between backends.
pub(crate) fn apply_progress(
    current: &MediaAsset,
    progress: &AssetProgress,
    now: DateTime<Utc>,
) -> Option<MediaAsset> {
    if !current.status.can_transition_to(progress.status) {
        return None;
    }

    let mut next = current.clone();
    next.status = progress.status;

    // Set-once fields: the first writer wins, later values are ignored.
    if next.provider_asset_id.is_none() {
        next.provider_asset_id = progress.provider_asset_id.clone();
    }
    if next.provider_upload_id.is_none() {
        next.provider_upload_id = progress.provider_upload_id.clone();
    }
    if next.playback_id.is_none() {
        next.playback_id = progress.playback_id.clone();
    }

    if let Some(ref provider_status) = progress.provider_status {
        next.provider_status = Some(provider_status.clone());
    }
    if let Some(ref error_message) = progress.error_message {
        next.error_message = Some(error_message.clone());
    }
    if let Some(duration) = progress.duration_seconds {
        next.duration_seconds = Some(duration);
    }
    if let Some(ref aspect_ratio) = progress.aspect_ratio {
        next.aspect_ratio = Some(aspect_ratio.clone());
    }
    if let Some(ref max_resolution) = progress.max_resolution {
        next.max_resolution = Some(max_resolution.clone());
    }

    next.updated_at = now;
    Some(next)
}

/// Reset a record for an operator retry: fresh object name, provider fields
/// cleared, back to `pending`. The asset id stays stable so internal
/// references survive the new attempt.
pub(crate) fn apply_retry_reset(
    current: &MediaAsset,
    new_object_name: &str,
    now: DateTime<Utc>,
) -> MediaAsset {
    let mut next = current.clone();
    next.object_name = new_object_name.to_string();
    next.status = MediaAssetStatus::Pending;
    next.provider_asset_id = None;
    next.provider_upload_id = None;
    next.playback_id = None;
    next.provider_status = None;
    next.error_message = None;
    next.duration_seconds = None;
    next.aspect_ratio = None;
    next.max_resolution = None;
    next.updated_at = now;
    next
}

/// Persistence surface for media asset records.
#[async_trait]
pub trait MediaAssetStore: Send + Sync {
    async fn insert(&self, asset: &MediaAsset) -> Result<(), AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<MediaAsset>, AppError>;

    async fn find_by_object_name(&self, object_name: &str)
        -> Result<Option<MediaAsset>, AppError>;

    /// Forward-only write. Returns the stored record after the attempt: the
    /// updated record if the transition was accepted, or the untouched stored
    /// record if it would have regressed (last-write-wins with forward-only
    /// validation).
    async fn advance(&self, id: Uuid, progress: AssetProgress) -> Result<MediaAsset, AppError>;

    /// Operator retry: replace the attempt (fresh object name, cleared
    /// provider fields, status back to `pending`).
    async fn reset_for_retry(
        &self,
        id: Uuid,
        new_object_name: &str,
    ) -> Result<MediaAsset, AppError>;

    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chancel_core::models::MediaKind;

    fn asset_in(status: MediaAssetStatus) -> MediaAsset {
        let mut asset = MediaAsset::new(
            "media/abc.mp4".to_string(),
            MediaKind::Video,
            "video/mp4".to_string(),
            Utc::now(),
        );
        asset.status = status;
        asset
    }

    #[test]
    fn test_apply_progress_rejects_regression() {
        let mut current = asset_in(MediaAssetStatus::Ready);
        current.playback_id = Some("play-1".to_string());

        let progress = AssetProgress::to(MediaAssetStatus::Processing);
        assert!(apply_progress(&current, &progress, Utc::now()).is_none());
    }

    #[test]
    fn test_apply_progress_provider_ids_are_set_once() {
        let mut current = asset_in(MediaAssetStatus::Processing);
        current.provider_asset_id = Some("asset-original".to_string());

        let mut progress = AssetProgress::to(MediaAssetStatus::Ready);
        progress.provider_asset_id = Some("asset-imposter".to_string());
        progress.playback_id = Some("play-1".to_string());

        let next = apply_progress(&current, &progress, Utc::now()).unwrap();
        assert_eq!(next.provider_asset_id.as_deref(), Some("asset-original"));
        assert_eq!(next.playback_id.as_deref(), Some("play-1"));
        assert_eq!(next.status, MediaAssetStatus::Ready);
    }

    #[test]
    fn test_apply_progress_same_status_updates_metadata() {
        let current = asset_in(MediaAssetStatus::Processing);

        let mut progress = AssetProgress::to(MediaAssetStatus::Processing);
        progress.provider_status = Some("transcribing".to_string());

        let next = apply_progress(&current, &progress, Utc::now()).unwrap();
        assert_eq!(next.status, MediaAssetStatus::Processing);
        assert_eq!(next.provider_status.as_deref(), Some("transcribing"));
    }

    #[test]
    fn test_retry_reset_replaces_attempt() {
        let mut current = asset_in(MediaAssetStatus::Errored);
        current.provider_asset_id = Some("asset-1".to_string());
        current.playback_id = Some("play-1".to_string());
        current.error_message = Some("unsupported codec".to_string());

        let next = apply_retry_reset(&current, "media/fresh.mp4", Utc::now());

        assert_eq!(next.id, current.id);
        assert_eq!(next.object_name, "media/fresh.mp4");
        assert_eq!(next.status, MediaAssetStatus::Pending);
        assert!(next.provider_asset_id.is_none());
        assert!(next.playback_id.is_none());
        assert!(next.error_message.is_none());
    }
}
