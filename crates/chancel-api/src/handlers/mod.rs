//! HTTP handlers for the media ingestion surface.

pub mod media_delete;
pub mod media_direct_upload;
pub mod media_get;
pub mod media_process;
pub mod media_retry;
pub mod media_upload_url;

use chancel_core::models::{MediaAsset, PlaybackUrls};
use chancel_transcode::{preview_url, stream_url, thumbnail_url, PreviewParams, ThumbnailParams};

/// Derive playback URLs from the asset's playback id, if one is known.
/// Absent while the asset is still processing; callers treat that as "not
/// yet", not as an error.
pub(crate) fn playback_urls(asset: &MediaAsset) -> Option<PlaybackUrls> {
    asset.playback_id.as_deref().map(|playback_id| PlaybackUrls {
        hls_url: stream_url(playback_id),
        thumbnail_url: thumbnail_url(playback_id, &ThumbnailParams::default()),
        preview_url: preview_url(playback_id, &PreviewParams::default()),
    })
}
