//! Chancel Transcode Library
//!
//! Thin adapter around the external transcoding provider (Mux Video).
//! Provides the `TranscodeProvider` trait, the HTTP client implementation,
//! and pure URL builders for playback, thumbnails, and preview clips.
//!
//! The adapter never retries a submission on its own: resubmitting a source
//! may create a duplicate billable asset, so that decision belongs to an
//! operator, not this crate.

pub mod mux;
pub mod playback;
pub mod traits;

// Re-export commonly used types
pub use mux::MuxClient;
pub use playback::{preview_url, stream_url, thumbnail_url, PreviewParams, ThumbnailParams};
pub use traits::{
    DirectUpload, PlaybackPolicy, ProviderAsset, ProviderError, ProviderResult, ProviderStatus,
    SubmitOptions, TranscodeProvider,
};
