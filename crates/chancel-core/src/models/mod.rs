//! Data models for the application
//!
//! Domain types for the media ingestion pipeline: the `MediaAsset` entity and
//! its lifecycle state machine, and the request/response types for the
//! `/media` API surface.

mod media_asset;
mod upload;

pub use media_asset::*;
pub use upload::*;
