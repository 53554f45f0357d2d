//! Derived playback URL builders.
//!
//! Pure functions of the playback id and optional parameters; these are URL
//! templates and never make a network call. Same inputs always produce the
//! same string.

const STREAM_BASE_URL: &str = "https://stream.mux.com";
const IMAGE_BASE_URL: &str = "https://image.mux.com";

/// HLS manifest URL for a playback id.
pub fn stream_url(playback_id: &str) -> String {
    format!("{}/{}.m3u8", STREAM_BASE_URL, playback_id)
}

/// Thumbnail parameters. All optional; omitted parameters fall back to the
/// provider's defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThumbnailParams {
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Timestamp in the source to take the frame from, in seconds.
    pub time_seconds: Option<f64>,
}

/// Still-frame thumbnail URL for a playback id.
pub fn thumbnail_url(playback_id: &str, params: &ThumbnailParams) -> String {
    let mut query: Vec<String> = Vec::new();
    if let Some(width) = params.width {
        query.push(format!("width={}", width));
    }
    if let Some(height) = params.height {
        query.push(format!("height={}", height));
    }
    if let Some(time) = params.time_seconds {
        query.push(format!("time={}", time));
    }

    let base = format!("{}/{}/thumbnail.jpg", IMAGE_BASE_URL, playback_id);
    if query.is_empty() {
        base
    } else {
        format!("{}?{}", base, query.join("&"))
    }
}

/// Preview-clip parameters (animated GIF over a time range).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviewParams {
    pub start_seconds: Option<f64>,
    pub end_seconds: Option<f64>,
    pub width: Option<u32>,
    pub fps: Option<u32>,
}

/// Animated preview-clip URL for a playback id.
pub fn preview_url(playback_id: &str, params: &PreviewParams) -> String {
    let mut query: Vec<String> = Vec::new();
    if let Some(start) = params.start_seconds {
        query.push(format!("start={}", start));
    }
    if let Some(end) = params.end_seconds {
        query.push(format!("end={}", end));
    }
    if let Some(width) = params.width {
        query.push(format!("width={}", width));
    }
    if let Some(fps) = params.fps {
        query.push(format!("fps={}", fps));
    }

    let base = format!("{}/{}/animated.gif", IMAGE_BASE_URL, playback_id);
    if query.is_empty() {
        base
    } else {
        format!("{}?{}", base, query.join("&"))
    }
}
