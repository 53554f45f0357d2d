//! Shared constants.

/// Default expiry for presigned upload/download URLs, in seconds.
pub const DEFAULT_URL_EXPIRY_SECS: u64 = 3600;

/// Default maximum accepted upload size: 2 GiB.
pub const DEFAULT_MAX_UPLOAD_SIZE_BYTES: u64 = 2 * 1024 * 1024 * 1024;

/// Object-name prefix under which uploads land. The bucket read policy
/// grants public read on this prefix only, never on the whole bucket.
pub const MEDIA_KEY_PREFIX: &str = "media/";

/// Default number of seconds an asset may sit in `processing` before
/// status refreshes start logging a warning. This never forces a
/// transition; stuck assets stay `processing` until an operator acts.
pub const DEFAULT_PROCESSING_WARN_AFTER_SECS: u64 = 3600;
