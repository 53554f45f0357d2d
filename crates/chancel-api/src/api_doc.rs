//! OpenAPI documentation.

use crate::error;
use crate::handlers;
use chancel_core::models;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Chancel Media API",
        version = "0.1.0",
        description = "Media ingestion API: presigned uploads to object storage, \
                       submission to the transcoding provider, and asset status. \
                       All endpoints are versioned under /api/v0/."
    ),
    paths(
        handlers::media_upload_url::create_upload_url,
        handlers::media_process::process_media,
        handlers::media_direct_upload::create_direct_upload,
        handlers::media_get::get_media,
        handlers::media_retry::retry_media,
        handlers::media_delete::delete_media,
    ),
    components(schemas(
        models::CreateUploadUrlRequest,
        models::UploadUrlResponse,
        models::ProcessRequest,
        models::ProcessResponse,
        models::DirectUploadResponse,
        models::RetryResponse,
        models::MediaAssetResponse,
        models::PlaybackUrls,
        models::MediaAssetStatus,
        models::MediaKind,
        error::ErrorResponse,
    )),
    tags(
        (name = "media", description = "Media ingestion pipeline")
    )
)]
pub struct ApiDoc;
