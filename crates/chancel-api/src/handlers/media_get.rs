use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::playback_urls;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chancel_core::models::MediaAssetResponse;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v0/media/{id}",
    tag = "media",
    params(("id" = Uuid, Path, description = "Media asset ID")),
    responses(
        (status = 200, description = "Current asset record; a missing playback block means still processing", body = MediaAssetResponse),
        (status = 404, description = "Asset not found", body = ErrorResponse),
        (status = 502, description = "Provider status refresh failed", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state),
    fields(operation = "get_media", asset_id = %id)
)]
pub async fn get_media(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, HttpAppError> {
    let asset = state.ingestion.get_asset(id).await?;
    let playback = playback_urls(&asset);

    Ok((
        StatusCode::OK,
        Json(MediaAssetResponse::from_asset(asset, playback)),
    )
        .into_response())
}
