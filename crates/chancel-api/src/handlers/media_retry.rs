use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chancel_core::models::RetryResponse;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/api/v0/media/{id}/retry",
    tag = "media",
    params(("id" = Uuid, Path, description = "Media asset ID")),
    responses(
        (status = 200, description = "Attempt discarded; fresh upload slot issued", body = RetryResponse),
        (status = 400, description = "Asset is ready; nothing to retry", body = ErrorResponse),
        (status = 404, description = "Asset not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state),
    fields(operation = "retry_media", asset_id = %id)
)]
pub async fn retry_media(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, HttpAppError> {
    let (asset, slot) = state.ingestion.retry_asset(id).await?;

    let response = RetryResponse {
        asset_id: asset.id,
        status: asset.status,
        upload_url: slot.upload_url,
        object_name: slot.object_name,
        expires_at: slot.expires_at,
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}
