use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chancel_core::models::DirectUploadResponse;
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/v0/media/direct-upload",
    tag = "media",
    responses(
        (status = 201, description = "Provider-native upload slot created", body = DirectUploadResponse),
        (status = 502, description = "Provider unavailable or credentials not configured", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "create_direct_upload"))]
pub async fn create_direct_upload(
    State(state): State<Arc<AppState>>,
) -> Result<Response, HttpAppError> {
    let (asset, upload_url) = state.ingestion.create_direct_upload().await?;

    let response = DirectUploadResponse {
        asset_id: asset.id,
        upload_url,
        status: asset.status,
    };

    Ok((StatusCode::CREATED, Json(response)).into_response())
}
