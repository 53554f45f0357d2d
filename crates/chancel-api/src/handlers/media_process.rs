use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::playback_urls;
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chancel_core::models::{ProcessRequest, ProcessResponse};
use chancel_core::AppError;
use std::sync::Arc;
use validator::Validate;

#[utoipa::path(
    post,
    path = "/api/v0/media/process",
    tag = "media",
    request_body = ProcessRequest,
    responses(
        (status = 200, description = "Object submitted to the transcoding provider", body = ProcessResponse),
        (status = 404, description = "No asset for this object name", body = ErrorResponse),
        (status = 410, description = "Object not present in storage", body = ErrorResponse),
        (status = 502, description = "Provider rejected the submission", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, request),
    fields(operation = "process_media")
)]
pub async fn process_media(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ProcessRequest>,
) -> Result<Response, HttpAppError> {
    request.validate().map_err(AppError::from)?;

    let asset = state.ingestion.process(&request.object_name).await?;

    let response = ProcessResponse {
        asset_id: asset.id,
        status: asset.status,
        provider_asset_id: asset.provider_asset_id.clone(),
        playback: playback_urls(&asset),
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}
