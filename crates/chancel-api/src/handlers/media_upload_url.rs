use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chancel_core::models::{CreateUploadUrlRequest, UploadUrlResponse};
use chancel_core::AppError;
use std::sync::Arc;
use validator::Validate;

#[utoipa::path(
    post,
    path = "/api/v0/media/upload-url",
    tag = "media",
    request_body = CreateUploadUrlRequest,
    responses(
        (status = 200, description = "Upload slot issued", body = UploadUrlResponse),
        (status = 400, description = "Invalid filename or content type", body = ErrorResponse),
        (status = 503, description = "Object storage unavailable", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, request),
    fields(operation = "create_upload_url")
)]
pub async fn create_upload_url(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateUploadUrlRequest>,
) -> Result<Response, HttpAppError> {
    request.validate().map_err(AppError::from)?;

    let (_asset, slot) = state
        .ingestion
        .create_upload_slot(&request.filename, &request.content_type)
        .await?;

    Ok((StatusCode::OK, Json(UploadUrlResponse::from(slot))).into_response())
}
