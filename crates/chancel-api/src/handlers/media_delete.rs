use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    delete,
    path = "/api/v0/media/{id}",
    tag = "media",
    params(("id" = Uuid, Path, description = "Media asset ID")),
    responses(
        (status = 204, description = "Asset, stored object, and provider asset deleted"),
        (status = 404, description = "Asset not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state),
    fields(operation = "delete_media", asset_id = %id)
)]
pub async fn delete_media(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, HttpAppError> {
    state.ingestion.delete_asset(id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
