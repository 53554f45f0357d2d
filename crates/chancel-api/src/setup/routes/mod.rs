//! Route configuration and setup.
//!
//! Media routes in this module; health checks in [health](health).

mod health;

use crate::api_doc::ApiDoc;
use crate::constants::API_PREFIX;
use crate::handlers;
use crate::state::AppState;
use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{delete, get, post},
    Router,
};
use chancel_core::Config;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

/// Request bodies on this API are small JSON documents; raw media bytes go
/// directly to object storage via presigned URLs, never through here.
const MAX_JSON_BODY_BYTES: usize = 64 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router> {
    let cors = setup_cors(config)?;

    let media_routes = Router::new()
        .route(
            &format!("{}/media/upload-url", API_PREFIX),
            post(handlers::media_upload_url::create_upload_url),
        )
        .route(
            &format!("{}/media/process", API_PREFIX),
            post(handlers::media_process::process_media),
        )
        .route(
            &format!("{}/media/direct-upload", API_PREFIX),
            post(handlers::media_direct_upload::create_direct_upload),
        )
        .route(
            &format!("{}/media/{{id}}", API_PREFIX),
            get(handlers::media_get::get_media),
        )
        .route(
            &format!("{}/media/{{id}}", API_PREFIX),
            delete(handlers::media_delete::delete_media),
        )
        .route(
            &format!("{}/media/{{id}}/retry", API_PREFIX),
            post(handlers::media_retry::retry_media),
        )
        .with_state(state.clone());

    let router = Router::new()
        .merge(media_routes)
        .merge(health::health_routes(state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
        .layer(DefaultBodyLimit::max(MAX_JSON_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    Ok(router)
}

fn setup_cors(config: &Config) -> Result<CorsLayer> {
    if config.cors_origins.iter().any(|origin| origin == "*") {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any));
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|_| anyhow::anyhow!("Invalid CORS origin: {}", origin))
        })
        .collect::<Result<_>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}
