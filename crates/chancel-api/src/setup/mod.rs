//! Application setup and initialization.

pub mod routes;
pub mod server;
pub mod services;
pub mod storage;
pub mod validation;

use crate::state::AppState;
use anyhow::Result;
use axum::Router;
use chancel_core::Config;
use std::sync::Arc;

/// Initialize the application: storage, startup checks, services, routes.
///
/// The storage reachability check is fatal and runs before anything else is
/// wired up; the transcoding-credentials check only warns and leaves
/// ingestion submission disabled.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, Router)> {
    let storage = storage::setup_storage(&config)?;

    validation::startup_checks(&config, storage.as_ref()).await?;

    storage
        .ensure_bucket()
        .await
        .map_err(|e| anyhow::anyhow!("Bucket initialization failed: {}", e))?;

    let ingestion = services::setup_ingestion(&config, storage.clone()).await?;

    let state = Arc::new(AppState {
        config: config.clone(),
        ingestion,
        storage,
    });

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
