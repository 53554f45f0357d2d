//! Service setup: asset store, provider client, ingestion orchestrator.

use anyhow::Result;
use chancel_core::Config;
use chancel_db::{MediaAssetStore, MemoryAssetStore, PgMediaAssetStore};
use chancel_services::{IngestionConfig, IngestionService};
use chancel_storage::ObjectStorage;
use chancel_transcode::{MuxClient, SubmitOptions, TranscodeProvider};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;

const DB_MAX_CONNECTIONS: u32 = 10;
const DB_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

pub async fn setup_ingestion(
    config: &Config,
    storage: Arc<dyn ObjectStorage>,
) -> Result<IngestionService> {
    let provider: Option<Arc<dyn TranscodeProvider>> = match config.transcode_credentials() {
        Some((token_id, token_secret)) => {
            let client = MuxClient::new(token_id, token_secret)
                .map_err(|e| anyhow::anyhow!("Failed to build provider client: {}", e))?;
            tracing::info!("Transcoding provider client configured");
            Some(Arc::new(client))
        }
        None => None,
    };

    let assets: Arc<dyn MediaAssetStore> = match config.database_url.as_deref() {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(DB_MAX_CONNECTIONS)
                .acquire_timeout(DB_CONNECT_TIMEOUT)
                .connect(database_url)
                .await?;
            let store = PgMediaAssetStore::new(pool);
            store.migrate().await?;
            tracing::info!("Asset store: Postgres");
            Arc::new(store)
        }
        None => {
            tracing::warn!(
                "DATABASE_URL not set; using in-memory asset store (records are lost on restart)"
            );
            Arc::new(MemoryAssetStore::new())
        }
    };

    let ingestion_config = IngestionConfig {
        upload_url_expiry: Duration::from_secs(config.upload_url_expiry_secs),
        max_upload_size_bytes: config.max_upload_size_bytes,
        submit_options: SubmitOptions::default(),
        processing_warn_after: Duration::from_secs(config.processing_warn_after_secs),
    };

    Ok(IngestionService::new(
        storage,
        provider,
        assets,
        ingestion_config,
    ))
}
