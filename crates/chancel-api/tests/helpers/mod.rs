//! Test helpers: build the router against in-memory backends.
//!
//! Run from workspace root: `cargo test -p chancel-api`.
//! No Docker, database, or network required: storage and the asset store are
//! the in-memory implementations and the provider is a scripted fake.

#![allow(dead_code)]

pub mod provider;

use axum_test::TestServer;
use chancel_api::constants::API_PREFIX;
use chancel_api::setup::routes::setup_routes;
use chancel_api::state::AppState;
use chancel_core::config::{Config, StorageConfig, StorageEndpoint};
use chancel_db::MemoryAssetStore;
use chancel_services::{IngestionConfig, IngestionService};
use chancel_storage::{MemoryStorage, ObjectStorage};
use chancel_transcode::{SubmitOptions, TranscodeProvider};
use provider::FakeProvider;
use std::sync::Arc;
use std::time::Duration;

/// API path with the version prefix.
pub fn api_path(path: &str) -> String {
    format!("{}{}", API_PREFIX, path)
}

/// Test application: server plus handles on the fakes behind it.
pub struct TestApp {
    pub server: TestServer,
    pub storage: Arc<MemoryStorage>,
    pub assets: Arc<MemoryAssetStore>,
    pub provider: Arc<FakeProvider>,
}

impl TestApp {
    /// Simulate the client's raw PUT to the presigned URL by writing the
    /// object into storage directly.
    pub async fn upload_object(&self, object_name: &str, bytes: &'static [u8]) {
        self.storage
            .put(object_name, bytes::Bytes::from_static(bytes), "video/mp4")
            .await
            .unwrap();
    }

    /// Recover an asset id from its object name. The API deliberately has no
    /// list endpoint (content browsing is out of scope), so tests go through
    /// the store the way the surrounding admin panel would.
    pub async fn asset_id_for(&self, object_name: &str) -> uuid::Uuid {
        use chancel_db::MediaAssetStore;
        self.assets
            .find_by_object_name(object_name)
            .await
            .unwrap()
            .expect("no asset for object name")
            .id
    }
}

pub async fn setup_test_app() -> TestApp {
    build_app(true, FakeProvider::new()).await
}

pub async fn setup_test_app_without_provider() -> TestApp {
    build_app(false, FakeProvider::new()).await
}

pub async fn setup_test_app_with_failing_provider() -> TestApp {
    build_app(true, FakeProvider::failing()).await
}

async fn build_app(with_provider: bool, fake: FakeProvider) -> TestApp {
    let config = test_config(with_provider);
    let storage = Arc::new(MemoryStorage::new(config.storage.bucket.clone()));
    let assets = Arc::new(MemoryAssetStore::new());
    let provider = Arc::new(fake);

    let ingestion = IngestionService::new(
        storage.clone() as Arc<dyn ObjectStorage>,
        with_provider.then(|| provider.clone() as Arc<dyn TranscodeProvider>),
        assets.clone(),
        IngestionConfig {
            upload_url_expiry: Duration::from_secs(config.upload_url_expiry_secs),
            max_upload_size_bytes: config.max_upload_size_bytes,
            submit_options: SubmitOptions::default(),
            processing_warn_after: Duration::from_secs(config.processing_warn_after_secs),
        },
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        ingestion,
        storage: storage.clone(),
    });

    let router = setup_routes(&config, state).unwrap();
    let server = TestServer::new(router).unwrap();

    TestApp {
        server,
        storage,
        assets,
        provider,
    }
}

fn test_config(with_provider: bool) -> Config {
    let endpoint = StorageEndpoint {
        endpoint: "http://localhost:9000".to_string(),
        access_key: "minioadmin".to_string(),
        secret_key: "minioadmin".to_string(),
    };
    Config {
        server_port: 0,
        environment: "test".to_string(),
        cors_origins: vec!["*".to_string()],
        storage: StorageConfig {
            internal: endpoint.clone(),
            public: endpoint,
            region: "us-east-1".to_string(),
            bucket: "chancel-media".to_string(),
            public_read_prefix: "media/".to_string(),
        },
        mux_token_id: with_provider.then(|| "token-id".to_string()),
        mux_token_secret: with_provider.then(|| "token-secret".to_string()),
        database_url: None,
        upload_url_expiry_secs: 3600,
        max_upload_size_bytes: 1024 * 1024,
        processing_warn_after_secs: 3600,
    }
}
