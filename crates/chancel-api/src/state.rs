//! Application state.
//!
//! One `Arc<AppState>` shared across handlers. The ingestion service owns the
//! adapters; the raw storage handle is kept alongside for the health checks,
//! which probe it directly.

use chancel_core::Config;
use chancel_services::IngestionService;
use chancel_storage::ObjectStorage;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub ingestion: IngestionService,
    pub storage: Arc<dyn ObjectStorage>,
}
