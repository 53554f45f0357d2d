//! Storage setup and initialization

use anyhow::Result;
use chancel_core::Config;
use chancel_storage::{ObjectStorage, S3Gateway};
use std::sync::Arc;

/// Build the S3 gateway from the configured endpoint pairs.
pub fn setup_storage(config: &Config) -> Result<Arc<dyn ObjectStorage>> {
    tracing::info!(
        internal_endpoint = %config.storage.internal.endpoint,
        public_endpoint = %config.storage.public.endpoint,
        bucket = %config.storage.bucket,
        "Initializing object storage gateway"
    );

    let gateway = S3Gateway::new(&config.storage)
        .map_err(|e| anyhow::anyhow!("Failed to build storage gateway: {}", e))?;

    Ok(Arc::new(gateway))
}
