//! Startup health checks.
//!
//! Two checks with different severities, run before the ingestion surface
//! accepts requests:
//!
//! - Transcoding credentials missing or placeholder: **warning**. The rest of
//!   the system keeps operating with ingestion submission disabled.
//! - Object storage unreachable: **fatal**. Every ingestion step depends on
//!   storage, so the service refuses to start and the error names the
//!   endpoint that was attempted.

use anyhow::Result;
use chancel_core::Config;
use chancel_storage::ObjectStorage;
use std::time::Duration;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn startup_checks(config: &Config, storage: &dyn ObjectStorage) -> Result<()> {
    if config.transcode_credentials().is_none() {
        tracing::warn!(
            "Transcoding credentials missing or placeholder (MUX_TOKEN_ID / MUX_TOKEN_SECRET); \
             media ingestion submission is disabled"
        );
    }

    let endpoint = &config.storage.internal.endpoint;
    match tokio::time::timeout(PROBE_TIMEOUT, storage.probe()).await {
        Ok(Ok(())) => {
            tracing::info!(endpoint = %endpoint, "Object storage reachable");
            Ok(())
        }
        Ok(Err(e)) => Err(anyhow::anyhow!(
            "Object storage unreachable at {}: {}",
            endpoint,
            e
        )),
        Err(_) => Err(anyhow::anyhow!(
            "Object storage probe timed out after {}s at {}",
            PROBE_TIMEOUT.as_secs(),
            endpoint
        )),
    }
}
