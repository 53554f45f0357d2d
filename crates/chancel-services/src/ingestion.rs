//! Ingestion orchestrator.
//!
//! Coordinates the three independently-failing parties of the pipeline: the
//! uploading client, object storage, and the transcoding provider. There is
//! no single transaction boundary across them, so every step re-verifies the
//! piece of state it depends on: submission never happens before the object
//! is confirmed present in storage, and the provider's status is re-fetched
//! on demand rather than cached.
//!
//! No step retries automatically. Resubmitting a source may create a
//! duplicate billable provider asset, so recovery is operator-initiated:
//! discard the attempt and start over with a fresh upload slot.

use chancel_core::models::{MediaAsset, MediaAssetStatus, MediaKind, UploadSlot};
use chancel_core::AppError;
use chancel_db::{AssetProgress, MediaAssetStore};
use chancel_storage::{generate_object_name, Endpoint, ObjectStorage, StorageError};
use chancel_transcode::{ProviderAsset, ProviderStatus, SubmitOptions, TranscodeProvider};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Object-name prefix for provider-native direct uploads, which never land
/// in our bucket but still need a unique record key.
const DIRECT_UPLOAD_PREFIX: &str = "direct/";

#[derive(Clone)]
pub struct IngestionConfig {
    pub upload_url_expiry: Duration,
    pub max_upload_size_bytes: u64,
    pub submit_options: SubmitOptions,
    /// Age past which refreshes of a still-processing asset log a warning.
    /// Never forces a transition.
    pub processing_warn_after: Duration,
}

/// The ingestion orchestrator. Exclusively owns `MediaAsset` records.
///
/// `provider` is `None` when transcoding credentials are missing or
/// placeholders: upload slots still work, submission fails with a typed
/// error.
#[derive(Clone)]
pub struct IngestionService {
    storage: Arc<dyn ObjectStorage>,
    provider: Option<Arc<dyn TranscodeProvider>>,
    assets: Arc<dyn MediaAssetStore>,
    config: IngestionConfig,
}

impl IngestionService {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        provider: Option<Arc<dyn TranscodeProvider>>,
        assets: Arc<dyn MediaAssetStore>,
        config: IngestionConfig,
    ) -> Self {
        IngestionService {
            storage,
            provider,
            assets,
            config,
        }
    }

    pub fn transcoding_enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// Issue an upload slot: create the asset record (status `pending`) and a
    /// presigned PUT URL against the public endpoint. The slot is single-use
    /// and expires; storage is the source of truth for whether it was
    /// consumed.
    #[tracing::instrument(skip(self))]
    pub async fn create_upload_slot(
        &self,
        filename: &str,
        content_type: &str,
    ) -> Result<(MediaAsset, UploadSlot), AppError> {
        let kind = MediaKind::from_content_type(content_type).ok_or_else(|| {
            AppError::InvalidInput(format!("Unsupported content type: {}", content_type))
        })?;

        let object_name = generate_object_name(filename);
        let asset = MediaAsset::new(
            object_name.clone(),
            kind,
            content_type.to_string(),
            Utc::now(),
        );
        self.assets.insert(&asset).await?;

        let upload_url = self
            .storage
            .presigned_put_url(
                Endpoint::Public,
                &object_name,
                content_type,
                self.config.upload_url_expiry,
            )
            .await
            .map_err(storage_err)?;

        let slot = UploadSlot {
            object_name,
            upload_url,
            expires_at: Utc::now()
                + chrono::Duration::seconds(self.config.upload_url_expiry.as_secs() as i64),
        };

        tracing::info!(
            asset_id = %asset.id,
            object_name = %slot.object_name,
            kind = %kind,
            "Issued upload slot"
        );

        Ok((asset, slot))
    }

    /// Hand a stored object to the transcoding provider.
    ///
    /// Idempotent per object name: once a record carries a provider asset id,
    /// calling again returns it unchanged rather than creating a second
    /// billable provider asset. Submission is only attempted after the object
    /// is confirmed present in storage.
    #[tracing::instrument(skip(self))]
    pub async fn process(&self, object_name: &str) -> Result<MediaAsset, AppError> {
        let asset = self
            .assets
            .find_by_object_name(object_name)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("No asset for object: {}", object_name))
            })?;

        if asset.provider_asset_id.is_some() {
            tracing::info!(
                asset_id = %asset.id,
                provider_asset_id = ?asset.provider_asset_id,
                "Object already submitted; returning existing asset"
            );
            return Ok(asset);
        }

        let stat = match self.storage.stat(object_name).await {
            Ok(stat) => stat,
            Err(StorageError::NotFound(_)) => {
                return Err(AppError::UploadSlotExpired(format!(
                    "Object {} not found in storage; the upload may have failed or the slot expired",
                    object_name
                )));
            }
            Err(e) => return Err(storage_err(e)),
        };

        if stat.size > self.config.max_upload_size_bytes {
            let message = format!(
                "Upload is {} bytes; maximum accepted size is {} bytes",
                stat.size, self.config.max_upload_size_bytes
            );
            self.assets
                .advance(asset.id, AssetProgress::errored(message.clone()))
                .await?;
            return Err(AppError::PayloadTooLarge(message));
        }

        // Images and documents skip the transcoding hop entirely; the stored
        // object is the final artifact.
        if !asset.kind.is_transcodable() {
            return self
                .assets
                .advance(asset.id, AssetProgress::to(MediaAssetStatus::Ready))
                .await;
        }

        let provider = self.provider.clone().ok_or_else(|| {
            AppError::SubmissionFailed(
                "Transcoding credentials are not configured; ingestion is disabled".to_string(),
            )
        })?;

        self.assets
            .advance(asset.id, AssetProgress::to(MediaAssetStatus::Submitting))
            .await?;

        // The provider fetches the source itself, so the URL must be
        // reachable from outside: presigned GET against the public endpoint.
        let source_url = self
            .storage
            .presigned_get_url(Endpoint::Public, object_name, self.config.upload_url_expiry)
            .await
            .map_err(storage_err)?;

        let provider_asset = match provider
            .submit_from_url(&source_url, &self.config.submit_options)
            .await
        {
            Ok(provider_asset) => provider_asset,
            Err(e) => {
                let message = e.to_string();
                tracing::error!(
                    asset_id = %asset.id,
                    object_name = %object_name,
                    error = %message,
                    "Provider submission failed"
                );
                self.assets
                    .advance(asset.id, AssetProgress::errored(message.clone()))
                    .await?;
                return Err(AppError::SubmissionFailed(message));
            }
        };

        let updated = self
            .assets
            .advance(asset.id, progress_from_provider(&provider_asset))
            .await?;

        tracing::info!(
            asset_id = %updated.id,
            provider_asset_id = ?updated.provider_asset_id,
            status = %updated.status,
            "Submitted object to transcoding provider"
        );

        Ok(updated)
    }

    /// Provider-native direct upload: the client uploads straight to the
    /// provider, bypassing our bucket. The resulting record is a normal
    /// `MediaAsset`; callers cannot tell which mode was used.
    #[tracing::instrument(skip(self))]
    pub async fn create_direct_upload(&self) -> Result<(MediaAsset, String), AppError> {
        let provider = self.provider.clone().ok_or_else(|| {
            AppError::SubmissionFailed(
                "Transcoding credentials are not configured; ingestion is disabled".to_string(),
            )
        })?;

        let upload = provider
            .create_direct_upload(&self.config.submit_options)
            .await
            .map_err(|e| AppError::SubmissionFailed(e.to_string()))?;

        let upload_url = upload.upload_url.ok_or_else(|| {
            AppError::Internal("Provider returned a direct upload without a URL".to_string())
        })?;

        let mut asset = MediaAsset::new(
            format!("{}{}", DIRECT_UPLOAD_PREFIX, upload.upload_id),
            MediaKind::Video,
            "video/*".to_string(),
            Utc::now(),
        );
        asset.provider_upload_id = Some(upload.upload_id.clone());
        self.assets.insert(&asset).await?;

        tracing::info!(
            asset_id = %asset.id,
            upload_id = %upload.upload_id,
            "Created provider direct upload"
        );

        Ok((asset, upload_url))
    }

    /// Fetch an asset, refreshing non-terminal records against the provider.
    ///
    /// A caller fetching at any time sees the provider's current status,
    /// never a stale cached `ready`. Refresh writes go through the
    /// forward-only store so a concurrent refresh can never regress the
    /// record.
    #[tracing::instrument(skip(self))]
    pub async fn get_asset(&self, id: Uuid) -> Result<MediaAsset, AppError> {
        let mut asset = self
            .assets
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset not found: {}", id)))?;

        if asset.status.is_terminal() {
            return Ok(asset);
        }

        let Some(provider) = self.provider.clone() else {
            // Without credentials there is nothing to poll; the record is
            // already the best answer we have.
            return Ok(asset);
        };

        // Direct-upload records first resolve their upload into an asset id.
        if asset.provider_asset_id.is_none() {
            if let Some(upload_id) = asset.provider_upload_id.clone() {
                let upload = provider
                    .get_direct_upload(&upload_id)
                    .await
                    .map_err(|e| AppError::Provider(e.to_string()))?;

                let mut progress = match upload.asset_id {
                    Some(_) => AssetProgress::to(MediaAssetStatus::Processing),
                    None => AssetProgress::to(asset.status),
                };
                progress.provider_asset_id = upload.asset_id;
                progress.provider_status = Some(upload.raw_status);
                asset = self.assets.advance(asset.id, progress).await?;
            }
        }

        let Some(provider_asset_id) = asset.provider_asset_id.clone() else {
            return Ok(asset);
        };

        if asset.status == MediaAssetStatus::Processing {
            let age = Utc::now().signed_duration_since(asset.created_at);
            if age.num_seconds() as u64 > self.config.processing_warn_after.as_secs() {
                tracing::warn!(
                    asset_id = %asset.id,
                    provider_asset_id = %provider_asset_id,
                    age_seconds = age.num_seconds(),
                    "Asset has been processing for a long time"
                );
            }
        }

        let provider_asset = provider
            .get_asset(&provider_asset_id)
            .await
            .map_err(|e| AppError::Provider(e.to_string()))?;

        self.assets
            .advance(asset.id, progress_from_provider(&provider_asset))
            .await
    }

    /// Operator retry: discard the current attempt and restart from
    /// `pending` with a fresh object name and slot. The only recovery path
    /// for an errored (or stuck) asset.
    #[tracing::instrument(skip(self))]
    pub async fn retry_asset(&self, id: Uuid) -> Result<(MediaAsset, UploadSlot), AppError> {
        let asset = self
            .assets
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset not found: {}", id)))?;

        if asset.status == MediaAssetStatus::Ready {
            return Err(AppError::InvalidInput(
                "Asset is ready; nothing to retry".to_string(),
            ));
        }

        self.discard_remote_state(&asset).await;

        let new_object_name = generate_object_name(&asset.object_name);
        let reset = self.assets.reset_for_retry(id, &new_object_name).await?;

        let upload_url = self
            .storage
            .presigned_put_url(
                Endpoint::Public,
                &new_object_name,
                &reset.content_type,
                self.config.upload_url_expiry,
            )
            .await
            .map_err(storage_err)?;

        let slot = UploadSlot {
            object_name: new_object_name,
            upload_url,
            expires_at: Utc::now()
                + chrono::Duration::seconds(self.config.upload_url_expiry.as_secs() as i64),
        };

        tracing::info!(
            asset_id = %reset.id,
            object_name = %slot.object_name,
            "Reset asset for retry"
        );

        Ok((reset, slot))
    }

    /// Delete the asset record and everything behind it: the provider asset
    /// (the only way to stop consuming provider resources once submitted)
    /// and the stored object.
    #[tracing::instrument(skip(self))]
    pub async fn delete_asset(&self, id: Uuid) -> Result<(), AppError> {
        let asset = self
            .assets
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset not found: {}", id)))?;

        self.discard_remote_state(&asset).await;
        self.assets.delete(id).await?;

        tracing::info!(asset_id = %id, "Deleted media asset");
        Ok(())
    }

    /// Best-effort cleanup of provider and storage state for an attempt.
    /// Failures are logged, not propagated: the record-side operation that
    /// follows must not be blocked by remote cleanup.
    async fn discard_remote_state(&self, asset: &MediaAsset) {
        if let (Some(provider), Some(provider_asset_id)) =
            (self.provider.as_ref(), asset.provider_asset_id.as_deref())
        {
            if let Err(e) = provider.delete_asset(provider_asset_id).await {
                tracing::warn!(
                    asset_id = %asset.id,
                    provider_asset_id = %provider_asset_id,
                    error = %e,
                    "Failed to delete provider asset"
                );
            }
        }

        if !asset.object_name.starts_with(DIRECT_UPLOAD_PREFIX) {
            if let Err(e) = self.storage.delete(&asset.object_name).await {
                tracing::warn!(
                    asset_id = %asset.id,
                    object_name = %asset.object_name,
                    error = %e,
                    "Failed to delete stored object"
                );
            }
        }
    }
}

impl std::fmt::Debug for IngestionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestionService")
            .field("transcoding_enabled", &self.provider.is_some())
            .finish()
    }
}

/// Map the provider's view onto a forward progress write.
fn progress_from_provider(provider_asset: &ProviderAsset) -> AssetProgress {
    let status = match provider_asset.status {
        ProviderStatus::Ready => MediaAssetStatus::Ready,
        ProviderStatus::Errored => MediaAssetStatus::Errored,
        ProviderStatus::Preparing => MediaAssetStatus::Processing,
    };

    AssetProgress {
        status,
        provider_asset_id: Some(provider_asset.provider_asset_id.clone()),
        provider_upload_id: None,
        playback_id: provider_asset.playback_id.clone(),
        provider_status: Some(provider_asset.raw_status.clone()),
        error_message: provider_asset.error_message.clone(),
        duration_seconds: provider_asset.duration_seconds,
        aspect_ratio: provider_asset.aspect_ratio.clone(),
        max_resolution: provider_asset.max_resolution.clone(),
    }
}

fn storage_err(err: StorageError) -> AppError {
    AppError::StorageUnavailable(err.to_string())
}
