//! In-memory asset store.
//!
//! Backs database-free deployments (no DATABASE_URL) and the test suites.
//! Enforces the same invariants as the Postgres store: unique object names
//! and forward-only status writes.

use crate::store::{apply_progress, apply_retry_reset, AssetProgress, MediaAssetStore};
use async_trait::async_trait;
use chancel_core::models::MediaAsset;
use chancel_core::AppError;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryAssetStore {
    assets: RwLock<HashMap<Uuid, MediaAsset>>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MediaAssetStore for MemoryAssetStore {
    async fn insert(&self, asset: &MediaAsset) -> Result<(), AppError> {
        let mut assets = self.assets.write().await;
        if assets
            .values()
            .any(|existing| existing.object_name == asset.object_name)
        {
            return Err(AppError::Database(format!(
                "duplicate object_name: {}",
                asset.object_name
            )));
        }
        assets.insert(asset.id, asset.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<MediaAsset>, AppError> {
        Ok(self.assets.read().await.get(&id).cloned())
    }

    async fn find_by_object_name(
        &self,
        object_name: &str,
    ) -> Result<Option<MediaAsset>, AppError> {
        Ok(self
            .assets
            .read()
            .await
            .values()
            .find(|asset| asset.object_name == object_name)
            .cloned())
    }

    async fn advance(&self, id: Uuid, progress: AssetProgress) -> Result<MediaAsset, AppError> {
        let mut assets = self.assets.write().await;
        let current = assets
            .get(&id)
            .ok_or_else(|| AppError::NotFound(format!("Asset not found: {}", id)))?;

        match apply_progress(current, &progress, Utc::now()) {
            Some(next) => {
                assets.insert(id, next.clone());
                Ok(next)
            }
            None => {
                tracing::debug!(
                    asset_id = %id,
                    current = %current.status,
                    attempted = %progress.status,
                    "Rejected status regression"
                );
                Ok(current.clone())
            }
        }
    }

    async fn reset_for_retry(
        &self,
        id: Uuid,
        new_object_name: &str,
    ) -> Result<MediaAsset, AppError> {
        let mut assets = self.assets.write().await;
        let current = assets
            .get(&id)
            .ok_or_else(|| AppError::NotFound(format!("Asset not found: {}", id)))?;

        let next = apply_retry_reset(current, new_object_name, Utc::now());
        assets.insert(id, next.clone());
        Ok(next)
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.assets.write().await.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chancel_core::models::{MediaAssetStatus, MediaKind};
    use std::sync::Arc;

    fn new_asset(object_name: &str) -> MediaAsset {
        MediaAsset::new(
            object_name.to_string(),
            MediaKind::Video,
            "video/mp4".to_string(),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let store = MemoryAssetStore::new();
        let asset = new_asset("media/a.mp4");
        store.insert(&asset).await.unwrap();

        let by_id = store.get(asset.id).await.unwrap().unwrap();
        assert_eq!(by_id.object_name, "media/a.mp4");

        let by_name = store
            .find_by_object_name("media/a.mp4")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_name.id, asset.id);
    }

    #[tokio::test]
    async fn test_duplicate_object_name_rejected() {
        let store = MemoryAssetStore::new();
        store.insert(&new_asset("media/a.mp4")).await.unwrap();
        assert!(store.insert(&new_asset("media/a.mp4")).await.is_err());
    }

    #[tokio::test]
    async fn test_advance_moves_forward() {
        let store = MemoryAssetStore::new();
        let asset = new_asset("media/a.mp4");
        store.insert(&asset).await.unwrap();

        let mut progress = AssetProgress::to(MediaAssetStatus::Processing);
        progress.provider_asset_id = Some("asset-1".to_string());
        let updated = store.advance(asset.id, progress).await.unwrap();

        assert_eq!(updated.status, MediaAssetStatus::Processing);
        assert_eq!(updated.provider_asset_id.as_deref(), Some("asset-1"));
    }

    #[tokio::test]
    async fn test_advance_never_regresses_ready() {
        let store = MemoryAssetStore::new();
        let asset = new_asset("media/a.mp4");
        store.insert(&asset).await.unwrap();

        store
            .advance(asset.id, AssetProgress::to(MediaAssetStatus::Ready))
            .await
            .unwrap();

        let stored = store
            .advance(asset.id, AssetProgress::to(MediaAssetStatus::Processing))
            .await
            .unwrap();
        assert_eq!(stored.status, MediaAssetStatus::Ready);
    }

    #[tokio::test]
    async fn test_concurrent_refreshes_keep_status_monotonic() {
        let store = Arc::new(MemoryAssetStore::new());
        let asset = new_asset("media/a.mp4");
        store.insert(&asset).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            let id = asset.id;
            handles.push(tokio::spawn(async move {
                let status = if i % 2 == 0 {
                    MediaAssetStatus::Processing
                } else {
                    MediaAssetStatus::Ready
                };
                store.advance(id, AssetProgress::to(status)).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // At least one writer reached ready; no later processing write may
        // have undone it.
        let stored = store.get(asset.id).await.unwrap().unwrap();
        assert_eq!(stored.status, MediaAssetStatus::Ready);
    }

    #[tokio::test]
    async fn test_reset_for_retry_clears_attempt() {
        let store = MemoryAssetStore::new();
        let asset = new_asset("media/a.mp4");
        store.insert(&asset).await.unwrap();

        let mut progress = AssetProgress::errored("unsupported codec");
        progress.provider_asset_id = Some("asset-1".to_string());
        store.advance(asset.id, progress).await.unwrap();

        let reset = store
            .reset_for_retry(asset.id, "media/b.mp4")
            .await
            .unwrap();

        assert_eq!(reset.status, MediaAssetStatus::Pending);
        assert_eq!(reset.object_name, "media/b.mp4");
        assert!(reset.provider_asset_id.is_none());
        assert!(reset.error_message.is_none());

        // The old object name no longer resolves.
        assert!(store
            .find_by_object_name("media/a.mp4")
            .await
            .unwrap()
            .is_none());
    }
}
