//! Postgres-backed asset store.
//!
//! Uses dynamic SQLx queries to avoid requiring DATABASE_URL at build time.
//! Forward-only writes are enforced with a compare-and-set on the status
//! column: the UPDATE only lands if the row still carries the status the
//! transition was computed against.

use crate::store::{apply_progress, apply_retry_reset, AssetProgress, MediaAssetStore};
use async_trait::async_trait;
use chancel_core::models::{MediaAsset, MediaAssetStatus, MediaKind};
use chancel_core::AppError;
use chrono::Utc;
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// Embedded migrations for the media_assets table.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

#[derive(Clone)]
pub struct PgMediaAssetStore {
    pool: PgPool,
}

impl PgMediaAssetStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), AppError> {
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("migration failed: {}", e)))
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<MediaAsset>, AppError> {
        sqlx::query_as::<_, AssetRow>(
            r#"
            SELECT id, object_name, kind, content_type, provider_asset_id, provider_upload_id,
                   playback_id, status, provider_status, error_message,
                   duration_seconds, aspect_ratio, max_resolution,
                   created_at, updated_at
            FROM media_assets
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map(|row| row.map(AssetRow::into_asset))
        .map_err(db_err)
    }

    async fn write(&self, next: &MediaAsset, expected_status: MediaAssetStatus) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE media_assets
            SET object_name = $2,
                status = $3,
                provider_asset_id = $4,
                provider_upload_id = $5,
                playback_id = $6,
                provider_status = $7,
                error_message = $8,
                duration_seconds = $9,
                aspect_ratio = $10,
                max_resolution = $11,
                updated_at = $12
            WHERE id = $1 AND status = $13
            "#,
        )
        .bind(next.id)
        .bind(&next.object_name)
        .bind(next.status.as_str())
        .bind(&next.provider_asset_id)
        .bind(&next.provider_upload_id)
        .bind(&next.playback_id)
        .bind(&next.provider_status)
        .bind(&next.error_message)
        .bind(next.duration_seconds)
        .bind(&next.aspect_ratio)
        .bind(&next.max_resolution)
        .bind(next.updated_at)
        .bind(expected_status.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl MediaAssetStore for PgMediaAssetStore {
    async fn insert(&self, asset: &MediaAsset) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO media_assets (
                id, object_name, kind, content_type, provider_asset_id, provider_upload_id,
                playback_id, status, provider_status, error_message,
                duration_seconds, aspect_ratio, max_resolution,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(asset.id)
        .bind(&asset.object_name)
        .bind(asset.kind.as_str())
        .bind(&asset.content_type)
        .bind(&asset.provider_asset_id)
        .bind(&asset.provider_upload_id)
        .bind(&asset.playback_id)
        .bind(asset.status.as_str())
        .bind(&asset.provider_status)
        .bind(&asset.error_message)
        .bind(asset.duration_seconds)
        .bind(&asset.aspect_ratio)
        .bind(&asset.max_resolution)
        .bind(asset.created_at)
        .bind(asset.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<MediaAsset>, AppError> {
        self.fetch(id).await
    }

    async fn find_by_object_name(
        &self,
        object_name: &str,
    ) -> Result<Option<MediaAsset>, AppError> {
        sqlx::query_as::<_, AssetRow>(
            r#"
            SELECT id, object_name, kind, content_type, provider_asset_id, provider_upload_id,
                   playback_id, status, provider_status, error_message,
                   duration_seconds, aspect_ratio, max_resolution,
                   created_at, updated_at
            FROM media_assets
            WHERE object_name = $1
            "#,
        )
        .bind(object_name)
        .fetch_optional(&self.pool)
        .await
        .map(|row| row.map(AssetRow::into_asset))
        .map_err(db_err)
    }

    async fn advance(&self, id: Uuid, progress: AssetProgress) -> Result<MediaAsset, AppError> {
        // CAS: compute the transition against a snapshot, write guarded by
        // that snapshot's status. On a lost race, re-read once; if the other
        // writer moved the record somewhere this write can no longer follow,
        // last-write-wins resolves in their favor.
        for _ in 0..2 {
            let current = self
                .fetch(id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Asset not found: {}", id)))?;

            let Some(next) = apply_progress(&current, &progress, Utc::now()) else {
                tracing::debug!(
                    asset_id = %id,
                    current = %current.status,
                    attempted = %progress.status,
                    "Rejected status regression"
                );
                return Ok(current);
            };

            if self.write(&next, current.status).await? {
                return Ok(next);
            }
        }

        self.fetch(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset not found: {}", id)))
    }

    async fn reset_for_retry(
        &self,
        id: Uuid,
        new_object_name: &str,
    ) -> Result<MediaAsset, AppError> {
        let current = self
            .fetch(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset not found: {}", id)))?;

        let next = apply_retry_reset(&current, new_object_name, Utc::now());
        self.write(&next, current.status).await?;
        Ok(next)
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM media_assets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

fn db_err(err: sqlx::Error) -> AppError {
    AppError::Database(err.to_string())
}

/// Row mapping kept separate from the domain type so status/kind strings are
/// validated in one place.
struct AssetRow {
    asset: MediaAsset,
}

impl AssetRow {
    fn into_asset(self) -> MediaAsset {
        self.asset
    }
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for AssetRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        let status_raw: String = row.try_get("status")?;
        let status = MediaAssetStatus::parse(&status_raw).ok_or_else(|| {
            sqlx::Error::Decode(format!("unknown media asset status: {}", status_raw).into())
        })?;

        let kind_raw: String = row.try_get("kind")?;
        let kind = MediaKind::parse(&kind_raw).ok_or_else(|| {
            sqlx::Error::Decode(format!("unknown media kind: {}", kind_raw).into())
        })?;

        Ok(AssetRow {
            asset: MediaAsset {
                id: row.try_get("id")?,
                object_name: row.try_get("object_name")?,
                kind,
                content_type: row.try_get("content_type")?,
                provider_asset_id: row.try_get("provider_asset_id")?,
                provider_upload_id: row.try_get("provider_upload_id")?,
                playback_id: row.try_get("playback_id")?,
                status,
                provider_status: row.try_get("provider_status")?,
                error_message: row.try_get("error_message")?,
                duration_seconds: row.try_get("duration_seconds")?,
                aspect_ratio: row.try_get("aspect_ratio")?,
                max_resolution: row.try_get("max_resolution")?,
                created_at: row.try_get("created_at")?,
                updated_at: row.try_get("updated_at")?,
            },
        })
    }
}
