//! In-memory storage backend.
//!
//! Used by the test suites and for dependency-free local development. The
//! "presigned" URLs it mints are inert `memory://` URLs; tests simulate the
//! client's raw PUT by calling [`ObjectStorage::put`] directly.

use crate::traits::{
    Endpoint, ObjectNameStream, ObjectStat, ObjectStorage, StorageError, StorageResult,
};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

pub struct MemoryStorage {
    bucket: String,
    objects: RwLock<HashMap<String, (Bytes, String)>>,
}

impl MemoryStorage {
    pub fn new(bucket: impl Into<String>) -> Self {
        MemoryStorage {
            bucket: bucket.into(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    fn base(&self, endpoint: Endpoint) -> &'static str {
        match endpoint {
            Endpoint::Internal => "memory://internal",
            Endpoint::Public => "memory://public",
        }
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn presigned_put_url(
        &self,
        endpoint: Endpoint,
        object_name: &str,
        _content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        Ok(format!(
            "{}/{}/{}?X-Amz-Expires={}",
            self.base(endpoint),
            self.bucket,
            object_name,
            expires_in.as_secs()
        ))
    }

    async fn presigned_get_url(
        &self,
        endpoint: Endpoint,
        object_name: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        Ok(format!(
            "{}/{}/{}?X-Amz-Expires={}",
            self.base(endpoint),
            self.bucket,
            object_name,
            expires_in.as_secs()
        ))
    }

    fn public_url(&self, object_name: &str) -> String {
        format!("memory://public/{}/{}", self.bucket, object_name)
    }

    async fn put(&self, object_name: &str, data: Bytes, content_type: &str) -> StorageResult<()> {
        self.objects
            .write()
            .await
            .insert(object_name.to_string(), (data, content_type.to_string()));
        Ok(())
    }

    async fn get(&self, object_name: &str) -> StorageResult<Bytes> {
        self.objects
            .read()
            .await
            .get(object_name)
            .map(|(data, _)| data.clone())
            .ok_or_else(|| StorageError::NotFound(object_name.to_string()))
    }

    async fn delete(&self, object_name: &str) -> StorageResult<()> {
        self.objects.write().await.remove(object_name);
        Ok(())
    }

    async fn stat(&self, object_name: &str) -> StorageResult<ObjectStat> {
        self.objects
            .read()
            .await
            .get(object_name)
            .map(|(data, _)| ObjectStat {
                size: data.len() as u64,
            })
            .ok_or_else(|| StorageError::NotFound(object_name.to_string()))
    }

    async fn list(&self, prefix: &str) -> StorageResult<ObjectNameStream> {
        let mut names: Vec<String> = self
            .objects
            .read()
            .await
            .keys()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .collect();
        names.sort();
        Ok(Box::pin(stream::iter(names.into_iter().map(Ok))))
    }

    async fn ensure_bucket(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn probe(&self) -> StorageResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_put_then_get_round_trip() {
        let storage = MemoryStorage::new("test-bucket");
        let payload = Bytes::from_static(b"raw video bytes");

        storage
            .put("media/a.mp4", payload.clone(), "video/mp4")
            .await
            .unwrap();

        assert_eq!(storage.get("media/a.mp4").await.unwrap(), payload);
        assert_eq!(storage.stat("media/a.mp4").await.unwrap().size, 15);
    }

    #[tokio::test]
    async fn test_stat_missing_object_is_not_found() {
        let storage = MemoryStorage::new("test-bucket");
        assert!(matches!(
            storage.stat("media/missing.mp4").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let storage = MemoryStorage::new("test-bucket");
        storage
            .put("media/a.mp4", Bytes::from_static(b"x"), "video/mp4")
            .await
            .unwrap();
        storage.delete("media/a.mp4").await.unwrap();
        storage.delete("media/a.mp4").await.unwrap();
        assert!(storage.get("media/a.mp4").await.is_err());
    }

    #[tokio::test]
    async fn test_list_filters_by_prefix() {
        let storage = MemoryStorage::new("test-bucket");
        for name in ["media/a.mp4", "media/b.mp3", "other/c.bin"] {
            storage
                .put(name, Bytes::from_static(b"x"), "application/octet-stream")
                .await
                .unwrap();
        }

        let names: Vec<String> = storage
            .list("media/")
            .await
            .unwrap()
            .map(|r| r.unwrap())
            .collect()
            .await;

        assert_eq!(names, vec!["media/a.mp4", "media/b.mp3"]);
    }

    #[tokio::test]
    async fn test_presigned_urls_embed_object_and_expiry() {
        let storage = MemoryStorage::new("test-bucket");
        let url = storage
            .presigned_put_url(
                Endpoint::Public,
                "media/a.mp4",
                "video/mp4",
                Duration::from_secs(900),
            )
            .await
            .unwrap();

        assert!(url.contains("media/a.mp4"));
        assert!(url.contains("X-Amz-Expires=900"));
        assert!(url.starts_with("memory://public/"));
    }
}
