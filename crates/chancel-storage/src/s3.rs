use crate::traits::{
    Endpoint, ObjectNameStream, ObjectStat, ObjectStorage, StorageError, StorageResult,
};
use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_sdk_s3::Client;
use bytes::Bytes;
use chancel_core::config::{StorageConfig, StorageEndpoint};
use futures::stream::{self, StreamExt};
use std::time::Duration;

/// S3-compatible gateway (AWS S3, MinIO, DigitalOcean Spaces).
///
/// Holds one client per configured endpoint. Server-side operations (put,
/// stat, delete, list, bucket init, probe) always go through the internal
/// client; presigned URLs are minted against whichever endpoint the caller
/// selects, because SigV4 signs the host header and the two endpoints may
/// differ in hostname, TLS, and port.
#[derive(Clone)]
pub struct S3Gateway {
    internal: Client,
    public: Client,
    bucket: String,
    region: String,
    public_base: String,
    public_read_prefix: String,
}

impl S3Gateway {
    pub fn new(config: &StorageConfig) -> StorageResult<Self> {
        if config.bucket.is_empty() {
            return Err(StorageError::ConfigError("bucket name is empty".to_string()));
        }

        Ok(S3Gateway {
            internal: build_client(&config.internal, &config.region),
            public: build_client(&config.public, &config.region),
            bucket: config.bucket.clone(),
            region: config.region.clone(),
            public_base: canonical_base(&config.public.endpoint),
            public_read_prefix: config.public_read_prefix.clone(),
        })
    }

    fn client_for(&self, endpoint: Endpoint) -> &Client {
        match endpoint {
            Endpoint::Internal => &self.internal,
            Endpoint::Public => &self.public,
        }
    }
}

fn build_client(endpoint: &StorageEndpoint, region: &str) -> Client {
    let credentials = Credentials::new(
        endpoint.access_key.clone(),
        endpoint.secret_key.clone(),
        None,
        None,
        "chancel-static",
    );
    let config = aws_sdk_s3::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .endpoint_url(endpoint.endpoint.clone())
        .credentials_provider(credentials)
        .force_path_style(true)
        .build();
    Client::from_conf(config)
}

/// Canonical URL base for an endpoint: trailing slash trimmed and the port
/// omitted when it equals the protocol default (80 for HTTP, 443 for HTTPS).
fn canonical_base(endpoint: &str) -> String {
    let trimmed = endpoint.trim_end_matches('/');
    let Some((scheme, rest)) = trimmed.split_once("://") else {
        return trimmed.to_string();
    };
    let default_port = match scheme {
        "http" => "80",
        "https" => "443",
        _ => return trimmed.to_string(),
    };
    if let Some((host, port)) = rest.rsplit_once(':') {
        if port == default_port && !host.is_empty() && port.chars().all(|c| c.is_ascii_digit()) {
            return format!("{}://{}", scheme, host);
        }
    }
    trimmed.to_string()
}

/// Bucket policy granting anonymous read on the public sub-prefix only.
fn public_read_policy(bucket: &str, prefix: &str) -> String {
    serde_json::json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Principal": { "AWS": ["*"] },
            "Action": ["s3:GetObject"],
            "Resource": [format!("arn:aws:s3:::{}/{}*", bucket, prefix)]
        }]
    })
    .to_string()
}

fn fmt_sdk_err(err: impl std::error::Error) -> String {
    format!("{}", DisplayErrorContext(err))
}

#[async_trait]
impl ObjectStorage for S3Gateway {
    async fn presigned_put_url(
        &self,
        endpoint: Endpoint,
        object_name: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        let request = self
            .client_for(endpoint)
            .put_object()
            .bucket(&self.bucket)
            .key(object_name)
            .content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::BackendError(fmt_sdk_err(e)))?;

        tracing::info!(
            bucket = %self.bucket,
            key = %object_name,
            endpoint = ?endpoint,
            expires_in_secs = expires_in.as_secs(),
            "Generated presigned PUT URL"
        );

        Ok(request.uri().to_string())
    }

    async fn presigned_get_url(
        &self,
        endpoint: Endpoint,
        object_name: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        let request = self
            .client_for(endpoint)
            .get_object()
            .bucket(&self.bucket)
            .key(object_name)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::BackendError(fmt_sdk_err(e)))?;

        Ok(request.uri().to_string())
    }

    fn public_url(&self, object_name: &str) -> String {
        format!("{}/{}/{}", self.public_base, self.bucket, object_name)
    }

    async fn put(&self, object_name: &str, data: Bytes, content_type: &str) -> StorageResult<()> {
        let size = data.len() as u64;
        let start = std::time::Instant::now();

        self.internal
            .put_object()
            .bucket(&self.bucket)
            .key(object_name)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %DisplayErrorContext(&e),
                    bucket = %self.bucket,
                    key = %object_name,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                StorageError::UploadFailed(fmt_sdk_err(e))
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %object_name,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(())
    }

    async fn get(&self, object_name: &str) -> StorageResult<Bytes> {
        let response = match self
            .internal
            .get_object()
            .bucket(&self.bucket)
            .key(object_name)
            .send()
            .await
        {
            Ok(response) => response,
            Err(SdkError::ServiceError(ctx)) if ctx.err().is_no_such_key() => {
                return Err(StorageError::NotFound(object_name.to_string()));
            }
            Err(e) => return Err(StorageError::DownloadFailed(fmt_sdk_err(e))),
        };

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        Ok(data.into_bytes())
    }

    async fn delete(&self, object_name: &str) -> StorageResult<()> {
        let start = std::time::Instant::now();

        self.internal
            .delete_object()
            .bucket(&self.bucket)
            .key(object_name)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %DisplayErrorContext(&e),
                    bucket = %self.bucket,
                    key = %object_name,
                    "S3 delete failed"
                );
                StorageError::DeleteFailed(fmt_sdk_err(e))
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %object_name,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    async fn stat(&self, object_name: &str) -> StorageResult<ObjectStat> {
        match self
            .internal
            .head_object()
            .bucket(&self.bucket)
            .key(object_name)
            .send()
            .await
        {
            Ok(head) => Ok(ObjectStat {
                size: head.content_length().unwrap_or_default().max(0) as u64,
            }),
            Err(SdkError::ServiceError(ctx)) if ctx.err().is_not_found() => {
                Err(StorageError::NotFound(object_name.to_string()))
            }
            Err(e) => Err(StorageError::BackendError(fmt_sdk_err(e))),
        }
    }

    async fn list(&self, prefix: &str) -> StorageResult<ObjectNameStream> {
        let paginator = self
            .internal
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .into_paginator()
            .send();

        let pages = stream::unfold(paginator, |mut paginator| async move {
            paginator.next().await.map(|page| (page, paginator))
        });

        let names = pages.flat_map(|page| {
            let items: Vec<StorageResult<String>> = match page {
                Ok(output) => output
                    .contents()
                    .iter()
                    .filter_map(|object| object.key().map(|k| Ok(k.to_string())))
                    .collect(),
                Err(e) => vec![Err(StorageError::BackendError(fmt_sdk_err(e)))],
            };
            stream::iter(items)
        });

        Ok(Box::pin(names))
    }

    async fn ensure_bucket(&self) -> StorageResult<()> {
        match self.internal.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => {
                tracing::debug!(bucket = %self.bucket, "Bucket already exists");
                return Ok(());
            }
            Err(SdkError::ServiceError(ctx)) if ctx.err().is_not_found() => {}
            Err(e) => return Err(StorageError::BackendError(fmt_sdk_err(e))),
        }

        let mut create = self.internal.create_bucket().bucket(&self.bucket);
        if self.region != "us-east-1" {
            create = create.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }

        match create.send().await {
            Ok(_) => {
                tracing::info!(bucket = %self.bucket, region = %self.region, "Bucket created");
            }
            Err(SdkError::ServiceError(ctx))
                if ctx.err().is_bucket_already_owned_by_you()
                    || ctx.err().is_bucket_already_exists() =>
            {
                // Lost a creation race; the winner applied the policy.
                return Ok(());
            }
            Err(e) => return Err(StorageError::BackendError(fmt_sdk_err(e))),
        }

        let policy = public_read_policy(&self.bucket, &self.public_read_prefix);
        self.internal
            .put_bucket_policy()
            .bucket(&self.bucket)
            .policy(&policy)
            .send()
            .await
            .map_err(|e| StorageError::BackendError(fmt_sdk_err(e)))?;

        tracing::info!(
            bucket = %self.bucket,
            prefix = %self.public_read_prefix,
            "Applied public-read policy to media prefix"
        );

        Ok(())
    }

    async fn probe(&self) -> StorageResult<()> {
        self.internal
            .list_buckets()
            .send()
            .await
            .map_err(|e| StorageError::BackendError(fmt_sdk_err(e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chancel_core::config::StorageConfig;

    fn test_storage_config() -> StorageConfig {
        let internal = StorageEndpoint {
            endpoint: "http://minio:9000".to_string(),
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
        };
        let public = StorageEndpoint {
            endpoint: "https://media.example.org:443".to_string(),
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
        };
        StorageConfig {
            internal,
            public,
            region: "us-east-1".to_string(),
            bucket: "chancel-media".to_string(),
            public_read_prefix: "media/".to_string(),
        }
    }

    #[test]
    fn test_canonical_base_strips_default_ports() {
        assert_eq!(
            canonical_base("https://media.example.org:443"),
            "https://media.example.org"
        );
        assert_eq!(
            canonical_base("http://media.example.org:80/"),
            "http://media.example.org"
        );
    }

    #[test]
    fn test_canonical_base_keeps_explicit_ports() {
        assert_eq!(
            canonical_base("http://localhost:9000"),
            "http://localhost:9000"
        );
        assert_eq!(
            canonical_base("https://minio.internal:9443/"),
            "https://minio.internal:9443"
        );
    }

    #[test]
    fn test_public_url_is_canonical_and_path_style() {
        let gateway = S3Gateway::new(&test_storage_config()).unwrap();
        assert_eq!(
            gateway.public_url("media/abc.mp4"),
            "https://media.example.org/chancel-media/media/abc.mp4"
        );
    }

    #[test]
    fn test_public_read_policy_scopes_prefix_only() {
        let policy = public_read_policy("chancel-media", "media/");
        assert!(policy.contains("arn:aws:s3:::chancel-media/media/*"));
        // Never the whole bucket.
        assert!(!policy.contains("arn:aws:s3:::chancel-media/*"));
        assert!(policy.contains("s3:GetObject"));
    }

    #[tokio::test]
    async fn test_presigned_put_url_is_minted_offline() {
        // SigV4 presigning is a local computation; no network involved.
        let gateway = S3Gateway::new(&test_storage_config()).unwrap();
        let url = gateway
            .presigned_put_url(
                Endpoint::Public,
                "media/abc.mp4",
                "video/mp4",
                Duration::from_secs(3600),
            )
            .await
            .unwrap();

        assert!(url.contains("media/abc.mp4"));
        assert!(url.contains("X-Amz-Expires=3600"));
        assert!(url.starts_with("https://media.example.org"));
    }

    #[tokio::test]
    async fn test_presigned_urls_differ_per_endpoint() {
        let gateway = S3Gateway::new(&test_storage_config()).unwrap();
        let internal = gateway
            .presigned_get_url(Endpoint::Internal, "media/abc.mp4", Duration::from_secs(60))
            .await
            .unwrap();
        let public = gateway
            .presigned_get_url(Endpoint::Public, "media/abc.mp4", Duration::from_secs(60))
            .await
            .unwrap();

        assert!(internal.starts_with("http://minio:9000"));
        assert!(public.starts_with("https://media.example.org"));
    }
}
