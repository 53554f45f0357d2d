//! Configuration module
//!
//! Environment-driven configuration for the ingestion service: storage
//! endpoint/credential pairs (internal and public), bucket settings,
//! transcoding provider credentials, and upload limits.

use std::env;

use crate::constants::{
    DEFAULT_MAX_UPLOAD_SIZE_BYTES, DEFAULT_PROCESSING_WARN_AFTER_SECS, DEFAULT_URL_EXPIRY_SECS,
    MEDIA_KEY_PREFIX,
};

const DEFAULT_SERVER_PORT: u16 = 3000;

/// One storage endpoint with its credential pair.
///
/// The internal and public endpoints may differ in hostname, TLS termination,
/// and port; which one is used for a given call path is a configuration
/// decision, never runtime detection.
#[derive(Clone, Debug)]
pub struct StorageEndpoint {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
}

/// Object storage configuration (S3-compatible, e.g. MinIO).
#[derive(Clone, Debug)]
pub struct StorageConfig {
    /// Endpoint used by this service (server-side puts, stats, probes).
    pub internal: StorageEndpoint,
    /// Endpoint embedded in URLs handed to browsers/mobile clients.
    pub public: StorageEndpoint,
    pub region: String,
    pub bucket: String,
    /// Prefix granted public read when the bucket is newly created.
    pub public_read_prefix: String,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub storage: StorageConfig,
    /// Transcoding provider credentials; either may be absent or a placeholder.
    pub mux_token_id: Option<String>,
    pub mux_token_secret: Option<String>,
    /// Postgres URL for asset records. When unset, an in-memory store is used
    /// and records do not survive a restart.
    pub database_url: Option<String>,
    pub upload_url_expiry_secs: u64,
    pub max_upload_size_bytes: u64,
    pub processing_warn_after_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let internal_endpoint = require_env("STORAGE_INTERNAL_ENDPOINT")?;
        let access_key = require_env("STORAGE_ACCESS_KEY")?;
        let secret_key = require_env("STORAGE_SECRET_KEY")?;

        // Public endpoint defaults to the internal one for single-host setups.
        let public_endpoint =
            env_or("STORAGE_PUBLIC_ENDPOINT", internal_endpoint.clone());
        let public_access_key = env_or("STORAGE_PUBLIC_ACCESS_KEY", access_key.clone());
        let public_secret_key = env_or("STORAGE_PUBLIC_SECRET_KEY", secret_key.clone());

        let storage = StorageConfig {
            internal: StorageEndpoint {
                endpoint: internal_endpoint,
                access_key,
                secret_key,
            },
            public: StorageEndpoint {
                endpoint: public_endpoint,
                access_key: public_access_key,
                secret_key: public_secret_key,
            },
            region: env_or("STORAGE_REGION", "us-east-1".to_string()),
            bucket: require_env("STORAGE_BUCKET")?,
            public_read_prefix: env_or("STORAGE_PUBLIC_READ_PREFIX", MEDIA_KEY_PREFIX.to_string()),
        };

        Ok(Config {
            server_port: env_parse("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            environment: env_or("ENVIRONMENT", "development".to_string()),
            cors_origins: env_or("CORS_ORIGINS", "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            storage,
            mux_token_id: env::var("MUX_TOKEN_ID").ok(),
            mux_token_secret: env::var("MUX_TOKEN_SECRET").ok(),
            database_url: env::var("DATABASE_URL").ok(),
            upload_url_expiry_secs: env_parse("MEDIA_URL_EXPIRY_SECS", DEFAULT_URL_EXPIRY_SECS)?,
            max_upload_size_bytes: env_parse(
                "MAX_UPLOAD_SIZE_BYTES",
                DEFAULT_MAX_UPLOAD_SIZE_BYTES,
            )?,
            processing_warn_after_secs: env_parse(
                "PROCESSING_WARN_AFTER_SECS",
                DEFAULT_PROCESSING_WARN_AFTER_SECS,
            )?,
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Transcoding provider credentials, if both are present and neither is a
    /// placeholder value. `None` means ingestion submission is disabled.
    pub fn transcode_credentials(&self) -> Option<(&str, &str)> {
        match (self.mux_token_id.as_deref(), self.mux_token_secret.as_deref()) {
            (Some(id), Some(secret)) if !is_placeholder(id) && !is_placeholder(secret) => {
                Some((id, secret))
            }
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        for (name, endpoint) in [
            ("STORAGE_INTERNAL_ENDPOINT", &self.storage.internal.endpoint),
            ("STORAGE_PUBLIC_ENDPOINT", &self.storage.public.endpoint),
        ] {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(anyhow::anyhow!(
                    "{} must include a scheme (http:// or https://), got: {}",
                    name,
                    endpoint
                ));
            }
        }

        if self.storage.bucket.is_empty() {
            return Err(anyhow::anyhow!("STORAGE_BUCKET cannot be empty"));
        }

        if self.upload_url_expiry_secs == 0 {
            return Err(anyhow::anyhow!("MEDIA_URL_EXPIRY_SECS cannot be 0"));
        }

        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_BYTES cannot be 0"));
        }

        if self.is_production() && self.cors_origins.contains(&"*".to_string()) {
            tracing::warn!(
                "CORS configured to allow all origins (*) in production - set CORS_ORIGINS"
            );
        }

        Ok(())
    }
}

/// True for values that are clearly unconfigured: empty strings or the
/// copy-paste placeholders that ship in .env templates.
pub fn is_placeholder(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v.is_empty()
        || v.contains("your-")
        || v.contains("your_")
        || v.contains("changeme")
        || v.contains("change-me")
        || v.contains("placeholder")
        || v == "xxx"
}

fn require_env(key: &str) -> Result<String, anyhow::Error> {
    env::var(key).map_err(|_| anyhow::anyhow!("{} must be set", key))
}

fn env_or(key: &str, default: String) -> String {
    env::var(key).unwrap_or(default)
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T, anyhow::Error>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e)),
        Err(_) => Ok(default),
    }
}
