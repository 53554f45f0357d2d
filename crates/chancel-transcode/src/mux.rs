//! Mux Video API client.
//!
//! Implements [`TranscodeProvider`] against the Mux REST API
//! (`/video/v1/assets`, `/video/v1/uploads`) with basic auth. Provider error
//! messages are preserved verbatim so operators see what Mux actually said.

use crate::traits::{
    DirectUpload, PlaybackPolicy, ProviderAsset, ProviderError, ProviderResult, ProviderStatus,
    SubmitOptions, TranscodeProvider,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.mux.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct MuxClient {
    http: reqwest::Client,
    base_url: String,
    auth_header: String,
}

impl MuxClient {
    pub fn new(token_id: &str, token_secret: &str) -> ProviderResult<Self> {
        Self::with_base_url(token_id, token_secret, DEFAULT_BASE_URL)
    }

    /// Point the client at a different API host (test servers).
    pub fn with_base_url(
        token_id: &str,
        token_secret: &str,
        base_url: &str,
    ) -> ProviderResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::Request(format!("Failed to create HTTP client: {}", e)))?;

        let auth_header = format!(
            "Basic {}",
            BASE64.encode(format!("{}:{}", token_id, token_secret))
        );

        Ok(MuxClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header,
        })
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> ProviderResult<T> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<Envelope<T>>()
                .await
                .map(|envelope| envelope.data)
                .map_err(|e| ProviderError::Decode(e.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body)
            .unwrap_or_else(|| if body.is_empty() { status.to_string() } else { body.clone() });

        if status.as_u16() == 401 {
            Err(ProviderError::Unauthorized(message))
        } else {
            Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl TranscodeProvider for MuxClient {
    #[tracing::instrument(skip(self, source_url), fields(provider = "mux"))]
    async fn submit_from_url(
        &self,
        source_url: &str,
        options: &SubmitOptions,
    ) -> ProviderResult<ProviderAsset> {
        let body = serde_json::json!({
            "input": [{ "url": source_url }],
            "playback_policy": [options.policy.as_str()],
            "mp4_support": if options.progressive_download { "standard" } else { "none" },
        });

        let response = self
            .http
            .post(format!("{}/video/v1/assets", self.base_url))
            .header("Authorization", &self.auth_header)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let data: AssetData = self.handle_response(response).await?;

        tracing::info!(
            provider_asset_id = %data.id,
            status = %data.status,
            "Submitted source to transcoding provider"
        );

        Ok(data.into_provider_asset())
    }

    #[tracing::instrument(skip(self), fields(provider = "mux"))]
    async fn get_asset(&self, provider_asset_id: &str) -> ProviderResult<ProviderAsset> {
        let response = self
            .http
            .get(format!(
                "{}/video/v1/assets/{}",
                self.base_url, provider_asset_id
            ))
            .header("Authorization", &self.auth_header)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let data: AssetData = self.handle_response(response).await?;
        Ok(data.into_provider_asset())
    }

    #[tracing::instrument(skip(self), fields(provider = "mux"))]
    async fn delete_asset(&self, provider_asset_id: &str) -> ProviderResult<()> {
        let response = self
            .http
            .delete(format!(
                "{}/video/v1/assets/{}",
                self.base_url, provider_asset_id
            ))
            .header("Authorization", &self.auth_header)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(provider_asset_id = %provider_asset_id, "Deleted provider asset");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body).unwrap_or_else(|| status.to_string());
        if status.as_u16() == 401 {
            Err(ProviderError::Unauthorized(message))
        } else {
            Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    #[tracing::instrument(skip(self), fields(provider = "mux"))]
    async fn create_direct_upload(&self, options: &SubmitOptions) -> ProviderResult<DirectUpload> {
        let body = serde_json::json!({
            "new_asset_settings": {
                "playback_policy": [options.policy.as_str()],
                "mp4_support": if options.progressive_download { "standard" } else { "none" },
            },
            "cors_origin": "*",
        });

        let response = self
            .http
            .post(format!("{}/video/v1/uploads", self.base_url))
            .header("Authorization", &self.auth_header)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let data: UploadData = self.handle_response(response).await?;

        tracing::info!(upload_id = %data.id, "Created provider direct upload");

        Ok(data.into_direct_upload())
    }

    #[tracing::instrument(skip(self), fields(provider = "mux"))]
    async fn get_direct_upload(&self, upload_id: &str) -> ProviderResult<DirectUpload> {
        let response = self
            .http
            .get(format!("{}/video/v1/uploads/{}", self.base_url, upload_id))
            .header("Authorization", &self.auth_header)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let data: UploadData = self.handle_response(response).await?;
        Ok(data.into_direct_upload())
    }
}

// ----- Wire types -----

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct AssetData {
    id: String,
    status: String,
    #[serde(default)]
    playback_ids: Vec<PlaybackIdData>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    aspect_ratio: Option<String>,
    #[serde(default)]
    max_stored_resolution: Option<String>,
    #[serde(default)]
    errors: Option<AssetErrors>,
}

#[derive(Debug, Deserialize)]
struct PlaybackIdData {
    id: String,
    #[serde(default)]
    #[allow(dead_code)]
    policy: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AssetErrors {
    #[serde(default)]
    messages: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    id: String,
    status: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    asset_id: Option<String>,
}

impl AssetData {
    fn into_provider_asset(self) -> ProviderAsset {
        // An empty playback id means "not yet allocated", not an error.
        let playback_id = self
            .playback_ids
            .into_iter()
            .map(|p| p.id)
            .find(|id| !id.is_empty());

        let error_message = self
            .errors
            .map(|e| e.messages.join("; "))
            .filter(|m| !m.is_empty());

        ProviderAsset {
            provider_asset_id: self.id,
            playback_id,
            status: ProviderStatus::from_raw(&self.status),
            raw_status: self.status,
            duration_seconds: self.duration,
            aspect_ratio: self.aspect_ratio,
            max_resolution: self.max_stored_resolution,
            error_message,
        }
    }
}

impl UploadData {
    fn into_direct_upload(self) -> DirectUpload {
        DirectUpload {
            upload_id: self.id,
            upload_url: self.url.filter(|u| !u.is_empty()),
            raw_status: self.status,
            asset_id: self.asset_id.filter(|id| !id.is_empty()),
        }
    }
}

/// Best-effort extraction of the human-readable message from a Mux error
/// body: `{"error": {"type": "...", "messages": ["..."]}}`.
fn extract_error_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorEnvelope {
        error: ErrorBody,
    }
    #[derive(Deserialize)]
    struct ErrorBody {
        #[serde(default)]
        messages: Vec<String>,
        #[serde(default, rename = "type")]
        error_type: Option<String>,
    }

    let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;
    let joined = envelope.error.messages.join("; ");
    if !joined.is_empty() {
        Some(joined)
    } else {
        envelope.error.error_type
    }
}

impl std::fmt::Debug for MuxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Auth header intentionally omitted.
        f.debug_struct("MuxClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}
