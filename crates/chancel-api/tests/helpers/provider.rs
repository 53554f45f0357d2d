//! Scripted transcoding provider for integration tests.
//!
//! Submissions succeed (or always fail for the failing variant); assets stay
//! `preparing` until a test marks them ready or errored.

use async_trait::async_trait;
use chancel_transcode::{
    DirectUpload, ProviderAsset, ProviderError, ProviderResult, ProviderStatus, SubmitOptions,
    TranscodeProvider,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeProvider {
    assets: Mutex<HashMap<String, ProviderAsset>>,
    uploads: Mutex<HashMap<String, DirectUpload>>,
    submit_count: AtomicUsize,
    fail_submit: bool,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        FakeProvider {
            fail_submit: true,
            ..Self::default()
        }
    }

    pub fn submissions(&self) -> usize {
        self.submit_count.load(Ordering::SeqCst)
    }

    pub fn mark_ready(&self, provider_asset_id: &str, playback_id: &str, duration: f64) {
        let mut assets = self.assets.lock().unwrap();
        let asset = assets.get_mut(provider_asset_id).unwrap();
        asset.status = ProviderStatus::Ready;
        asset.raw_status = "ready".to_string();
        asset.playback_id = Some(playback_id.to_string());
        asset.duration_seconds = Some(duration);
        asset.aspect_ratio = Some("16:9".to_string());
        asset.max_resolution = Some("HD".to_string());
    }

    pub fn mark_errored(&self, provider_asset_id: &str, message: &str) {
        let mut assets = self.assets.lock().unwrap();
        let asset = assets.get_mut(provider_asset_id).unwrap();
        asset.status = ProviderStatus::Errored;
        asset.raw_status = "errored".to_string();
        asset.error_message = Some(message.to_string());
    }

    /// Script the provider turning a finished direct upload into an asset.
    pub fn finish_upload(&self, upload_id: &str, provider_asset_id: &str) {
        let mut uploads = self.uploads.lock().unwrap();
        let upload = uploads.get_mut(upload_id).unwrap();
        upload.asset_id = Some(provider_asset_id.to_string());
        upload.raw_status = "asset_created".to_string();

        self.assets.lock().unwrap().insert(
            provider_asset_id.to_string(),
            ProviderAsset {
                provider_asset_id: provider_asset_id.to_string(),
                playback_id: None,
                status: ProviderStatus::Preparing,
                raw_status: "preparing".to_string(),
                duration_seconds: None,
                aspect_ratio: None,
                max_resolution: None,
                error_message: None,
            },
        );
    }
}

#[async_trait]
impl TranscodeProvider for FakeProvider {
    async fn submit_from_url(
        &self,
        _source_url: &str,
        _options: &SubmitOptions,
    ) -> ProviderResult<ProviderAsset> {
        self.submit_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_submit {
            return Err(ProviderError::Api {
                status: 422,
                message: "unsupported codec".to_string(),
            });
        }

        let n = self.submit_count.load(Ordering::SeqCst);
        let asset = ProviderAsset {
            provider_asset_id: format!("asset-{}", n),
            playback_id: None,
            status: ProviderStatus::Preparing,
            raw_status: "preparing".to_string(),
            duration_seconds: None,
            aspect_ratio: None,
            max_resolution: None,
            error_message: None,
        };
        self.assets
            .lock()
            .unwrap()
            .insert(asset.provider_asset_id.clone(), asset.clone());
        Ok(asset)
    }

    async fn get_asset(&self, provider_asset_id: &str) -> ProviderResult<ProviderAsset> {
        self.assets
            .lock()
            .unwrap()
            .get(provider_asset_id)
            .cloned()
            .ok_or_else(|| ProviderError::Api {
                status: 404,
                message: "asset not found".to_string(),
            })
    }

    async fn delete_asset(&self, provider_asset_id: &str) -> ProviderResult<()> {
        self.assets.lock().unwrap().remove(provider_asset_id);
        Ok(())
    }

    async fn create_direct_upload(&self, _options: &SubmitOptions) -> ProviderResult<DirectUpload> {
        let upload = DirectUpload {
            upload_id: "upload-1".to_string(),
            upload_url: Some("https://storage.provider.test/upload-1".to_string()),
            raw_status: "waiting".to_string(),
            asset_id: None,
        };
        self.uploads
            .lock()
            .unwrap()
            .insert(upload.upload_id.clone(), upload.clone());
        Ok(upload)
    }

    async fn get_direct_upload(&self, upload_id: &str) -> ProviderResult<DirectUpload> {
        self.uploads
            .lock()
            .unwrap()
            .get(upload_id)
            .cloned()
            .ok_or_else(|| ProviderError::Api {
                status: 404,
                message: "upload not found".to_string(),
            })
    }
}
