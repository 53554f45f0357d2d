//! Client-side upload state machine.
//!
//! Drives a file through the three-step ingestion flow: request an upload
//! slot, PUT the raw bytes to the presigned URL, then notify the server to
//! hand the object to the transcoding provider.
//!
//! Progress is a handful of coarse fixed checkpoints, not byte-level
//! tracking. Any failure moves the machine to `Error` with a human-readable
//! message and stops; the only recovery is re-invoking from the beginning
//! with a fresh upload, never resuming a failed step. All of this state is
//! in-memory only: dropping the controller (a closed browser tab, in the web
//! client) loses the progress view, while the server-side asset record and
//! provider job continue independently.

use crate::{api_prefix, ApiClient};
use anyhow::{Context, Result};
use chancel_core::models::{MediaAssetStatus, ProcessResponse, UploadUrlResponse};
use uuid::Uuid;

/// Phase of the upload state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    Idle,
    Uploading,
    Processing,
    Complete,
    Error,
}

/// Fixed progress checkpoints, as percentages.
const PROGRESS_SLOT_REQUESTED: u8 = 10;
const PROGRESS_BYTES_SENT: u8 = 20;
const PROGRESS_SUBMITTED: u8 = 50;
const PROGRESS_DONE: u8 = 100;

/// A progress report handed to the caller's callback.
#[derive(Debug, Clone)]
pub struct UploadProgress {
    pub phase: UploadPhase,
    pub percent: u8,
    pub message: String,
}

impl UploadProgress {
    fn new(phase: UploadPhase, percent: u8, message: impl Into<String>) -> Self {
        UploadProgress {
            phase,
            percent,
            message: message.into(),
        }
    }
}

/// Result of a completed upload flow.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub asset_id: Uuid,
    pub status: MediaAssetStatus,
    pub provider_asset_id: Option<String>,
    /// Playback manifest URL; may still be absent right after submission.
    pub hls_url: Option<String>,
    pub thumbnail_url: Option<String>,
}

impl ApiClient {
    /// Upload a media file end to end.
    ///
    /// The callback receives each checkpoint, including the final `Error`
    /// report when a step fails. On failure the returned error carries the
    /// same message; call again with the same bytes to start a fresh attempt.
    pub async fn upload_media<F>(
        &self,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
        mut on_progress: F,
    ) -> Result<UploadOutcome>
    where
        F: FnMut(UploadProgress),
    {
        // Step 1: request an upload slot.
        let slot: UploadUrlResponse = match self
            .post_json(
                &format!("{}/media/upload-url", api_prefix()),
                &serde_json::json!({
                    "filename": filename,
                    "content_type": content_type,
                }),
            )
            .await
        {
            Ok(slot) => slot,
            Err(e) => return Err(fail(&mut on_progress, "Failed to get an upload URL", e)),
        };
        on_progress(UploadProgress::new(
            UploadPhase::Uploading,
            PROGRESS_SLOT_REQUESTED,
            "Upload slot issued",
        ));

        // Step 2: PUT the raw bytes to the presigned URL. This talks straight
        // to object storage; a network interruption here is an upload
        // transport failure, independent of the API and the provider.
        let put_result = self
            .client()
            .put(&slot.upload_url)
            .header("Content-Type", content_type)
            .body(data)
            .send()
            .await
            .context("Upload interrupted while sending bytes to storage")
            .and_then(|response| {
                response
                    .error_for_status()
                    .context("Storage rejected the upload")
            });
        if let Err(e) = put_result {
            return Err(fail(&mut on_progress, "Failed to upload the file", e));
        }
        on_progress(UploadProgress::new(
            UploadPhase::Uploading,
            PROGRESS_BYTES_SENT,
            "File stored",
        ));

        // Step 3: notify the server so it submits the object for transcoding.
        let processed: ProcessResponse = match self
            .post_json(
                &format!("{}/media/process", api_prefix()),
                &serde_json::json!({ "object_name": slot.object_name }),
            )
            .await
        {
            Ok(processed) => processed,
            Err(e) => return Err(fail(&mut on_progress, "Failed to start processing", e)),
        };
        on_progress(UploadProgress::new(
            UploadPhase::Processing,
            PROGRESS_SUBMITTED,
            "Submitted for processing",
        ));

        let outcome = UploadOutcome {
            asset_id: processed.asset_id,
            status: processed.status,
            provider_asset_id: processed.provider_asset_id,
            hls_url: processed.playback.as_ref().map(|p| p.hls_url.clone()),
            thumbnail_url: processed.playback.as_ref().map(|p| p.thumbnail_url.clone()),
        };

        on_progress(UploadProgress::new(
            UploadPhase::Complete,
            PROGRESS_DONE,
            "Upload complete",
        ));

        Ok(outcome)
    }
}

/// Report the error checkpoint and produce the error to return.
fn fail<F>(on_progress: &mut F, summary: &str, err: anyhow::Error) -> anyhow::Error
where
    F: FnMut(UploadProgress),
{
    let message = format!("{}: {}", summary, err);
    on_progress(UploadProgress::new(UploadPhase::Error, 0, message.clone()));
    anyhow::anyhow!(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkpoints_are_coarse_and_ordered() {
        let checkpoints = [
            PROGRESS_SLOT_REQUESTED,
            PROGRESS_BYTES_SENT,
            PROGRESS_SUBMITTED,
            PROGRESS_DONE,
        ];
        assert!(checkpoints.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(checkpoints[0], 10);
        assert_eq!(checkpoints[3], 100);
    }

    #[test]
    fn test_error_report_carries_message_and_resets_progress() {
        let mut reports: Vec<UploadProgress> = Vec::new();
        let err = fail(
            &mut |p| reports.push(p),
            "Failed to upload the file",
            anyhow::anyhow!("connection reset"),
        );

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].phase, UploadPhase::Error);
        assert_eq!(reports[0].percent, 0);
        assert!(reports[0].message.contains("connection reset"));
        assert!(err.to_string().contains("Failed to upload the file"));
    }
}
