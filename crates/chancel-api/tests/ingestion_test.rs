//! Media ingestion API integration tests.
//!
//! Run with: `cargo test -p chancel-api --test ingestion_test`
//! No external services required; see helpers.

mod helpers;

use chancel_core::models::{
    MediaAssetResponse, MediaAssetStatus, ProcessResponse, RetryResponse, UploadUrlResponse,
};
use helpers::{
    api_path, setup_test_app, setup_test_app_with_failing_provider,
    setup_test_app_without_provider,
};

#[tokio::test]
async fn test_full_upload_and_process_scenario() {
    let app = setup_test_app().await;

    // Step 1: request an upload slot.
    let response = app
        .server
        .post(&api_path("/media/upload-url"))
        .json(&serde_json::json!({
            "filename": "sermon.mp4",
            "content_type": "video/mp4"
        }))
        .await;
    assert_eq!(response.status_code().as_u16(), 200);
    let slot: UploadUrlResponse = response.json();
    assert!(slot.upload_url.contains(&slot.object_name));
    assert!(slot.object_name.starts_with("media/"));

    // Step 2: the client PUTs the bytes to the presigned URL.
    app.upload_object(&slot.object_name, b"fifty megabytes of sermon video")
        .await;

    // Step 3: trigger submission to the transcoding provider.
    let response = app
        .server
        .post(&api_path("/media/process"))
        .json(&serde_json::json!({ "object_name": slot.object_name }))
        .await;
    assert_eq!(response.status_code().as_u16(), 200);
    let processed: ProcessResponse = response.json();
    assert_eq!(processed.status, MediaAssetStatus::Processing);
    let provider_asset_id = processed.provider_asset_id.clone().unwrap();

    // Step 4: provider finishes; the record becomes ready with playback URLs.
    app.provider.mark_ready(&provider_asset_id, "abc123", 120.5);

    let response = app
        .server
        .get(&api_path(&format!("/media/{}", processed.asset_id)))
        .await;
    assert_eq!(response.status_code().as_u16(), 200);
    let asset: MediaAssetResponse = response.json();
    assert_eq!(asset.status, MediaAssetStatus::Ready);
    assert_eq!(asset.duration_seconds, Some(120.5));
    let playback = asset.playback.unwrap();
    assert!(playback.hls_url.contains("abc123"));
    assert!(playback.thumbnail_url.contains("abc123"));
}

#[tokio::test]
async fn test_process_is_idempotent() {
    let app = setup_test_app().await;

    let slot: UploadUrlResponse = app
        .server
        .post(&api_path("/media/upload-url"))
        .json(&serde_json::json!({
            "filename": "sermon.mp4",
            "content_type": "video/mp4"
        }))
        .await
        .json();
    app.upload_object(&slot.object_name, b"bytes").await;

    let first: ProcessResponse = app
        .server
        .post(&api_path("/media/process"))
        .json(&serde_json::json!({ "object_name": slot.object_name }))
        .await
        .json();
    let second: ProcessResponse = app
        .server
        .post(&api_path("/media/process"))
        .json(&serde_json::json!({ "object_name": slot.object_name }))
        .await
        .json();

    assert_eq!(first.provider_asset_id, second.provider_asset_id);
    assert_eq!(app.provider.submissions(), 1);
}

#[tokio::test]
async fn test_process_before_upload_returns_gone() {
    let app = setup_test_app().await;

    let slot: UploadUrlResponse = app
        .server
        .post(&api_path("/media/upload-url"))
        .json(&serde_json::json!({
            "filename": "sermon.mp4",
            "content_type": "video/mp4"
        }))
        .await
        .json();

    let response = app
        .server
        .post(&api_path("/media/process"))
        .json(&serde_json::json!({ "object_name": slot.object_name }))
        .await;

    assert_eq!(response.status_code().as_u16(), 410);
}

#[tokio::test]
async fn test_process_unknown_object_returns_not_found() {
    let app = setup_test_app().await;

    let response = app
        .server
        .post(&api_path("/media/process"))
        .json(&serde_json::json!({ "object_name": "media/never-issued.mp4" }))
        .await;

    assert_eq!(response.status_code().as_u16(), 404);
}

#[tokio::test]
async fn test_missing_provider_credentials_disable_submission_only() {
    let app = setup_test_app_without_provider().await;

    // Upload slots still work.
    let response = app
        .server
        .post(&api_path("/media/upload-url"))
        .json(&serde_json::json!({
            "filename": "sermon.mp4",
            "content_type": "video/mp4"
        }))
        .await;
    assert_eq!(response.status_code().as_u16(), 200);
    let slot: UploadUrlResponse = response.json();

    app.upload_object(&slot.object_name, b"bytes").await;

    // Submission fails with a typed submission error.
    let response = app
        .server
        .post(&api_path("/media/process"))
        .json(&serde_json::json!({ "object_name": slot.object_name }))
        .await;
    assert_eq!(response.status_code().as_u16(), 502);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "SUBMISSION_FAILED");
}

#[tokio::test]
async fn test_unsupported_content_type_rejected() {
    let app = setup_test_app().await;

    let response = app
        .server
        .post(&api_path("/media/upload-url"))
        .json(&serde_json::json!({
            "filename": "setup.exe",
            "content_type": "application/x-msdownload"
        }))
        .await;

    assert_eq!(response.status_code().as_u16(), 400);
}

#[tokio::test]
async fn test_stuck_processing_stays_processing() {
    let app = setup_test_app().await;

    let slot: UploadUrlResponse = app
        .server
        .post(&api_path("/media/upload-url"))
        .json(&serde_json::json!({
            "filename": "sermon.mp4",
            "content_type": "video/mp4"
        }))
        .await
        .json();
    app.upload_object(&slot.object_name, b"bytes").await;

    let processed: ProcessResponse = app
        .server
        .post(&api_path("/media/process"))
        .json(&serde_json::json!({ "object_name": slot.object_name }))
        .await
        .json();

    // The provider never reports ready; every fetch keeps returning
    // processing with the raw provider status, no silent promotion.
    for _ in 0..3 {
        let asset: MediaAssetResponse = app
            .server
            .get(&api_path(&format!("/media/{}", processed.asset_id)))
            .await
            .json();
        assert_eq!(asset.status, MediaAssetStatus::Processing);
        assert_eq!(asset.provider_status.as_deref(), Some("preparing"));
        assert!(asset.playback.is_none());
    }
}

#[tokio::test]
async fn test_failed_submission_then_retry_issues_fresh_slot() {
    let app = setup_test_app_with_failing_provider().await;

    let slot: UploadUrlResponse = app
        .server
        .post(&api_path("/media/upload-url"))
        .json(&serde_json::json!({
            "filename": "sermon.mp4",
            "content_type": "video/mp4"
        }))
        .await
        .json();
    app.upload_object(&slot.object_name, b"bytes").await;

    let response = app
        .server
        .post(&api_path("/media/process"))
        .json(&serde_json::json!({ "object_name": slot.object_name }))
        .await;
    assert_eq!(response.status_code().as_u16(), 502);

    // The record is errored with the provider's message preserved.
    let asset_id = app.asset_id_for(&slot.object_name).await;
    let errored: MediaAssetResponse = app
        .server
        .get(&api_path(&format!("/media/{}", asset_id)))
        .await
        .json();
    assert_eq!(errored.status, MediaAssetStatus::Errored);
    assert!(errored
        .error_message
        .as_deref()
        .unwrap()
        .contains("unsupported codec"));

    // Operator "try again": discard the attempt, get a fresh slot.
    let response = app
        .server
        .post(&api_path(&format!("/media/{}/retry", asset_id)))
        .await;
    assert_eq!(response.status_code().as_u16(), 200);
    let retried: RetryResponse = response.json();
    assert_eq!(retried.asset_id, asset_id);
    assert_eq!(retried.status, MediaAssetStatus::Pending);
    assert_ne!(retried.object_name, slot.object_name);
}

#[tokio::test]
async fn test_delete_media_removes_record() {
    let app = setup_test_app().await;

    let slot: UploadUrlResponse = app
        .server
        .post(&api_path("/media/upload-url"))
        .json(&serde_json::json!({
            "filename": "sermon.mp4",
            "content_type": "video/mp4"
        }))
        .await
        .json();
    app.upload_object(&slot.object_name, b"bytes").await;

    let processed: ProcessResponse = app
        .server
        .post(&api_path("/media/process"))
        .json(&serde_json::json!({ "object_name": slot.object_name }))
        .await
        .json();

    let response = app
        .server
        .delete(&api_path(&format!("/media/{}", processed.asset_id)))
        .await;
    assert_eq!(response.status_code().as_u16(), 204);

    let response = app
        .server
        .get(&api_path(&format!("/media/{}", processed.asset_id)))
        .await;
    assert_eq!(response.status_code().as_u16(), 404);
}

#[tokio::test]
async fn test_get_unknown_asset_returns_not_found() {
    let app = setup_test_app().await;

    let response = app
        .server
        .get(&api_path(&format!("/media/{}", uuid::Uuid::new_v4())))
        .await;

    assert_eq!(response.status_code().as_u16(), 404);
}
