//! Direct-upload (provider-native) integration tests.
//!
//! Run with: `cargo test -p chancel-api --test direct_upload_test`

mod helpers;

use chancel_core::models::{DirectUploadResponse, MediaAssetResponse, MediaAssetStatus};
use chancel_storage::ObjectStorage;
use helpers::{api_path, setup_test_app, setup_test_app_without_provider};

#[tokio::test]
async fn test_direct_upload_bypasses_object_storage() {
    let app = setup_test_app().await;

    let response = app.server.post(&api_path("/media/direct-upload")).await;
    assert_eq!(response.status_code().as_u16(), 201);
    let created: DirectUploadResponse = response.json();
    assert_eq!(created.status, MediaAssetStatus::Pending);
    assert!(created.upload_url.starts_with("https://storage.provider.test/"));

    // Nothing landed in our bucket.
    use futures::StreamExt;
    let listed: Vec<_> = app
        .storage
        .list("media/")
        .await
        .unwrap()
        .collect::<Vec<_>>()
        .await;
    assert!(listed.is_empty());

    // Once the provider turns the upload into an asset, the record advances
    // like any other: callers cannot tell which mode was used.
    app.provider.finish_upload("upload-1", "asset-direct");
    let asset: MediaAssetResponse = app
        .server
        .get(&api_path(&format!("/media/{}", created.asset_id)))
        .await
        .json();
    assert_eq!(asset.status, MediaAssetStatus::Processing);

    app.provider.mark_ready("asset-direct", "direct-play", 42.0);
    let asset: MediaAssetResponse = app
        .server
        .get(&api_path(&format!("/media/{}", created.asset_id)))
        .await
        .json();
    assert_eq!(asset.status, MediaAssetStatus::Ready);
    assert!(asset.playback.unwrap().hls_url.contains("direct-play"));
}

#[tokio::test]
async fn test_direct_upload_requires_credentials() {
    let app = setup_test_app_without_provider().await;

    let response = app.server.post(&api_path("/media/direct-upload")).await;
    assert_eq!(response.status_code().as_u16(), 502);
}
