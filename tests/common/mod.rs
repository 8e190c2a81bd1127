//! Shared helpers for integration tests

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;

use guardian_eye::{
    alert_generator::AlertGenerator,
    alert_hub::AlertHub,
    blob_store::BlobStore,
    broadcast::AlertBroadcaster,
    directory::UserDirectory,
    prober::ReachabilityProber,
    state::{AppConfig, AppState},
    store::{AlertStore, CameraStore},
    thumbnail::ThumbnailCapturer,
    web_api,
};

pub const TEST_USER: &str = "test-user";

fn temp_thumbnail_dir() -> PathBuf {
    std::env::temp_dir().join(format!("guardian-eye-test-{}", uuid::Uuid::new_v4()))
}

pub fn test_config(degraded_env: bool) -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        thumbnail_dir: temp_thumbnail_dir(),
        degraded_env,
        stream_probe_timeout_secs: 1,
        connect_timeout_ms: 500,
        seed_users: vec![TEST_USER.to_string()],
    }
}

/// Build a full application state.
///
/// `degraded_env: true` makes every probe report online without network I/O,
/// standing in for a reachable camera; `false` exercises the real probe
/// strategies.
pub async fn create_test_state(degraded_env: bool) -> AppState {
    let config = test_config(degraded_env);

    let directory = Arc::new(UserDirectory::new());
    for user in &config.seed_users {
        directory.register(user).await;
    }

    let cameras = Arc::new(CameraStore::new());
    let alerts = Arc::new(AlertStore::new());
    let blobs = Arc::new(BlobStore::new(config.thumbnail_dir.clone()).await.unwrap());
    let hub = Arc::new(AlertHub::new());

    let prober = Arc::new(ReachabilityProber::with_timeouts(
        config.degraded_env,
        config.stream_probe_timeout_secs,
        config.connect_timeout_ms,
    ));
    let thumbnails = Arc::new(ThumbnailCapturer::new(
        blobs.clone(),
        cameras.clone(),
        config.stream_probe_timeout_secs,
        config.degraded_env,
    ));
    let broadcaster = Arc::new(AlertBroadcaster::new(cameras.clone(), hub.clone()));
    let generator = Arc::new(AlertGenerator::new(
        cameras.clone(),
        alerts.clone(),
        broadcaster.clone(),
    ));

    AppState {
        config,
        directory,
        cameras,
        alerts,
        blobs,
        hub,
        prober,
        thumbnails,
        broadcaster,
        generator,
    }
}

pub fn create_test_app(state: AppState) -> Router {
    web_api::create_router(state)
}

pub fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn delete_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn parse_response_body(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
