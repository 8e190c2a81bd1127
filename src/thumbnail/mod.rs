//! ThumbnailCapturer - representative frame capture
//!
//! ## Responsibilities
//!
//! - One-frame grabs off the request path (fire-and-forget tasks)
//! - JPEG persistence via the blob store
//! - Per-camera serialization of concurrent captures
//!
//! Failures are swallowed and logged; the capturer never raises to a caller.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::blob_store::BlobStore;
use crate::capture;
use crate::endpoint;
use crate::error::{Error, Result};
use crate::store::{Camera, CameraStore};

/// ThumbnailCapturer instance
pub struct ThumbnailCapturer {
    /// HTTP client for snapshot-style http(s) endpoints
    client: reqwest::Client,
    blobs: Arc<BlobStore>,
    cameras: Arc<CameraStore>,
    /// Per-camera capture locks; concurrent triggers for the same camera
    /// are skipped rather than queued
    locks: RwLock<HashMap<String, Arc<Mutex<()>>>>,
    capture_timeout_secs: u64,
    degraded_env: bool,
}

impl ThumbnailCapturer {
    /// Create new ThumbnailCapturer
    pub fn new(
        blobs: Arc<BlobStore>,
        cameras: Arc<CameraStore>,
        capture_timeout_secs: u64,
        degraded_env: bool,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            client,
            blobs,
            cameras,
            locks: RwLock::new(HashMap::new()),
            capture_timeout_secs,
            degraded_env,
        }
    }

    /// Run a capture as a detached background task
    pub fn spawn_capture(self: Arc<Self>, camera: Camera) {
        tokio::spawn(async move {
            self.capture(&camera).await;
        });
    }

    /// Persist a frame already read by a stream probe, detached
    pub fn spawn_store_frame(self: Arc<Self>, camera: Camera, frame: Vec<u8>) {
        tokio::spawn(async move {
            self.store_frame(&camera, frame).await;
        });
    }

    /// Capture one frame for the camera and store it.
    ///
    /// Returns a success indicator only; every failure is logged here.
    pub async fn capture(&self, camera: &Camera) -> bool {
        if self.degraded_env {
            tracing::debug!(camera_id = %camera.id, "Degraded environment, skipping capture");
            return true;
        }

        let Some(_guard) = self.try_acquire(&camera.id).await else {
            tracing::debug!(camera_id = %camera.id, "Capture already in progress, skipping");
            return false;
        };

        let url = endpoint::derive_capture_url(
            &camera.ip_address,
            camera.stream_url.as_deref(),
            camera.camera_type,
        );

        let result = if url.starts_with("http://") || url.starts_with("https://") {
            self.fetch_http(&url).await
        } else {
            capture::grab_frame(&url, self.capture_timeout_secs).await
        };

        match result {
            Ok(data) => self.store_frame(camera, data).await,
            Err(e) => {
                tracing::warn!(
                    camera_id = %camera.id,
                    url = %url,
                    error = %e,
                    "Thumbnail capture failed"
                );
                false
            }
        }
    }

    /// Store frame bytes under a collision-resistant name and record the
    /// reference on the camera.
    pub async fn store_frame(&self, camera: &Camera, data: Vec<u8>) -> bool {
        let name = format!("{}_{}.jpg", camera.id, Utc::now().timestamp());

        let reference = match self.blobs.save(&name, &data).await {
            Ok(reference) => reference,
            Err(e) => {
                tracing::warn!(camera_id = %camera.id, error = %e, "Thumbnail save failed");
                return false;
            }
        };

        // Camera may have been deleted while the capture ran; not an error
        if let Err(e) = self.cameras.set_thumbnail(&camera.id, &reference).await {
            tracing::debug!(camera_id = %camera.id, error = %e, "Camera gone before thumbnail record");
            return false;
        }

        tracing::info!(
            camera_id = %camera.id,
            reference = %reference,
            size = data.len(),
            "Thumbnail stored"
        );

        true
    }

    /// Snapshot fetch for http(s) endpoints
    async fn fetch_http(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self.client.get(url).send().await?;

        if !resp.status().is_success() {
            return Err(Error::Capture(format!(
                "Snapshot HTTP error: {}",
                resp.status()
            )));
        }

        let bytes = resp.bytes().await?;
        Ok(bytes.to_vec())
    }

    /// Per-camera capture lock, non-blocking
    async fn try_acquire(&self, camera_id: &str) -> Option<OwnedMutexGuard<()>> {
        let lock = {
            let locks = self.locks.read().await;
            locks.get(camera_id).cloned()
        };

        let lock = match lock {
            Some(lock) => lock,
            None => {
                let mut locks = self.locks.write().await;
                locks
                    .entry(camera_id.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(())))
                    .clone()
            }
        };

        lock.try_lock_owned().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CameraStatus, CameraType, CreateCameraRequest};
    use std::path::PathBuf;

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("guardian-eye-thumbs-{}", uuid::Uuid::new_v4()))
    }

    async fn fixture(degraded: bool) -> (Arc<ThumbnailCapturer>, Arc<CameraStore>, Camera) {
        let blobs = Arc::new(BlobStore::new(temp_root()).await.unwrap());
        let cameras = Arc::new(CameraStore::new());
        let camera = cameras
            .create_camera(
                CreateCameraRequest {
                    user_id: "u1".to_string(),
                    name: "Test Camera".to_string(),
                    ip_address: "192.168.1.100".to_string(),
                    location: "Test Location".to_string(),
                    description: None,
                    camera_type: CameraType::Rtsp,
                    stream_url: None,
                    enable_motion_detection: true,
                    enable_sound_detection: false,
                },
                CameraStatus::Online,
            )
            .await
            .unwrap();
        let capturer = Arc::new(ThumbnailCapturer::new(blobs, cameras.clone(), 1, degraded));
        (capturer, cameras, camera)
    }

    #[tokio::test]
    async fn degraded_environment_skips_capture() {
        let (capturer, cameras, camera) = fixture(true).await;

        assert!(capturer.capture(&camera).await);
        // No frame was grabbed, so no reference was recorded
        let stored = cameras.get_camera(&camera.id).await.unwrap();
        assert!(stored.thumbnail.is_none());
    }

    #[tokio::test]
    async fn store_frame_records_reference() {
        let (capturer, cameras, camera) = fixture(false).await;

        assert!(capturer.store_frame(&camera, b"jpegdata".to_vec()).await);

        let stored = cameras.get_camera(&camera.id).await.unwrap();
        let reference = stored.thumbnail.expect("thumbnail reference");
        assert!(reference.starts_with(&camera.id));
        assert!(reference.ends_with(".jpg"));
    }

    #[tokio::test]
    async fn store_frame_for_deleted_camera_is_silent() {
        let (capturer, cameras, camera) = fixture(false).await;
        cameras.delete_camera(&camera.id).await.unwrap();

        assert!(!capturer.store_frame(&camera, b"jpegdata".to_vec()).await);
    }

    #[tokio::test]
    async fn concurrent_capture_for_same_camera_is_skipped() {
        let (capturer, _cameras, camera) = fixture(false).await;

        let _held = capturer.try_acquire(&camera.id).await.unwrap();

        // Second trigger sees the held lock and bails out
        assert!(!capturer.capture(&camera).await);
    }
}
