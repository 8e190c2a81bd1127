//! Camera registry
//!
//! Durable camera record store collaborator. Process-local registry with a
//! defined lifecycle: created at startup, cleared on restart. Status updates
//! are last-writer-wins.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::types::{Camera, CameraStatus, CreateCameraRequest, UpdateCameraRequest};
use crate::endpoint;
use crate::error::{Error, Result};

/// CameraStore instance
pub struct CameraStore {
    cameras: RwLock<HashMap<String, Camera>>,
}

impl CameraStore {
    /// Create new CameraStore
    pub fn new() -> Self {
        Self {
            cameras: RwLock::new(HashMap::new()),
        }
    }

    /// Create a camera record.
    ///
    /// `status` comes from the caller's synchronous probe; the stream URL is
    /// derived once here and cached, unless explicitly supplied.
    pub async fn create_camera(
        &self,
        req: CreateCameraRequest,
        status: CameraStatus,
    ) -> Result<Camera> {
        if req.name.is_empty() {
            return Err(Error::Validation("name must not be empty".to_string()));
        }
        if req.ip_address.is_empty() {
            return Err(Error::Validation(
                "ip_address must not be empty".to_string(),
            ));
        }

        let now = Utc::now();
        let stream_url = req
            .stream_url
            .clone()
            .or_else(|| endpoint::derive_stream_url(&req.ip_address, req.camera_type));

        let camera = Camera {
            id: Uuid::new_v4().to_string(),
            user_id: req.user_id,
            name: req.name,
            ip_address: req.ip_address,
            location: req.location,
            description: req.description,
            camera_type: req.camera_type,
            status,
            stream_url,
            thumbnail: None,
            enable_motion_detection: req.enable_motion_detection,
            enable_sound_detection: req.enable_sound_detection,
            created_at: now,
            updated_at: now,
        };

        let mut cameras = self.cameras.write().await;
        cameras.insert(camera.id.clone(), camera.clone());

        tracing::info!(
            camera_id = %camera.id,
            user_id = %camera.user_id,
            status = %camera.status.as_str(),
            "Camera created"
        );

        Ok(camera)
    }

    /// Get camera by id
    pub async fn get_camera(&self, id: &str) -> Option<Camera> {
        self.cameras.read().await.get(id).cloned()
    }

    /// List cameras owned by a user
    pub async fn list_cameras(&self, user_id: &str) -> Vec<Camera> {
        self.cameras
            .read()
            .await
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Update a camera.
    ///
    /// An explicitly supplied stream URL always wins; otherwise the stream
    /// URL is re-derived only when the endpoint descriptor changed.
    pub async fn update_camera(&self, id: &str, req: UpdateCameraRequest) -> Result<Camera> {
        let mut cameras = self.cameras.write().await;
        let camera = cameras
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(format!("Camera {} not found", id)))?;

        let endpoint_changed = req
            .ip_address
            .as_ref()
            .map_or(false, |v| *v != camera.ip_address)
            || req.camera_type.map_or(false, |t| t != camera.camera_type);

        if let Some(name) = req.name {
            camera.name = name;
        }
        if let Some(ip_address) = req.ip_address {
            camera.ip_address = ip_address;
        }
        if let Some(location) = req.location {
            camera.location = location;
        }
        if let Some(description) = req.description {
            camera.description = Some(description);
        }
        if let Some(camera_type) = req.camera_type {
            camera.camera_type = camera_type;
        }
        if let Some(enabled) = req.enable_motion_detection {
            camera.enable_motion_detection = enabled;
        }
        if let Some(enabled) = req.enable_sound_detection {
            camera.enable_sound_detection = enabled;
        }

        if let Some(stream_url) = req.stream_url {
            camera.stream_url = Some(stream_url);
        } else if endpoint_changed {
            camera.stream_url = endpoint::derive_stream_url(&camera.ip_address, camera.camera_type);
        }

        camera.updated_at = Utc::now();

        Ok(camera.clone())
    }

    /// Update camera status (last-writer-wins)
    pub async fn update_camera_status(&self, id: &str, status: CameraStatus) -> Result<Camera> {
        let mut cameras = self.cameras.write().await;
        let camera = cameras
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(format!("Camera {} not found", id)))?;

        camera.status = status;
        camera.updated_at = Utc::now();

        tracing::debug!(
            camera_id = %id,
            status = %status.as_str(),
            "Camera status updated"
        );

        Ok(camera.clone())
    }

    /// Record the latest thumbnail reference
    pub async fn set_thumbnail(&self, id: &str, reference: &str) -> Result<()> {
        let mut cameras = self.cameras.write().await;
        let camera = cameras
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(format!("Camera {} not found", id)))?;

        camera.thumbnail = Some(reference.to_string());
        camera.updated_at = Utc::now();

        Ok(())
    }

    /// Delete a camera, returning the removed record
    pub async fn delete_camera(&self, id: &str) -> Result<Camera> {
        let mut cameras = self.cameras.write().await;
        cameras
            .remove(id)
            .ok_or_else(|| Error::NotFound(format!("Camera {} not found", id)))
    }

    /// Cameras currently marked online
    pub async fn get_online_cameras(&self) -> Vec<Camera> {
        self.cameras
            .read()
            .await
            .values()
            .filter(|c| c.status == CameraStatus::Online)
            .cloned()
            .collect()
    }

    /// Owning user of a camera, None when the camera is gone
    pub async fn owner_of(&self, camera_id: &str) -> Option<String> {
        self.cameras
            .read()
            .await
            .get(camera_id)
            .map(|c| c.user_id.clone())
    }

    /// Registered camera count
    pub async fn count(&self) -> usize {
        self.cameras.read().await.len()
    }
}

impl Default for CameraStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::types::CameraType;

    fn request(user_id: &str, ip: &str, camera_type: CameraType) -> CreateCameraRequest {
        CreateCameraRequest {
            user_id: user_id.to_string(),
            name: "Test Camera".to_string(),
            ip_address: ip.to_string(),
            location: "Test Location".to_string(),
            description: None,
            camera_type,
            stream_url: None,
            enable_motion_detection: true,
            enable_sound_detection: false,
        }
    }

    #[tokio::test]
    async fn create_derives_stream_url_for_onvif() {
        let store = CameraStore::new();
        let camera = store
            .create_camera(request("u1", "192.168.1.100", CameraType::Onvif), CameraStatus::Online)
            .await
            .unwrap();

        assert_eq!(
            camera.stream_url.as_deref(),
            Some("rtsp://192.168.1.100:554/onvif1")
        );
        assert_eq!(camera.status, CameraStatus::Online);
    }

    #[tokio::test]
    async fn create_keeps_explicit_stream_url() {
        let store = CameraStore::new();
        let mut req = request("u1", "192.168.1.100", CameraType::Rtsp);
        req.stream_url = Some("rtsp://192.168.1.100:8554/custom".to_string());

        let camera = store
            .create_camera(req, CameraStatus::Online)
            .await
            .unwrap();

        assert_eq!(
            camera.stream_url.as_deref(),
            Some("rtsp://192.168.1.100:8554/custom")
        );
    }

    #[tokio::test]
    async fn update_without_endpoint_change_keeps_stream_url() {
        let store = CameraStore::new();
        let camera = store
            .create_camera(request("u1", "192.168.1.100", CameraType::Rtsp), CameraStatus::Offline)
            .await
            .unwrap();

        let updated = store
            .update_camera(
                &camera.id,
                UpdateCameraRequest {
                    name: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.stream_url, camera.stream_url);
        assert_eq!(updated.name, "Renamed");
    }

    #[tokio::test]
    async fn update_endpoint_rederives_stream_url() {
        let store = CameraStore::new();
        let camera = store
            .create_camera(request("u1", "192.168.1.100", CameraType::Rtsp), CameraStatus::Offline)
            .await
            .unwrap();

        let updated = store
            .update_camera(
                &camera.id,
                UpdateCameraRequest {
                    ip_address: Some("192.168.1.200".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(
            updated.stream_url.as_deref(),
            Some("rtsp://192.168.1.200:554/stream")
        );
    }

    #[tokio::test]
    async fn online_filter_and_owner_lookup() {
        let store = CameraStore::new();
        let online = store
            .create_camera(request("u1", "10.0.0.1", CameraType::Ip), CameraStatus::Online)
            .await
            .unwrap();
        store
            .create_camera(request("u2", "10.0.0.2", CameraType::Ip), CameraStatus::Offline)
            .await
            .unwrap();

        let online_cameras = store.get_online_cameras().await;
        assert_eq!(online_cameras.len(), 1);
        assert_eq!(online_cameras[0].id, online.id);
        assert_eq!(store.owner_of(&online.id).await.as_deref(), Some("u1"));
        assert_eq!(store.owner_of("missing").await, None);
    }

    #[tokio::test]
    async fn status_update_is_latest_only() {
        let store = CameraStore::new();
        let camera = store
            .create_camera(request("u1", "10.0.0.1", CameraType::Ip), CameraStatus::Offline)
            .await
            .unwrap();

        store
            .update_camera_status(&camera.id, CameraStatus::Online)
            .await
            .unwrap();
        let updated = store
            .update_camera_status(&camera.id, CameraStatus::Offline)
            .await
            .unwrap();

        assert_eq!(updated.status, CameraStatus::Offline);
    }
}
