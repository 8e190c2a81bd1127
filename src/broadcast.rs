//! AlertBroadcaster - alert ownership resolution and publish
//!
//! Resolves the owning user of a committed alert with one store read and
//! publishes the flat payload to that user's subscription group. A camera
//! deleted between commit and broadcast drops the push silently; the alert
//! itself remains committed.

use std::sync::Arc;

use crate::alert_hub::{AlertHub, AlertPayload};
use crate::store::{Alert, CameraStore};

/// AlertBroadcaster instance
pub struct AlertBroadcaster {
    cameras: Arc<CameraStore>,
    hub: Arc<AlertHub>,
}

impl AlertBroadcaster {
    /// Create new AlertBroadcaster
    pub fn new(cameras: Arc<CameraStore>, hub: Arc<AlertHub>) -> Self {
        Self { cameras, hub }
    }

    /// Publish an alert to its owner's group
    pub async fn broadcast(&self, alert: &Alert) {
        let Some(camera) = self.cameras.get_camera(&alert.camera_id).await else {
            tracing::debug!(
                alert_id = alert.id,
                camera_id = %alert.camera_id,
                "Camera gone before broadcast, dropping push"
            );
            return;
        };

        let payload = AlertPayload::new(alert, &camera);
        let delivered = self.hub.publish(&camera.user_id, &payload).await;

        tracing::debug!(
            alert_id = alert.id,
            camera_id = %alert.camera_id,
            user_id = %camera.user_id,
            delivered = delivered,
            "Alert broadcast"
        );
    }
}
