//! AlertHub - group-addressed alert fan-out
//!
//! ## Responsibilities
//!
//! - Subscription group membership (one group per user)
//! - Publish fan-out to every live connection in a group
//!
//! Groups are process-local and rebuilt as connections re-establish; a
//! connection belongs to exactly one group, its authenticated user's.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::store::{Alert, Camera};

/// Connection handle within a subscription group
pub type ConnectionId = Uuid;

/// Flat alert payload pushed to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertPayload {
    pub id: u64,
    pub camera_id: String,
    pub camera_name: String,
    pub alert_type: String,
    pub message: String,
    /// ISO-8601 timestamp
    pub timestamp: String,
}

impl AlertPayload {
    /// Build the wire payload for a committed alert and its owning camera
    pub fn new(alert: &Alert, camera: &Camera) -> Self {
        Self {
            id: alert.id,
            camera_id: alert.camera_id.clone(),
            camera_name: camera.name.clone(),
            alert_type: alert.kind.as_str().to_string(),
            message: alert.message.clone(),
            timestamp: alert.timestamp.to_rfc3339(),
        }
    }
}

/// AlertHub instance
pub struct AlertHub {
    /// user_id -> connection_id -> sender of serialized payloads
    groups: RwLock<HashMap<String, HashMap<ConnectionId, mpsc::UnboundedSender<String>>>>,
}

impl AlertHub {
    /// Create new AlertHub
    pub fn new() -> Self {
        Self {
            groups: RwLock::new(HashMap::new()),
        }
    }

    /// Join a user's subscription group.
    ///
    /// Returns the connection id and the receiver the gateway forwards to
    /// the socket.
    pub async fn subscribe(&self, user_id: &str) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();

        let mut groups = self.groups.write().await;
        groups.entry(user_id.to_string()).or_default().insert(id, tx);

        tracing::info!(connection_id = %id, user_id = %user_id, "Subscriber joined group");

        (id, rx)
    }

    /// Leave a group. Idempotent: leaving a group the connection is not in
    /// is a no-op. Empty groups are dropped.
    pub async fn unsubscribe(&self, user_id: &str, id: &ConnectionId) {
        let mut groups = self.groups.write().await;
        if let Some(group) = groups.get_mut(user_id) {
            if group.remove(id).is_some() {
                tracing::info!(connection_id = %id, user_id = %user_id, "Subscriber left group");
            }
            if group.is_empty() {
                groups.remove(user_id);
            }
        }
    }

    /// Publish a payload to every connection in a user's group.
    ///
    /// The payload is serialized once; returns the number of connections it
    /// was handed to.
    pub async fn publish(&self, user_id: &str, payload: &AlertPayload) -> usize {
        let json = match serde_json::to_string(payload) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize alert payload");
                return 0;
            }
        };

        let groups = self.groups.read().await;
        let Some(group) = groups.get(user_id) else {
            tracing::debug!(user_id = %user_id, "No subscribers for group");
            return 0;
        };

        let mut delivered = 0;
        for (id, tx) in group.iter() {
            if tx.send(json.clone()).is_err() {
                tracing::warn!(connection_id = %id, "Failed to push alert to connection");
            } else {
                delivered += 1;
            }
        }

        tracing::debug!(
            user_id = %user_id,
            alert_id = payload.id,
            delivered = delivered,
            "Alert published to group"
        );

        delivered
    }

    /// Member count of a user's group
    pub async fn group_size(&self, user_id: &str) -> usize {
        self.groups
            .read()
            .await
            .get(user_id)
            .map_or(0, |group| group.len())
    }

    /// Total live connections across all groups
    pub async fn connection_count(&self) -> usize {
        self.groups.read().await.values().map(|g| g.len()).sum()
    }
}

impl Default for AlertHub {
    fn default() -> Self {
        Self::new()
    }
}
