//! Alert registry
//!
//! Append-only alert log. Commits happen under the write lock, so ids and
//! timestamps are assigned in commit order.

use chrono::Utc;
use tokio::sync::RwLock;

use super::types::{Alert, AlertKind};

struct AlertLog {
    alerts: Vec<Alert>,
    next_id: u64,
}

/// AlertStore instance
pub struct AlertStore {
    inner: RwLock<AlertLog>,
}

impl AlertStore {
    /// Create new AlertStore
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(AlertLog {
                alerts: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Commit an alert as a single atomic write with a server-assigned
    /// id and timestamp.
    pub async fn create_alert(&self, camera_id: &str, kind: AlertKind, message: &str) -> Alert {
        let mut log = self.inner.write().await;
        let alert = Alert {
            id: log.next_id,
            camera_id: camera_id.to_string(),
            kind,
            message: message.to_string(),
            timestamp: Utc::now(),
        };
        log.next_id += 1;
        log.alerts.push(alert.clone());

        tracing::debug!(
            alert_id = alert.id,
            camera_id = %camera_id,
            kind = %kind.as_str(),
            "Alert committed"
        );

        alert
    }

    /// Alerts for a set of cameras, newest first
    pub async fn list_for_cameras(&self, camera_ids: &[String]) -> Vec<Alert> {
        self.inner
            .read()
            .await
            .alerts
            .iter()
            .rev()
            .filter(|a| camera_ids.contains(&a.camera_id))
            .cloned()
            .collect()
    }

    /// Drop all alerts of a deleted camera; returns the number removed
    pub async fn delete_for_camera(&self, camera_id: &str) -> usize {
        let mut log = self.inner.write().await;
        let before = log.alerts.len();
        log.alerts.retain(|a| a.camera_id != camera_id);
        before - log.alerts.len()
    }

    /// Total committed alert count
    pub async fn count(&self) -> usize {
        self.inner.read().await.alerts.len()
    }
}

impl Default for AlertStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ids_and_timestamps_increase_in_commit_order() {
        let store = AlertStore::new();
        let first = store
            .create_alert("cam-1", AlertKind::Motion, "Motion detected at Hall")
            .await;
        let second = store
            .create_alert("cam-1", AlertKind::Sound, "Sound detected at Hall")
            .await;

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(second.timestamp >= first.timestamp);
    }

    #[tokio::test]
    async fn listing_is_newest_first_and_scoped() {
        let store = AlertStore::new();
        store
            .create_alert("cam-1", AlertKind::Motion, "first")
            .await;
        store
            .create_alert("cam-2", AlertKind::Motion, "other camera")
            .await;
        store.create_alert("cam-1", AlertKind::Sound, "second").await;

        let alerts = store.list_for_cameras(&["cam-1".to_string()]).await;
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].message, "second");
        assert_eq!(alerts[1].message, "first");
    }

    #[tokio::test]
    async fn cascade_delete_removes_only_that_camera() {
        let store = AlertStore::new();
        store.create_alert("cam-1", AlertKind::Motion, "a").await;
        store.create_alert("cam-1", AlertKind::Sound, "b").await;
        store.create_alert("cam-2", AlertKind::Motion, "c").await;

        let removed = store.delete_for_camera("cam-1").await;
        assert_eq!(removed, 2);
        assert_eq!(store.count().await, 1);
    }
}
