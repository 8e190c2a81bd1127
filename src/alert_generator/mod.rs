//! AlertGenerator - randomized background alert synthesis
//!
//! ## Responsibilities
//!
//! - Sleep/generate loop with uniform-random jitter (no synchronized bursts)
//! - One alert per cycle for a random online camera, committed before broadcast
//! - Stop signal checked at each sleep boundary
//!
//! Single instance per process; generation failures never kill the loop.

use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use tokio::sync::RwLock;

use crate::broadcast::AlertBroadcaster;
use crate::store::{Alert, AlertKind, AlertStore, CameraStore};

/// Sleep bounds between generation cycles
pub const MIN_SLEEP_SECS: u64 = 5;
pub const MAX_SLEEP_SECS: u64 = 30;

/// AlertGenerator instance
pub struct AlertGenerator {
    cameras: Arc<CameraStore>,
    alerts: Arc<AlertStore>,
    broadcaster: Arc<AlertBroadcaster>,
    running: Arc<RwLock<bool>>,
}

impl AlertGenerator {
    /// Create new AlertGenerator
    pub fn new(
        cameras: Arc<CameraStore>,
        alerts: Arc<AlertStore>,
        broadcaster: Arc<AlertBroadcaster>,
    ) -> Self {
        Self {
            cameras,
            alerts,
            broadcaster,
            running: Arc::new(RwLock::new(false)),
        }
    }

    /// Start the generation loop
    pub async fn start(&self) {
        {
            let mut running = self.running.write().await;
            if *running {
                tracing::warn!("Alert generator already running");
                return;
            }
            *running = true;
        }

        tracing::info!("Starting alert generator");

        let cameras = self.cameras.clone();
        let alerts = self.alerts.clone();
        let broadcaster = self.broadcaster.clone();
        let running = self.running.clone();

        tokio::spawn(async move {
            loop {
                let sleep_secs = {
                    let mut rng = rand::thread_rng();
                    rng.gen_range(MIN_SLEEP_SECS..=MAX_SLEEP_SECS)
                };
                tokio::time::sleep(Duration::from_secs(sleep_secs)).await;

                // Stop signal is honored at the sleep boundary
                if !*running.read().await {
                    break;
                }

                let _ = Self::run_cycle(&cameras, &alerts, &broadcaster).await;
            }

            tracing::info!("Alert generator stopped");
        });
    }

    /// Stop the loop; takes effect at the next sleep boundary
    pub async fn stop(&self) {
        let mut running = self.running.write().await;
        *running = false;
        tracing::info!("Stopping alert generator");
    }

    /// One generation cycle.
    ///
    /// Picks a uniformly random online camera and alert kind, commits the
    /// alert, then hands it to the broadcaster. Returns None when no camera
    /// is online (the cycle is skipped, not an error).
    pub async fn generate_once(&self) -> Option<Alert> {
        Self::run_cycle(&self.cameras, &self.alerts, &self.broadcaster).await
    }

    async fn run_cycle(
        cameras: &CameraStore,
        alerts: &AlertStore,
        broadcaster: &AlertBroadcaster,
    ) -> Option<Alert> {
        let online = cameras.get_online_cameras().await;
        if online.is_empty() {
            tracing::debug!("No online cameras, skipping alert cycle");
            return None;
        }

        let (camera, kind) = {
            let mut rng = rand::thread_rng();
            let camera = online.choose(&mut rng)?.clone();
            let kind = *AlertKind::ALL.choose(&mut rng).unwrap_or(&AlertKind::Motion);
            (camera, kind)
        };

        let message = match kind {
            AlertKind::Motion => format!("Motion detected at {}", camera.location),
            AlertKind::Sound => format!("Sound detected at {}", camera.location),
        };

        // Committed before broadcast so a reconnecting client can always
        // recover the latest alert by direct query
        let alert = alerts.create_alert(&camera.id, kind, &message).await;

        tracing::info!(
            alert_id = alert.id,
            camera_id = %camera.id,
            kind = %kind.as_str(),
            "Alert generated"
        );

        broadcaster.broadcast(&alert).await;

        Some(alert)
    }
}
