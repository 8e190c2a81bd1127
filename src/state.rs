//! Application state
//!
//! Holds all shared components and configuration

use std::path::PathBuf;
use std::sync::Arc;

use crate::alert_generator::AlertGenerator;
use crate::alert_hub::AlertHub;
use crate::blob_store::BlobStore;
use crate::broadcast::AlertBroadcaster;
use crate::directory::UserDirectory;
use crate::prober::ReachabilityProber;
use crate::store::{AlertStore, CameraStore};
use crate::thumbnail::ThumbnailCapturer;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Thumbnail blob directory
    pub thumbnail_dir: PathBuf,
    /// Constrained execution context: probes short-circuit to online
    pub degraded_env: bool,
    /// Bound for stream-endpoint capture sessions
    pub stream_probe_timeout_secs: u64,
    /// Bound for ping / TCP connect attempts
    pub connect_timeout_ms: u64,
    /// User ids registered at startup (accounts are an external concern)
    pub seed_users: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            thumbnail_dir: std::env::var("THUMBNAIL_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/var/lib/guardian-eye/thumbnails")),
            degraded_env: std::env::var("DEGRADED_ENV")
                .ok()
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            stream_probe_timeout_secs: std::env::var("STREAM_PROBE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            connect_timeout_ms: std::env::var("CONNECT_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2000),
            seed_users: std::env::var("SEED_USERS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_else(|_| vec!["demo".to_string()]),
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application config
    pub config: AppConfig,
    /// UserDirectory (account system boundary)
    pub directory: Arc<UserDirectory>,
    /// CameraStore (camera records, latest status)
    pub cameras: Arc<CameraStore>,
    /// AlertStore (append-only alert log)
    pub alerts: Arc<AlertStore>,
    /// BlobStore (thumbnail images)
    pub blobs: Arc<BlobStore>,
    /// AlertHub (per-user subscription groups)
    pub hub: Arc<AlertHub>,
    /// ReachabilityProber
    pub prober: Arc<ReachabilityProber>,
    /// ThumbnailCapturer
    pub thumbnails: Arc<ThumbnailCapturer>,
    /// AlertBroadcaster
    pub broadcaster: Arc<AlertBroadcaster>,
    /// AlertGenerator (background loop)
    pub generator: Arc<AlertGenerator>,
}
