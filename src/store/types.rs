//! Store data types
//!
//! Camera and alert entities shared across the services

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Declared camera type, drives stream URL derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraType {
    /// Plain IP camera (bare address)
    Ip,
    /// RTSP stream
    Rtsp,
    /// ONVIF camera
    Onvif,
    /// Generic HTTP endpoint
    Http,
}

impl Default for CameraType {
    fn default() -> Self {
        Self::Ip
    }
}

/// Camera reachability status (latest probe result only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraStatus {
    Online,
    Offline,
}

impl CameraStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CameraStatus::Online => "online",
            CameraStatus::Offline => "offline",
        }
    }
}

impl Default for CameraStatus {
    fn default() -> Self {
        Self::Offline
    }
}

/// Camera entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    pub id: String,
    pub user_id: String,
    pub name: String,
    /// Raw endpoint descriptor (bare address or full stream URL)
    pub ip_address: String,
    pub location: String,
    pub description: Option<String>,
    pub camera_type: CameraType,
    pub status: CameraStatus,
    /// Derived once at create, stable unless the endpoint descriptor changes
    pub stream_url: Option<String>,
    /// Blob store reference of the latest thumbnail
    pub thumbnail: Option<String>,
    pub enable_motion_detection: bool,
    pub enable_sound_detection: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Alert kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Motion,
    Sound,
}

impl AlertKind {
    pub const ALL: [AlertKind; 2] = [AlertKind::Motion, AlertKind::Sound];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Motion => "motion",
            AlertKind::Sound => "sound",
        }
    }
}

/// Alert entity, immutable once committed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: u64,
    pub camera_id: String,
    pub kind: AlertKind,
    pub message: String,
    /// Server-assigned at commit
    pub timestamp: DateTime<Utc>,
}

fn default_motion_detection() -> bool {
    true
}

/// Camera creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCameraRequest {
    pub user_id: String,
    pub name: String,
    pub ip_address: String,
    pub location: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub camera_type: CameraType,
    /// Explicitly supplied stream URL, never overwritten by derivation
    #[serde(default)]
    pub stream_url: Option<String>,
    #[serde(default = "default_motion_detection")]
    pub enable_motion_detection: bool,
    #[serde(default)]
    pub enable_sound_detection: bool,
}

/// Camera update request
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateCameraRequest {
    pub name: Option<String>,
    pub ip_address: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub camera_type: Option<CameraType>,
    pub stream_url: Option<String>,
    pub enable_motion_detection: Option<bool>,
    pub enable_sound_detection: Option<bool>,
}
