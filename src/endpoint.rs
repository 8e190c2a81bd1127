//! Endpoint classification and stream URL derivation
//!
//! ## Responsibilities
//!
//! - Classify raw endpoint descriptors (stream URL vs bare address)
//! - Derive the cached stream URL per declared camera type
//! - Derive the effective capture URL for thumbnail grabs

use crate::store::CameraType;

/// Default RTSP port for derived stream URLs
pub const DEFAULT_RTSP_PORT: u16 = 554;

/// Default port for bare-address TCP connect fallback
pub const DEFAULT_TCP_PORT: u16 = 80;

/// Classified endpoint descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Full stream URL (rtsp/http/https scheme present)
    Stream(String),
    /// Bare host address, optionally carrying an embedded port
    Bare { host: String, port: Option<u16> },
}

impl Endpoint {
    /// Classify a raw endpoint descriptor.
    ///
    /// Anything carrying a known URL scheme is a stream endpoint; everything
    /// else is treated as a bare address with an optional `host:port` split.
    pub fn classify(raw: &str) -> Self {
        if has_scheme(raw) {
            return Endpoint::Stream(raw.to_string());
        }

        match raw.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() => match port.parse::<u16>() {
                Ok(port) => Endpoint::Bare {
                    host: host.to_string(),
                    port: Some(port),
                },
                Err(_) => Endpoint::Bare {
                    host: raw.to_string(),
                    port: None,
                },
            },
            _ => Endpoint::Bare {
                host: raw.to_string(),
                port: None,
            },
        }
    }
}

/// Check whether the descriptor already carries a URL scheme
pub fn has_scheme(raw: &str) -> bool {
    raw.starts_with("rtsp://") || raw.starts_with("http://") || raw.starts_with("https://")
}

/// Derive the stream URL cached on the camera record.
///
/// Deterministic and idempotent; returns None for plain IP / generic HTTP
/// cameras given a bare address (those stay bare for probing).
pub fn derive_stream_url(raw: &str, camera_type: CameraType) -> Option<String> {
    if has_scheme(raw) {
        return Some(raw.to_string());
    }

    match camera_type {
        CameraType::Rtsp => Some(format!("rtsp://{}:{}/stream", raw, DEFAULT_RTSP_PORT)),
        CameraType::Onvif => Some(format!("rtsp://{}:{}/onvif1", raw, DEFAULT_RTSP_PORT)),
        CameraType::Ip | CameraType::Http => None,
    }
}

/// Derive the effective capture URL for a thumbnail grab or a
/// test-connection probe.
///
/// Prefers a stored stream URL; a bare plain-IP/HTTP address falls back to
/// `http://<raw>` at this call site.
pub fn derive_capture_url(raw: &str, stream_url: Option<&str>, camera_type: CameraType) -> String {
    if let Some(url) = stream_url {
        if has_scheme(url) {
            return url.to_string();
        }
    }

    if has_scheme(raw) {
        return raw.to_string();
    }

    match camera_type {
        CameraType::Rtsp => format!("rtsp://{}:{}/stream", raw, DEFAULT_RTSP_PORT),
        CameraType::Onvif => format!("rtsp://{}:{}/onvif1", raw, DEFAULT_RTSP_PORT),
        CameraType::Ip | CameraType::Http => format!("http://{}", raw),
    }
}
