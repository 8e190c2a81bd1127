//! ReachabilityProber - endpoint probing with multi-strategy fallback
//!
//! ## Responsibilities
//!
//! - Stream endpoints: one-frame capture session (open + read within timeout)
//! - Bare addresses: single ping attempt, then TCP connect fallback
//! - Degraded-environment short-circuit (no raw sockets / video capability)
//!
//! Every internal failure (DNS, socket, codec, timeout) converts to an
//! offline verdict; the prober never returns an error to its caller.

use std::process::Stdio;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::process::Command;
use tokio::time::timeout;

use crate::capture;
use crate::endpoint::{Endpoint, DEFAULT_TCP_PORT};
use crate::store::CameraStatus;

/// Default bound for a stream-endpoint capture session
const DEFAULT_STREAM_TIMEOUT_SECS: u64 = 10;

/// Default bound for ping / TCP connect attempts
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 2000;

/// Probe verdict
#[derive(Debug, Clone)]
pub struct ProbeVerdict {
    pub reachable: bool,
    pub status: CameraStatus,
    /// Frame read during a stream probe, eligible for thumbnailing
    pub frame: Option<Vec<u8>>,
}

impl ProbeVerdict {
    fn online(frame: Option<Vec<u8>>) -> Self {
        Self {
            reachable: true,
            status: CameraStatus::Online,
            frame,
        }
    }

    fn offline() -> Self {
        Self {
            reachable: false,
            status: CameraStatus::Offline,
            frame: None,
        }
    }
}

/// ReachabilityProber instance
pub struct ReachabilityProber {
    /// Short-circuit all probes to online (no network I/O)
    degraded_env: bool,
    stream_timeout_secs: u64,
    connect_timeout: Duration,
}

impl ReachabilityProber {
    /// Create new ReachabilityProber with default timeouts
    pub fn new(degraded_env: bool) -> Self {
        Self::with_timeouts(
            degraded_env,
            DEFAULT_STREAM_TIMEOUT_SECS,
            DEFAULT_CONNECT_TIMEOUT_MS,
        )
    }

    /// Create new ReachabilityProber with explicit timeouts
    pub fn with_timeouts(
        degraded_env: bool,
        stream_timeout_secs: u64,
        connect_timeout_ms: u64,
    ) -> Self {
        Self {
            degraded_env,
            stream_timeout_secs,
            connect_timeout: Duration::from_millis(connect_timeout_ms),
        }
    }

    /// Classify and probe a raw endpoint descriptor
    pub async fn probe_raw(&self, raw: &str) -> ProbeVerdict {
        self.probe(&Endpoint::classify(raw)).await
    }

    /// Probe a classified endpoint
    pub async fn probe(&self, endpoint: &Endpoint) -> ProbeVerdict {
        if self.degraded_env {
            tracing::debug!("Degraded environment, probe short-circuits to online");
            return ProbeVerdict::online(None);
        }

        match endpoint {
            Endpoint::Stream(url) => self.probe_stream(url).await,
            Endpoint::Bare { host, port } => {
                self.probe_bare(host, port.unwrap_or(DEFAULT_TCP_PORT)).await
            }
        }
    }

    /// Stream path: session must open and one frame must be readable
    async fn probe_stream(&self, url: &str) -> ProbeVerdict {
        match capture::grab_frame(url, self.stream_timeout_secs).await {
            Ok(frame) => {
                tracing::debug!(url = %url, size = frame.len(), "Stream probe succeeded");
                ProbeVerdict::online(Some(frame))
            }
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "Stream probe failed");
                ProbeVerdict::offline()
            }
        }
    }

    /// Bare path: ping first, TCP connect to the declared port on failure
    async fn probe_bare(&self, host: &str, port: u16) -> ProbeVerdict {
        if self.ping(host).await {
            tracing::debug!(host = %host, "Ping succeeded");
            return ProbeVerdict::online(None);
        }

        match timeout(self.connect_timeout, TcpStream::connect((host, port))).await {
            Ok(Ok(_)) => {
                tracing::debug!(host = %host, port = port, "TCP connect succeeded");
                ProbeVerdict::online(None)
            }
            Ok(Err(e)) => {
                tracing::debug!(host = %host, port = port, error = %e, "TCP connect failed");
                ProbeVerdict::offline()
            }
            Err(_) => {
                tracing::debug!(host = %host, port = port, "TCP connect timeout");
                ProbeVerdict::offline()
            }
        }
    }

    /// Single short-lived ping attempt; any failure falls through to TCP
    async fn ping(&self, host: &str) -> bool {
        let mut cmd = Command::new("ping");
        cmd.args(["-c", "1", "-W", "1", host])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        match timeout(self.connect_timeout, cmd.status()).await {
            Ok(Ok(status)) => status.success(),
            Ok(Err(e)) => {
                tracing::debug!(host = %host, error = %e, "ping unavailable");
                false
            }
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn degraded_environment_short_circuits_to_online() {
        let prober = ReachabilityProber::new(true);

        let verdict = prober.probe_raw("192.0.2.1").await;
        assert!(verdict.reachable);
        assert_eq!(verdict.status, CameraStatus::Online);
        assert!(verdict.frame.is_none());

        let verdict = prober.probe_raw("rtsp://192.0.2.1:554/stream").await;
        assert!(verdict.reachable);
        assert_eq!(verdict.status, CameraStatus::Online);
    }

    #[tokio::test]
    async fn unreachable_bare_address_is_offline() {
        // TEST-NET-1, never routed; both ping and TCP connect must fail
        let prober = ReachabilityProber::with_timeouts(false, 1, 500);

        let verdict = prober.probe_raw("192.0.2.1").await;
        assert!(!verdict.reachable);
        assert_eq!(verdict.status, CameraStatus::Offline);
        assert!(verdict.frame.is_none());
    }

    #[tokio::test]
    async fn reachable_bare_address_is_online() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let prober = ReachabilityProber::with_timeouts(false, 1, 1000);

        let verdict = prober.probe_raw(&format!("127.0.0.1:{}", port)).await;
        assert!(verdict.reachable);
        assert_eq!(verdict.status, CameraStatus::Online);
    }

    #[tokio::test]
    async fn failed_stream_session_is_offline_without_frame() {
        // Nothing speaks RTSP on the discard port
        let prober = ReachabilityProber::with_timeouts(false, 2, 500);

        let verdict = prober.probe_raw("rtsp://127.0.0.1:9/stream").await;
        assert!(!verdict.reachable);
        assert_eq!(verdict.status, CameraStatus::Offline);
        assert!(verdict.frame.is_none());
    }
}
