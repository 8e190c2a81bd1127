//! One-frame capture sessions
//!
//! ffmpeg-based frame grabs shared by the reachability prober and the
//! thumbnail capturer: open the stream, read a single frame, get JPEG bytes
//! back on stdout.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;

use crate::error::{Error, Result};

/// Grab one frame from a stream URL.
///
/// Success requires both that the session opens and that one frame is
/// readable within `timeout_secs`. Uses kill_on_drop(true) so a timeout
/// cancels the future, drops the Child, and SIGKILLs the ffmpeg process
/// instead of leaving it behind on an unresponsive camera.
pub async fn grab_frame(url: &str, timeout_secs: u64) -> Result<Vec<u8>> {
    let mut cmd = Command::new("ffmpeg");

    // TCP transport for RTSP (more reliable than UDP)
    if url.starts_with("rtsp://") {
        cmd.args(["-rtsp_transport", "tcp"]);
    }

    let child = cmd
        .args([
            "-i", url,
            "-frames:v", "1",
            "-f", "image2pipe",
            "-vcodec", "mjpeg",
            "-loglevel", "error",
            "-y",
            "-",
        ])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| Error::Capture(format!("ffmpeg spawn failed: {}", e)))?;

    match timeout(Duration::from_secs(timeout_secs), child.wait_with_output()).await {
        Ok(Ok(output)) => {
            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(Error::Capture(format!("ffmpeg failed: {}", stderr.trim())));
            }

            if output.stdout.is_empty() {
                return Err(Error::Capture("ffmpeg returned no frame".to_string()));
            }

            Ok(output.stdout)
        }
        Ok(Err(e)) => Err(Error::Capture(format!("ffmpeg execution failed: {}", e))),
        Err(_) => {
            tracing::warn!(
                timeout_sec = timeout_secs,
                url = %url,
                "ffmpeg timeout, process killed via kill_on_drop"
            );

            Err(Error::Capture(format!("ffmpeg timeout ({}s)", timeout_secs)))
        }
    }
}
