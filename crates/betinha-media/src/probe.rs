//! FFprobe media duration.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Something that can tell how long a media file is.
#[async_trait]
pub trait DurationProbe: Send + Sync {
    /// Duration in seconds, 0.0 when unknown or on any failure.
    async fn duration(&self, path: &Path) -> f64;
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// [`DurationProbe`] backed by the `ffprobe` executable.
#[derive(Debug, Clone)]
pub struct FfprobeDurationProbe {
    program: String,
}

impl Default for FfprobeDurationProbe {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl FfprobeDurationProbe {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Probe the container duration, surfacing failures.
    pub async fn probe_duration(&self, path: &Path) -> MediaResult<f64> {
        if !path.exists() {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }

        let program = which::which(&self.program).map_err(|_| MediaError::ToolNotFound {
            tool: "ffprobe",
            program: self.program.clone(),
        })?;

        let output = Command::new(program)
            .args(["-v", "quiet", "-print_format", "json", "-show_format"])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            return Err(MediaError::probe_failed(format!(
                "ffprobe exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_duration(&output.stdout)
    }
}

#[async_trait]
impl DurationProbe for FfprobeDurationProbe {
    async fn duration(&self, path: &Path) -> f64 {
        match self.probe_duration(path).await {
            Ok(duration) => {
                debug!(path = %path.display(), duration, "Probed media duration");
                duration
            }
            Err(e) => {
                warn!(path = %path.display(), "Failed to probe duration: {}", e);
                0.0
            }
        }
    }
}

/// Extract `format.duration` from ffprobe JSON; missing or invalid is 0.0.
fn parse_duration(json: &[u8]) -> MediaResult<f64> {
    let probe: FfprobeOutput = serde_json::from_slice(json)?;

    let duration = probe
        .format
        .duration
        .as_ref()
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
        .unwrap_or(0.0);

    Ok(duration)
}
