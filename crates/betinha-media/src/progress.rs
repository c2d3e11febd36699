//! Progress-line parsing for yt-dlp and FFmpeg.
//!
//! Both parsers are lenient: unrecognized lines are ignored and malformed
//! numbers read as zero. Parsing never fails a running job.

use serde::{Deserialize, Serialize};

/// Prefix of the lines produced by our yt-dlp `--progress-template`.
pub const DOWNLOAD_PROGRESS_PREFIX: &str = "progress:[";

/// One yt-dlp progress report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DownloadProgress {
    /// Bytes downloaded so far
    pub downloaded: f64,
    /// Total bytes, 0 when unknown
    pub total: f64,
    /// Reported remaining seconds
    pub eta: f64,
}

impl DownloadProgress {
    /// Parse a line such as
    /// `progress:[downloaded=1234567 total=9876543 eta=42 speed=2456785.0 percent=12.3%]`.
    ///
    /// Returns `None` for lines without the prefix, and for prefixed lines in
    /// which none of the three tokens carries a number. Individual missing
    /// tokens default to 0.
    pub fn parse(line: &str) -> Option<Self> {
        if !line.starts_with(DOWNLOAD_PROGRESS_PREFIX) {
            return None;
        }

        let downloaded = token_value(line, "downloaded=");
        let total = token_value(line, "total=");
        let eta = token_value(line, "eta=");

        if downloaded.is_none() && total.is_none() && eta.is_none() {
            return None;
        }

        Some(Self {
            downloaded: downloaded.unwrap_or(0.0),
            total: total.unwrap_or(0.0),
            eta: eta.unwrap_or(0.0),
        })
    }

    /// Fraction downloaded, clamped to [0, 1]; `None` when the total is unknown.
    pub fn fraction(&self) -> Option<f64> {
        if self.total > 0.0 {
            Some((self.downloaded / self.total).clamp(0.0, 1.0))
        } else {
            None
        }
    }

    /// Remaining seconds, never negative.
    pub fn eta_seconds(&self) -> f64 {
        if self.eta > 0.0 {
            self.eta
        } else {
            0.0
        }
    }
}

/// One FFmpeg `-progress` line we act on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TranscodeProgress {
    /// `out_time_ms=<N>`: media time written so far, in seconds
    OutTime { seconds: f64 },
    /// `speed=<F>x`: encoding speed relative to realtime
    Speed { factor: f64 },
    /// `progress=end`
    End,
}

impl TranscodeProgress {
    /// Lower bound applied to reported speeds.
    pub const MIN_SPEED: f64 = 0.1;

    /// Parse one line of FFmpeg's key=value progress output.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();

        if let Some(value) = line.strip_prefix("out_time_ms=") {
            // Despite the key name FFmpeg reports microseconds here
            let micros = leading_number(value).unwrap_or(0.0);
            return Some(TranscodeProgress::OutTime {
                seconds: micros / 1e6,
            });
        }

        if let Some(value) = line.strip_prefix("speed=") {
            // "1.5x", " 1.5x" or "N/A"
            let factor = leading_number(value.trim_start()).unwrap_or(0.0);
            return Some(TranscodeProgress::Speed {
                factor: factor.max(Self::MIN_SPEED),
            });
        }

        if line.starts_with("progress=end") {
            return Some(TranscodeProgress::End);
        }

        None
    }
}

/// Locate `key` in `line` and parse the number that follows it.
fn token_value(line: &str, key: &str) -> Option<f64> {
    let start = line.find(key)? + key.len();
    leading_number(&line[start..])
}

/// Parse the leading run of sign/digit/decimal characters.
fn leading_number(s: &str) -> Option<f64> {
    let end = s
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(s.len());

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}
