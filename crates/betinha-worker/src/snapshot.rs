//! Mutable progress state of the running job.
//!
//! Owned by the supervisor; parsers feed it, the ETA model reads it.

use betinha_media::{DownloadProgress, TranscodeProgress};
use betinha_models::Phase;
use tokio::time::Instant;

use crate::error::{WorkerError, WorkerResult};
use crate::eta::{unified_progress, UnifiedProgress};

/// Per-job progress estimates.
#[derive(Debug, Clone)]
pub struct ProgressSnapshot {
    phase: Phase,
    started_at: Instant,
    download_remaining_secs: f64,
    download_fraction: f64,
    transcode_remaining_secs: f64,
    transcode_fraction: f64,
    total_duration_secs: f64,
    transcode_speed: f64,
    cancel_requested: bool,
}

impl Default for ProgressSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSnapshot {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            started_at: Instant::now(),
            download_remaining_secs: 0.0,
            download_fraction: 0.0,
            transcode_remaining_secs: 0.0,
            transcode_fraction: 0.0,
            total_duration_secs: 0.0,
            transcode_speed: 1.0,
            cancel_requested: false,
        }
    }

    /// Reset every estimate and restart the job clock.
    pub fn restart(&mut self) {
        *self = Self::new();
    }

    /// Move to the next phase. Phases never go backwards or repeat.
    pub fn enter_phase(&mut self, next: Phase) -> WorkerResult<()> {
        if !self.phase.can_advance_to(next) {
            return Err(WorkerError::InvalidPhase {
                from: self.phase,
                to: next,
            });
        }
        self.phase = next;
        Ok(())
    }

    /// Seed the media duration used by the transcode estimates.
    pub fn set_total_duration(&mut self, secs: f64) {
        self.total_duration_secs = if secs.is_finite() && secs > 0.0 { secs } else { 0.0 };
    }

    pub fn apply_download(&mut self, progress: &DownloadProgress) {
        self.download_remaining_secs = progress.eta_seconds();
        if let Some(fraction) = progress.fraction() {
            self.download_fraction = fraction;
        }
    }

    /// Fold one transcoder report into the estimates.
    ///
    /// Time and speed arrive on separate lines, so each recomputation pairs
    /// the fresh value with the last seen value of the other.
    pub fn apply_transcode(&mut self, progress: &TranscodeProgress) {
        let duration = self.total_duration_secs;
        match *progress {
            TranscodeProgress::OutTime { seconds } => {
                if duration > 0.0 {
                    let remaining_media = (duration - seconds).max(0.0);
                    self.transcode_fraction = (seconds / duration).clamp(0.0, 1.0);
                    self.transcode_remaining_secs = remaining_media / self.transcode_speed;
                }
            }
            TranscodeProgress::Speed { factor } => {
                self.transcode_speed = factor.max(TranscodeProgress::MIN_SPEED);
                if duration > 0.0 {
                    let elapsed_media = self.transcode_fraction * duration;
                    self.transcode_remaining_secs =
                        (duration - elapsed_media).max(0.0) / self.transcode_speed;
                }
            }
            TranscodeProgress::End => {
                self.transcode_remaining_secs = 0.0;
            }
        }
    }

    pub fn request_cancel(&mut self) {
        self.cancel_requested = true;
    }

    pub fn cancel_requested(&self) -> bool {
        self.cancel_requested
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }

    pub fn download_fraction(&self) -> f64 {
        self.download_fraction
    }

    pub fn download_remaining_secs(&self) -> f64 {
        self.download_remaining_secs
    }

    pub fn transcode_fraction(&self) -> f64 {
        self.transcode_fraction
    }

    pub fn transcode_remaining_secs(&self) -> f64 {
        self.transcode_remaining_secs
    }

    pub fn total_duration_secs(&self) -> f64 {
        self.total_duration_secs
    }

    /// Current unified fraction and ETA.
    pub fn report(&self) -> UnifiedProgress {
        unified_progress(
            self.phase,
            self.elapsed_secs(),
            self.download_remaining_secs,
            self.transcode_remaining_secs,
        )
    }
}
