//! Observer interface consumed by presentation shells.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use betinha_models::{format_eta, JobOutcome, JobStatusView, Phase};
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Receives job updates. Implementations render; the core never does.
///
/// Callbacks run on the supervisor task and must not block.
pub trait JobObserver: Send + Sync {
    /// Unified fraction in [0, 1] and remaining seconds.
    fn on_progress(&self, fraction: f64, remaining_secs: f64);

    /// Human-readable status line.
    fn on_status(&self, message: &str);

    /// Fired exactly once per accepted job.
    fn on_terminal(&self, outcome: &JobOutcome);
}

/// Observer that ignores every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl JobObserver for NoopObserver {
    fn on_progress(&self, _fraction: f64, _remaining_secs: f64) {}
    fn on_status(&self, _message: &str) {}
    fn on_terminal(&self, _outcome: &JobOutcome) {}
}

/// Observer that writes updates to the log.
///
/// Progress is logged only when the whole percentage changes.
#[derive(Debug)]
pub struct LogObserver {
    last_percent: AtomicI64,
}

impl Default for LogObserver {
    fn default() -> Self {
        Self {
            last_percent: AtomicI64::new(-1),
        }
    }
}

impl JobObserver for LogObserver {
    fn on_progress(&self, fraction: f64, remaining_secs: f64) {
        let percent = (fraction * 100.0).floor() as i64;
        if self.last_percent.swap(percent, Ordering::Relaxed) != percent {
            info!(
                "{:>3}% (remaining {})",
                percent,
                format_eta(remaining_secs)
            );
        }
    }

    fn on_status(&self, message: &str) {
        info!("{}", message);
    }

    fn on_terminal(&self, outcome: &JobOutcome) {
        self.last_percent.store(-1, Ordering::Relaxed);
        match outcome {
            JobOutcome::Completed => info!("Job completed"),
            JobOutcome::Failed { reason } => error!("Job failed: {}", reason),
            JobOutcome::Canceled => warn!("Job canceled"),
        }
    }
}

/// Fans supervisor updates out to the observer and the status channel.
#[derive(Clone)]
pub(crate) struct StatusReporter {
    observer: Arc<dyn JobObserver>,
    status: Arc<watch::Sender<JobStatusView>>,
}

impl StatusReporter {
    pub(crate) fn new(observer: Arc<dyn JobObserver>, status: Arc<watch::Sender<JobStatusView>>) -> Self {
        Self { observer, status }
    }

    pub(crate) fn progress(&self, phase: Phase, fraction: f64, remaining_secs: f64) {
        self.status.send_modify(|view| {
            view.phase = phase;
            view.fraction = fraction;
            view.remaining_secs = remaining_secs;
        });
        self.observer.on_progress(fraction, remaining_secs);
    }

    /// Record a phase change without notifying the observer.
    pub(crate) fn phase(&self, phase: Phase) {
        self.status.send_modify(|view| view.phase = phase);
    }

    pub(crate) fn status(&self, message: &str) {
        self.status.send_modify(|view| view.message = message.to_string());
        self.observer.on_status(message);
    }

    pub(crate) fn terminal(&self, outcome: &JobOutcome) {
        self.status
            .send_modify(|view| view.outcome = Some(outcome.clone()));
        self.observer.on_terminal(outcome);
    }
}
