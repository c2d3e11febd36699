//! Structured job logging utilities.
//!
//! Keeps job lifecycle log lines consistent: every line carries the job ID
//! and the job's plan as structured fields.

use betinha_models::{JobId, JobPlan};
use tracing::{error, info, warn, Span};

/// Job logger for structured logging with consistent formatting.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
    plan: &'static str,
}

impl JobLogger {
    pub fn new(job_id: &JobId, plan: JobPlan) -> Self {
        Self {
            job_id: job_id.to_string(),
            plan: plan.as_str(),
        }
    }

    /// Log the start of a job.
    pub fn log_start(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            plan = self.plan,
            "Job started: {}", message
        );
    }

    /// Log a progress milestone (phase change, tool launch).
    pub fn log_progress(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            plan = self.plan,
            "Job progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            job_id = %self.job_id,
            plan = self.plan,
            "Job warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            job_id = %self.job_id,
            plan = self.plan,
            "Job error: {}", message
        );
    }

    /// Log the terminal outcome of a job.
    pub fn log_completion(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            plan = self.plan,
            "Job finished: {}", message
        );
    }

    /// Create a tracing span for this job.
    ///
    /// The supervisor task is instrumented with it, so tool-level log lines
    /// emitted by the media crate inherit the job fields.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("job", job_id = %self.job_id, plan = self.plan)
    }
}
