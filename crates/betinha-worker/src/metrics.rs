//! Job metrics.
//!
//! Emitted through the `metrics` facade. Nothing is recorded unless the
//! embedding application installs a recorder.

use betinha_models::{JobOutcome, JobPlan, Phase};
use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const JOBS_SUBMITTED_TOTAL: &str = "betinha_jobs_submitted_total";
    pub const JOBS_FINISHED_TOTAL: &str = "betinha_jobs_finished_total";
    pub const PHASE_DURATION_SECONDS: &str = "betinha_phase_duration_seconds";
    pub const SPAWN_FAILURES_TOTAL: &str = "betinha_spawn_failures_total";
}

/// Record an accepted submission.
pub fn record_job_submitted(plan: JobPlan) {
    let labels = [("plan", plan.as_str().to_string())];
    counter!(names::JOBS_SUBMITTED_TOTAL, &labels).increment(1);
}

/// Record a terminal outcome.
pub fn record_job_finished(outcome: &JobOutcome) {
    let labels = [("outcome", outcome.as_str().to_string())];
    counter!(names::JOBS_FINISHED_TOTAL, &labels).increment(1);
}

/// Record how long one tool ran.
pub fn record_phase_duration(phase: Phase, duration_secs: f64) {
    let labels = [("phase", phase.as_str().to_string())];
    histogram!(names::PHASE_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a tool that could not be started.
pub fn record_spawn_failure(tool: &str) {
    let labels = [("tool", tool.to_string())];
    counter!(names::SPAWN_FAILURES_TOTAL, &labels).increment(1);
}
