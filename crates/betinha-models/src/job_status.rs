//! Job phases, terminal outcomes and the status view exposed to shells.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::JobId;

/// Sub-stage of a job.
///
/// Phases only move forward: `Idle -> Downloading -> Transcoding` or
/// `Idle -> Transcoding`. No phase is revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Downloading,
    Transcoding,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Downloading => "downloading",
            Phase::Transcoding => "transcoding",
        }
    }

    /// Whether `next` is a legal successor of this phase.
    pub fn can_advance_to(&self, next: Phase) -> bool {
        matches!(
            (self, next),
            (Phase::Idle, Phase::Downloading)
                | (Phase::Idle, Phase::Transcoding)
                | (Phase::Downloading, Phase::Transcoding)
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Final, immutable result of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum JobOutcome {
    Completed,
    Failed { reason: String },
    Canceled,
}

impl JobOutcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        JobOutcome::Failed {
            reason: reason.into(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobOutcome::Completed => "completed",
            JobOutcome::Failed { .. } => "failed",
            JobOutcome::Canceled => "canceled",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Completed)
    }
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobOutcome::Failed { reason } => write!(f, "failed: {}", reason),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

/// Latest known state of the active (or last) job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobStatusView {
    /// Job this view describes, `None` before the first submission
    pub job_id: Option<JobId>,
    /// Current phase
    pub phase: Phase,
    /// Unified progress fraction in [0, 1]
    pub fraction: f64,
    /// Estimated remaining seconds
    pub remaining_secs: f64,
    /// Last status message
    pub message: String,
    /// Terminal outcome once the job has finished
    pub outcome: Option<JobOutcome>,
}

impl JobStatusView {
    /// Check if the job has reached a terminal outcome.
    pub fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }
}
