//! Conversion job definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

use crate::{append_extension_if_missing, is_supported_url, OutputFormat};

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where the media for a job comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum InputSource {
    /// A URL handled by the downloader
    RemoteUrl(String),
    /// A file on the local filesystem
    LocalPath(PathBuf),
}

impl InputSource {
    /// Classify raw user input.
    pub fn classify(input: &str) -> Self {
        if is_supported_url(input) {
            InputSource::RemoteUrl(input.to_string())
        } else {
            InputSource::LocalPath(PathBuf::from(input))
        }
    }

    /// The execution plan this input requires.
    pub fn plan(&self) -> JobPlan {
        match self {
            InputSource::RemoteUrl(_) => JobPlan::TwoPhase,
            InputSource::LocalPath(_) => JobPlan::SinglePhase,
        }
    }
}

/// Execution plan of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPlan {
    /// Transcode only
    SinglePhase,
    /// Download, then transcode the downloaded artifact
    TwoPhase,
}

impl JobPlan {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobPlan::SinglePhase => "single_phase",
            JobPlan::TwoPhase => "two_phase",
        }
    }
}

/// A conversion request as submitted by a shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionRequest {
    /// Local path or remote URL
    pub input: String,
    /// Requested output path, possibly without extension
    pub output: String,
    /// Target format
    #[serde(default)]
    pub format: OutputFormat,
}

impl ConversionRequest {
    pub fn new(input: impl Into<String>, output: impl Into<String>, format: OutputFormat) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            format,
        }
    }

    /// Validate the request.
    pub fn validate(&self) -> Result<(), String> {
        if self.input.trim().is_empty() || self.output.trim().is_empty() {
            return Err("Select input and output first.".to_string());
        }
        Ok(())
    }

    /// Output path with the format's extension appended if missing.
    pub fn normalized_output(&self) -> PathBuf {
        PathBuf::from(append_extension_if_missing(&self.output, self.format))
    }
}

/// A validated conversion job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique job ID
    pub id: JobId,
    /// Media source
    pub input: InputSource,
    /// Normalized output path
    pub output: PathBuf,
    /// Target format
    pub format: OutputFormat,
    /// Single- or two-phase plan
    pub plan: JobPlan,
    /// Submission timestamp
    pub submitted_at: DateTime<Utc>,
}

impl Job {
    /// Build a job from a request that already passed validation.
    pub fn from_request(request: &ConversionRequest) -> Self {
        let input = InputSource::classify(&request.input);
        Self {
            id: JobId::new(),
            plan: input.plan(),
            input,
            output: request.normalized_output(),
            format: request.format,
            submitted_at: Utc::now(),
        }
    }
}
