//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while driving the external tools.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("{tool} not found: {program}")]
    ToolNotFound { tool: &'static str, program: String },

    #[error("Failed to start {tool}: {source}")]
    SpawnFailed {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} progress stream was not captured")]
    StreamNotCaptured { tool: &'static str },

    #[error("FFprobe command failed: {message}")]
    ProbeFailed { message: String },

    #[error("Failed to signal process {pid}: {message}")]
    Signal { pid: u32, message: String },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl MediaError {
    /// Create a spawn failure error.
    pub fn spawn_failed(tool: &'static str, source: std::io::Error) -> Self {
        Self::SpawnFailed { tool, source }
    }

    /// Create a probe failure error.
    pub fn probe_failed(message: impl Into<String>) -> Self {
        Self::ProbeFailed {
            message: message.into(),
        }
    }

    /// Check if the error happened before the process existed.
    pub fn is_launch_failure(&self) -> bool {
        matches!(
            self,
            MediaError::ToolNotFound { .. }
                | MediaError::SpawnFailed { .. }
                | MediaError::StreamNotCaptured { .. }
        )
    }
}
