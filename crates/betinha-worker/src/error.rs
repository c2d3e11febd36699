//! Worker error types.

use std::path::PathBuf;

use betinha_media::MediaError;
use betinha_models::Phase;
use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("{0}")]
    Validation(String),

    #[error("A job is already running.")]
    JobActive,

    #[error("Cannot create file '{}': {source}", path.display())]
    OutputPath {
        path: PathBuf,
        #[source]
        source: MediaError,
    },

    #[error("Invalid supervisor transition: {from} -> {to}")]
    InvalidTransition { from: &'static str, to: &'static str },

    #[error("Invalid phase transition: {from} -> {to}")]
    InvalidPhase { from: Phase, to: Phase },

    #[error("Media error: {0}")]
    Media(#[from] MediaError),
}

impl WorkerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Check if the error rejected a submission before any process started.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            WorkerError::Validation(_) | WorkerError::JobActive | WorkerError::OutputPath { .. }
        )
    }
}
