//! Conversion job orchestration.
//!
//! This crate provides:
//! - The job controller (submission, cancellation, status, wait)
//! - The process supervisor driving download and transcode phases
//! - The unified progress/ETA model
//! - The observer interface for presentation shells
//! - Configuration, structured job logging and metrics

pub mod config;
pub mod controller;
pub mod error;
pub mod eta;
pub mod logging;
pub mod metrics;
pub mod observer;
pub mod snapshot;
pub mod supervisor;

pub use config::ConverterConfig;
pub use controller::{JobCanceller, JobController};
pub use error::{WorkerError, WorkerResult};
pub use eta::{unified_progress, UnifiedProgress};
pub use logging::JobLogger;
pub use observer::{JobObserver, LogObserver, NoopObserver};
pub use snapshot::ProgressSnapshot;
pub use supervisor::{messages, SupervisorState};
