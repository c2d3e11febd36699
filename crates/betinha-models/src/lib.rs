//! Shared data models for the Betinha media converter.
//!
//! This crate provides Serde-serializable types for:
//! - Conversion jobs, their plan and their input source
//! - Output formats and their canonical file extensions
//! - Job phases, terminal outcomes and status snapshots

pub mod format;
pub mod job;
pub mod job_status;
pub mod utils;

// Re-export common types
pub use format::{OutputFormat, UnknownFormat};
pub use job::{ConversionRequest, InputSource, Job, JobId, JobPlan};
pub use job_status::{JobOutcome, JobStatusView, Phase};
pub use utils::{append_extension_if_missing, format_eta, is_supported_url, SUPPORTED_URL_PREFIXES};
