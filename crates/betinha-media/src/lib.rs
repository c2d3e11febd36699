#![deny(unreachable_patterns)]
//! FFmpeg and yt-dlp CLI wrappers.
//!
//! This crate provides:
//! - Type-safe FFmpeg and yt-dlp command building
//! - A launcher seam over child processes with graceful termination
//! - A Latin-1 line reader for tool output pipes
//! - Progress parsing for yt-dlp templates and FFmpeg `-progress pipe:2`
//! - Media duration probing via ffprobe

pub mod command;
pub mod download;
pub mod error;
pub mod fs_utils;
pub mod lines;
pub mod probe;
pub mod process;
pub mod progress;

pub use command::FfmpegCommand;
pub use download::{YtDlpCommand, PROGRESS_TEMPLATE};
pub use error::{MediaError, MediaResult};
pub use fs_utils::{ensure_output_path, remove_stale_file};
pub use lines::{LineEvent, LineReader};
pub use probe::{DurationProbe, FfprobeDurationProbe};
pub use process::{
    ProgressChannel, ProgressStream, SpawnedTool, SystemLauncher, ToolExit, ToolInvocation,
    ToolLauncher, ToolProcess,
};
pub use progress::{DownloadProgress, TranscodeProgress, DOWNLOAD_PROGRESS_PREFIX};
