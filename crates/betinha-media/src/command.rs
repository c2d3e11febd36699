//! FFmpeg command builder.

use std::path::{Path, PathBuf};

use crate::process::{ProgressChannel, ToolInvocation};

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// FFmpeg executable
    program: String,
    /// Input file path
    input: PathBuf,
    /// Output file path
    output: PathBuf,
    /// Output arguments (after -i)
    output_args: Vec<String>,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            program: "ffmpeg".to_string(),
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
        }
    }

    /// Use a specific FFmpeg executable.
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Add an output argument (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Extract a single frame (still image outputs).
    pub fn single_frame(self) -> Self {
        self.output_arg("-frames:v").output_arg("1")
    }

    /// Drop the video streams (audio-only outputs).
    pub fn no_video(self) -> Self {
        self.output_arg("-vn")
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        // Overwrite the placeholder created at submission
        args.push("-y".to_string());

        // Only errors; progress has its own channel
        args.push("-v".to_string());
        args.push("error".to_string());

        // Machine-readable progress on stderr, human stats off
        args.push("-progress".to_string());
        args.push("pipe:2".to_string());
        args.push("-nostats".to_string());

        // Input file
        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());

        // Output args
        args.extend(self.output_args.clone());

        // Output file
        args.push(self.output.to_string_lossy().to_string());

        args
    }

    /// Resolve into a launchable invocation.
    pub fn invocation(&self) -> ToolInvocation {
        ToolInvocation {
            tool: "ffmpeg",
            program: self.program.clone(),
            args: self.build_args(),
            progress: ProgressChannel::Stderr,
        }
    }
}
