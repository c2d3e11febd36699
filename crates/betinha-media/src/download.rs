//! yt-dlp command builder.
//!
//! The download always lands at one caller-chosen path in a forced
//! container, and progress is reported one line per update in the format
//! [`DownloadProgress::parse`](crate::progress::DownloadProgress::parse) reads.

use std::path::{Path, PathBuf};

use crate::process::{ProgressChannel, ToolInvocation};

/// Progress template understood by the download parser.
pub const PROGRESS_TEMPLATE: &str = "progress:[downloaded=%(progress.downloaded_bytes)s total=%(progress.total_bytes)s eta=%(progress.eta)s speed=%(progress.speed)s percent=%(progress._percent_str)s]";

/// Best video plus best audio, or the best combined stream.
pub const DEFAULT_FORMAT_SELECTOR: &str = "bv*+ba/b";

/// Builder for yt-dlp commands.
#[derive(Debug, Clone)]
pub struct YtDlpCommand {
    /// Interpreter the script runs under, if any (e.g. "python3")
    interpreter: Option<String>,
    /// yt-dlp executable or script
    program: String,
    /// Source URL
    url: String,
    /// Fixed output path
    output: PathBuf,
    /// Container forced on merged downloads
    merge_format: String,
    /// Format selector
    format_selector: String,
}

impl YtDlpCommand {
    /// Create a new yt-dlp command.
    pub fn new(url: impl Into<String>, output: impl AsRef<Path>) -> Self {
        Self {
            interpreter: None,
            program: "yt-dlp".to_string(),
            url: url.into(),
            output: output.as_ref().to_path_buf(),
            merge_format: "mkv".to_string(),
            format_selector: DEFAULT_FORMAT_SELECTOR.to_string(),
        }
    }

    /// Use a specific yt-dlp executable or script.
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Run the script through an interpreter.
    pub fn interpreter(mut self, interpreter: Option<String>) -> Self {
        self.interpreter = interpreter.filter(|i| !i.trim().is_empty());
        self
    }

    /// Set the container merged downloads are written in.
    pub fn merge_format(mut self, format: impl Into<String>) -> Self {
        self.merge_format = format.into();
        self
    }

    /// Build the yt-dlp arguments (without the interpreter).
    pub fn build_args(&self) -> Vec<String> {
        vec![
            "--newline".to_string(),
            "-f".to_string(),
            self.format_selector.clone(),
            "--merge-output-format".to_string(),
            self.merge_format.clone(),
            "-o".to_string(),
            self.output.to_string_lossy().to_string(),
            "--progress-template".to_string(),
            PROGRESS_TEMPLATE.to_string(),
            self.url.clone(),
        ]
    }

    /// Resolve into a launchable invocation.
    pub fn invocation(&self) -> ToolInvocation {
        let (program, args) = match &self.interpreter {
            Some(interpreter) => {
                let mut args = vec![self.program.clone()];
                args.extend(self.build_args());
                (interpreter.clone(), args)
            }
            None => (self.program.clone(), self.build_args()),
        };

        ToolInvocation {
            tool: "yt-dlp",
            program,
            args,
            progress: ProgressChannel::Stdout,
        }
    }
}
