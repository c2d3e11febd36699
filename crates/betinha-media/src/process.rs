//! Child process seam for the external tools.
//!
//! The worker never touches `tokio::process` directly: it asks a
//! [`ToolLauncher`] for a [`SpawnedTool`], which bundles the live process
//! handle with the pipe that carries the tool's progress lines. Tests swap
//! in scripted launchers so no real OS process is needed.

use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use tokio::io::AsyncRead;
use tokio::process::{Child, Command};
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Which pipe of the child carries its machine-readable progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressChannel {
    Stdout,
    Stderr,
}

/// A fully resolved command line for one external tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    /// Short tool name used in logs and errors ("ffmpeg", "yt-dlp")
    pub tool: &'static str,
    /// Executable to run
    pub program: String,
    /// Arguments, in order
    pub args: Vec<String>,
    /// Pipe the progress lines are read from
    pub progress: ProgressChannel,
}

impl ToolInvocation {
    /// Render the command line for logging.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Exit status of a tool process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolExit {
    /// Exit code, `None` when the process was terminated by a signal
    pub code: Option<i32>,
    /// Terminating signal on Unix
    pub signal: Option<i32>,
}

impl ToolExit {
    pub fn from_code(code: i32) -> Self {
        Self {
            code: Some(code),
            signal: None,
        }
    }

    pub fn from_signal(signal: i32) -> Self {
        Self {
            code: None,
            signal: Some(signal),
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for ToolExit {
    fn from(status: ExitStatus) -> Self {
        #[cfg(unix)]
        let signal = {
            use std::os::unix::process::ExitStatusExt;
            status.signal()
        };
        #[cfg(not(unix))]
        let signal = None;

        Self {
            code: status.code(),
            signal,
        }
    }
}

/// Progress pipe of a spawned tool.
pub type ProgressStream = Box<dyn AsyncRead + Send + Unpin>;

/// A live tool process.
#[async_trait]
pub trait ToolProcess: Send {
    /// OS process id, `None` once the process has been reaped.
    fn id(&self) -> Option<u32>;

    /// Ask the process to terminate gracefully.
    ///
    /// Safe to call repeatedly and after the process has exited.
    fn terminate(&mut self) -> MediaResult<()>;

    /// Wait for the process to exit and reap it.
    async fn wait(&mut self) -> MediaResult<ToolExit>;
}

/// A launched tool: its process handle plus its progress pipe.
pub struct SpawnedTool {
    pub process: Box<dyn ToolProcess>,
    pub progress: ProgressStream,
}

/// Starts external tools.
pub trait ToolLauncher: Send + Sync {
    fn launch(&self, invocation: &ToolInvocation) -> MediaResult<SpawnedTool>;
}

/// Launcher backed by real OS processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

impl ToolLauncher for SystemLauncher {
    fn launch(&self, invocation: &ToolInvocation) -> MediaResult<SpawnedTool> {
        let tool = invocation.tool;
        let program = which::which(&invocation.program).map_err(|_| MediaError::ToolNotFound {
            tool,
            program: invocation.program.clone(),
        })?;

        debug!("Running {}: {}", tool, invocation.command_line());

        let (stdout, stderr) = match invocation.progress {
            ProgressChannel::Stdout => (Stdio::piped(), Stdio::null()),
            ProgressChannel::Stderr => (Stdio::null(), Stdio::piped()),
        };

        let mut child = Command::new(program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .spawn()
            .map_err(|e| MediaError::spawn_failed(tool, e))?;

        let progress: ProgressStream = match invocation.progress {
            ProgressChannel::Stdout => Box::new(
                child
                    .stdout
                    .take()
                    .ok_or(MediaError::StreamNotCaptured { tool })?,
            ),
            ProgressChannel::Stderr => Box::new(
                child
                    .stderr
                    .take()
                    .ok_or(MediaError::StreamNotCaptured { tool })?,
            ),
        };

        Ok(SpawnedTool {
            process: Box::new(ChildProcess { tool, child }),
            progress,
        })
    }
}

/// [`ToolProcess`] over a `tokio::process::Child`.
struct ChildProcess {
    tool: &'static str,
    child: Child,
}

#[async_trait]
impl ToolProcess for ChildProcess {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    #[cfg(unix)]
    fn terminate(&mut self) -> MediaResult<()> {
        use nix::errno::Errno;
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        // Reaped children report no id; there is nothing left to signal.
        let Some(pid) = self.child.id() else {
            return Ok(());
        };

        debug!(pid, tool = self.tool, "Sending SIGTERM");
        match kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(e) => Err(MediaError::Signal {
                pid,
                message: e.to_string(),
            }),
        }
    }

    #[cfg(not(unix))]
    fn terminate(&mut self) -> MediaResult<()> {
        if self.child.id().is_none() {
            return Ok(());
        }
        debug!(tool = self.tool, "Killing process");
        self.child.start_kill().map_err(MediaError::from)
    }

    async fn wait(&mut self) -> MediaResult<ToolExit> {
        let status = self.child.wait().await?;
        Ok(ToolExit::from(status))
    }
}
