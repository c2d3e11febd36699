//! Process supervisor.
//!
//! Drives one job through its phases: launches each tool, drains its
//! progress pipe into the [`ProgressSnapshot`], waits for the exit and
//! classifies it. Cancellation is a watch flag; when it flips, the live tool
//! is asked to terminate and its exit is later reported as canceled,
//! whatever its exit code.

use std::path::Path;
use std::sync::Arc;

use betinha_media::{
    remove_stale_file, DownloadProgress, DurationProbe, FfmpegCommand, LineEvent, LineReader,
    MediaResult, SpawnedTool, ToolExit, ToolInvocation, ToolLauncher, ToolProcess,
    TranscodeProgress, YtDlpCommand,
};
use betinha_models::{InputSource, Job, JobOutcome, JobPlan, Phase};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use crate::config::ConverterConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::eta::UnifiedProgress;
use crate::logging::JobLogger;
use crate::metrics;
use crate::observer::StatusReporter;
use crate::snapshot::ProgressSnapshot;

/// Status lines reported to observers.
pub mod messages {
    pub const DOWNLOADING: &str = "Downloading from YouTube…";
    pub const CONVERTING: &str = "Converting…";
    pub const DOWNLOAD_FINISHED: &str = "Download finished. Starting conversion…";
    pub const CANCELING: &str = "Canceling…";
    pub const CANCELED: &str = "Canceled.";
    pub const DOWNLOAD_FAILED: &str = "Download failed.";
    pub const CONVERSION_FAILED: &str = "Conversion failed.";
    pub const CONVERSION_FINISHED: &str = "Conversion finished.";
}

/// Supervisor state machine.
///
/// Single-phase jobs go straight from `Idle` to `Phase2Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupervisorState {
    Idle,
    Phase1Running,
    Phase1Succeeded,
    Phase2Running,
    Canceling,
    Completed,
    Failed,
    Canceled,
}

impl SupervisorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupervisorState::Idle => "idle",
            SupervisorState::Phase1Running => "phase1_running",
            SupervisorState::Phase1Succeeded => "phase1_succeeded",
            SupervisorState::Phase2Running => "phase2_running",
            SupervisorState::Canceling => "canceling",
            SupervisorState::Completed => "completed",
            SupervisorState::Failed => "failed",
            SupervisorState::Canceled => "canceled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SupervisorState::Completed | SupervisorState::Failed | SupervisorState::Canceled
        )
    }

    /// Check if transitioning to `next` is legal.
    pub fn can_transition_to(&self, next: SupervisorState) -> bool {
        use SupervisorState::*;

        matches!(
            (self, next),
            (Idle, Phase1Running)
                | (Idle, Phase2Running)
                | (Idle, Canceled)
                | (Phase1Running, Phase1Succeeded)
                | (Phase1Running, Failed)
                | (Phase1Running, Canceling)
                | (Phase1Running, Canceled)
                | (Phase1Succeeded, Phase2Running)
                | (Phase1Succeeded, Canceled)
                | (Phase2Running, Completed)
                | (Phase2Running, Failed)
                | (Phase2Running, Canceling)
                | (Phase2Running, Canceled)
                | (Canceling, Canceled)
        )
    }
}

/// What woke a supervisor wait.
enum Wake<T> {
    /// The cancel flag changed, or its sender went away (`open == false`)
    Cancel { open: bool },
    Ready(T),
}

/// Runs a single job to its terminal outcome.
pub(crate) struct Supervisor {
    job: Job,
    config: Arc<ConverterConfig>,
    launcher: Arc<dyn ToolLauncher>,
    probe: Arc<dyn DurationProbe>,
    snapshot: ProgressSnapshot,
    state: SupervisorState,
    cancel_rx: watch::Receiver<bool>,
    cancel_open: bool,
    reporter: StatusReporter,
    logger: JobLogger,
}

impl Supervisor {
    pub(crate) fn new(
        job: Job,
        config: Arc<ConverterConfig>,
        launcher: Arc<dyn ToolLauncher>,
        probe: Arc<dyn DurationProbe>,
        cancel_rx: watch::Receiver<bool>,
        reporter: StatusReporter,
    ) -> Self {
        let logger = JobLogger::new(&job.id, job.plan);
        Self {
            job,
            config,
            launcher,
            probe,
            snapshot: ProgressSnapshot::new(),
            state: SupervisorState::Idle,
            cancel_rx,
            cancel_open: true,
            reporter,
            logger,
        }
    }

    /// Drive the job and report its outcome exactly once.
    pub(crate) async fn run(mut self) -> JobOutcome {
        self.logger.log_start(&format!(
            "{} -> {} ({})",
            input_label(&self.job.input),
            self.job.output.display(),
            self.job.format
        ));

        let outcome = match self.drive().await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.logger.log_error(&e.to_string());
                self.state = SupervisorState::Failed;
                JobOutcome::failed(e.to_string())
            }
        };

        let phase = self.snapshot.phase();
        match &outcome {
            JobOutcome::Completed => {
                let done = UnifiedProgress::DONE;
                self.reporter.progress(phase, done.fraction, done.remaining_secs);
                self.reporter.status(messages::CONVERSION_FINISHED);
            }
            JobOutcome::Failed { reason } => self.reporter.status(reason),
            JobOutcome::Canceled => {
                let zero = UnifiedProgress::ZERO;
                self.reporter.progress(phase, zero.fraction, zero.remaining_secs);
                self.reporter.status(messages::CANCELED);
            }
        }

        metrics::record_job_finished(&outcome);
        self.reporter.terminal(&outcome);
        self.logger.log_completion(&outcome.to_string());
        outcome
    }

    async fn drive(&mut self) -> WorkerResult<JobOutcome> {
        self.snapshot.restart();
        if self.cancellation_requested() {
            return self.finish(JobOutcome::Canceled);
        }

        let source = match self.job.input.clone() {
            InputSource::RemoteUrl(url) => {
                if let Some(outcome) = self.download(&url).await? {
                    return Ok(outcome);
                }
                self.config.download_path.clone()
            }
            InputSource::LocalPath(path) => {
                self.reporter.status(messages::CONVERTING);
                self.seed_duration(&path).await;
                path
            }
        };

        self.transcode(&source).await
    }

    /// Phase 1. Returns `Some` when the job ended during the download.
    async fn download(&mut self, url: &str) -> WorkerResult<Option<JobOutcome>> {
        self.transition(SupervisorState::Phase1Running)?;
        self.snapshot.enter_phase(Phase::Downloading)?;

        let download_path = self.config.download_path.clone();
        if let Err(e) = remove_stale_file(&download_path).await {
            self.logger.log_error(&format!(
                "Cannot remove stale download {}: {}",
                download_path.display(),
                e
            ));
            return self.finish(JobOutcome::failed(e.to_string())).map(Some);
        }

        self.reporter.status(messages::DOWNLOADING);
        self.reset_progress();

        let invocation = YtDlpCommand::new(url, &download_path)
            .program(self.config.ytdlp_program.as_str())
            .interpreter(self.config.ytdlp_interpreter.clone())
            .merge_format(self.config.merge_format.as_str())
            .invocation();

        let exit = match self.run_phase(Phase::Downloading, &invocation).await {
            Ok(exit) => exit,
            Err(e) => return self.finish(JobOutcome::failed(e.to_string())).map(Some),
        };

        if self.cancellation_requested() {
            return self.finish(JobOutcome::Canceled).map(Some);
        }
        if !exit.success() {
            return self
                .finish(JobOutcome::failed(messages::DOWNLOAD_FAILED))
                .map(Some);
        }

        self.transition(SupervisorState::Phase1Succeeded)?;
        self.reporter.status(messages::DOWNLOAD_FINISHED);
        self.seed_duration(&download_path).await;
        Ok(None)
    }

    /// Phase 2, for both plans.
    async fn transcode(&mut self, source: &Path) -> WorkerResult<JobOutcome> {
        if self.cancellation_requested() {
            return self.finish(JobOutcome::Canceled);
        }

        self.transition(SupervisorState::Phase2Running)?;
        self.snapshot.enter_phase(Phase::Transcoding)?;
        match self.job.plan {
            JobPlan::SinglePhase => self.reset_progress(),
            // The bar keeps its download-phase value until ffmpeg reports
            JobPlan::TwoPhase => self.reporter.phase(Phase::Transcoding),
        }

        let mut command =
            FfmpegCommand::new(source, &self.job.output).program(self.config.ffmpeg_program.as_str());
        if self.job.format.is_still_image() {
            command = command.single_frame();
        } else if self.job.format.is_audio_only() {
            command = command.no_video();
        }

        let exit = match self.run_phase(Phase::Transcoding, &command.invocation()).await {
            Ok(exit) => exit,
            Err(e) => return self.finish(JobOutcome::failed(e.to_string())),
        };

        if self.cancellation_requested() {
            return self.finish(JobOutcome::Canceled);
        }
        if exit.success() {
            self.finish(JobOutcome::Completed)
        } else {
            self.finish(JobOutcome::failed(messages::CONVERSION_FAILED))
        }
    }

    /// Launch one tool, drain its progress pipe, then reap it.
    ///
    /// The pipe is always drained to end-of-stream before the exit status is
    /// awaited, so the last progress line is never lost. Both the reader and
    /// the process handle are released before returning.
    async fn run_phase(&mut self, phase: Phase, invocation: &ToolInvocation) -> MediaResult<ToolExit> {
        let started = Instant::now();
        let SpawnedTool {
            mut process,
            progress,
        } = match self.launcher.launch(invocation) {
            Ok(spawned) => spawned,
            Err(e) => {
                metrics::record_spawn_failure(invocation.tool);
                self.logger
                    .log_error(&format!("Failed to launch {}: {}", invocation.tool, e));
                return Err(e);
            }
        };

        self.logger.log_progress(&format!("{} started", invocation.tool));
        debug!(
            pid = ?process.id(),
            phase = %phase,
            "Running {}",
            invocation.command_line()
        );

        let mut lines = LineReader::new(progress);
        let mut signaled = false;

        loop {
            if !signaled && self.cancellation_requested() {
                signaled = true;
                self.request_termination(process.as_mut());
            }

            let wake = tokio::select! {
                changed = self.cancel_rx.changed(), if !signaled && self.cancel_open => {
                    Wake::Cancel { open: changed.is_ok() }
                }
                event = lines.next_event() => Wake::Ready(event),
            };

            match wake {
                Wake::Cancel { open } => self.cancel_open &= open,
                Wake::Ready(LineEvent::Line(line)) => self.handle_line(phase, &line),
                Wake::Ready(LineEvent::EndOfStream) => break,
                Wake::Ready(LineEvent::Error(e)) => {
                    // Treated as end-of-stream; the exit code decides the outcome
                    warn!(phase = %phase, "Error reading {} output: {}", invocation.tool, e);
                    break;
                }
            }
        }
        drop(lines);

        let exit = loop {
            if !signaled && self.cancellation_requested() {
                signaled = true;
                self.request_termination(process.as_mut());
            }

            let wake = tokio::select! {
                changed = self.cancel_rx.changed(), if !signaled && self.cancel_open => {
                    Wake::Cancel { open: changed.is_ok() }
                }
                result = process.wait() => Wake::Ready(result),
            };

            match wake {
                Wake::Cancel { open } => self.cancel_open &= open,
                Wake::Ready(Ok(exit)) => break exit,
                Wake::Ready(Err(e)) => {
                    warn!(phase = %phase, "Failed to reap {}: {}", invocation.tool, e);
                    break ToolExit {
                        code: None,
                        signal: None,
                    };
                }
            }
        };
        drop(process);

        let elapsed = started.elapsed().as_secs_f64();
        metrics::record_phase_duration(phase, elapsed);
        debug!(
            phase = %phase,
            exit_code = ?exit.code,
            signal = ?exit.signal,
            "{} exited after {:.1}s",
            invocation.tool,
            elapsed
        );

        Ok(exit)
    }

    fn handle_line(&mut self, phase: Phase, line: &str) {
        let applied = match phase {
            Phase::Downloading => match DownloadProgress::parse(line) {
                Some(progress) => {
                    self.snapshot.apply_download(&progress);
                    true
                }
                None => false,
            },
            Phase::Transcoding => match TranscodeProgress::parse(line) {
                Some(progress) => {
                    self.snapshot.apply_transcode(&progress);
                    true
                }
                None => false,
            },
            Phase::Idle => false,
        };

        if applied {
            self.publish_progress();
        } else {
            trace!(phase = %phase, line, "Ignoring tool output");
        }
    }

    /// Latch the cancel flag into the snapshot and report it.
    fn cancellation_requested(&mut self) -> bool {
        if !self.snapshot.cancel_requested() && *self.cancel_rx.borrow_and_update() {
            self.snapshot.request_cancel();
            self.logger.log_warning("cancellation requested");
        }
        self.snapshot.cancel_requested()
    }

    fn request_termination(&mut self, process: &mut dyn ToolProcess) {
        if let Err(e) = process.terminate() {
            self.logger
                .log_warning(&format!("Failed to signal tool process: {}", e));
        }
        if let Err(e) = self.transition(SupervisorState::Canceling) {
            warn!("{}", e);
        }
        self.reporter.status(messages::CANCELING);
    }

    async fn seed_duration(&mut self, path: &Path) {
        let duration = self.probe.duration(path).await;
        if duration <= 0.0 {
            self.logger.log_warning(&format!(
                "Unknown duration for {}, transcode ETA unavailable",
                path.display()
            ));
        }
        self.snapshot.set_total_duration(duration);
    }

    /// Zero the bar at the start of a job's first phase.
    fn reset_progress(&self) {
        let zero = UnifiedProgress::ZERO;
        self.reporter
            .progress(self.snapshot.phase(), zero.fraction, zero.remaining_secs);
    }

    fn publish_progress(&self) {
        let report = self.snapshot.report();
        self.reporter
            .progress(self.snapshot.phase(), report.fraction, report.remaining_secs);
    }

    fn finish(&mut self, outcome: JobOutcome) -> WorkerResult<JobOutcome> {
        let next = match &outcome {
            JobOutcome::Completed => SupervisorState::Completed,
            JobOutcome::Failed { .. } => SupervisorState::Failed,
            JobOutcome::Canceled => SupervisorState::Canceled,
        };
        self.transition(next)?;
        Ok(outcome)
    }

    fn transition(&mut self, next: SupervisorState) -> WorkerResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(WorkerError::InvalidTransition {
                from: self.state.as_str(),
                to: next.as_str(),
            });
        }
        debug!(from = self.state.as_str(), to = next.as_str(), "Supervisor transition");
        self.state = next;
        Ok(())
    }
}

fn input_label(input: &InputSource) -> String {
    match input {
        InputSource::RemoteUrl(url) => url.clone(),
        InputSource::LocalPath(path) => path.display().to_string(),
    }
}
