//! Job controller: the submission surface shells talk to.

use std::sync::Arc;

use betinha_media::{
    ensure_output_path, DurationProbe, FfprobeDurationProbe, SystemLauncher, ToolLauncher,
};
use betinha_models::{ConversionRequest, Job, JobId, JobOutcome, JobStatusView};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, Instrument};

use crate::config::ConverterConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLogger;
use crate::metrics;
use crate::observer::{JobObserver, StatusReporter};
use crate::supervisor::Supervisor;

/// Handle that cancels the job it was taken from.
///
/// Cheap to clone and usable from other tasks (signal handlers, UI callbacks).
#[derive(Clone)]
pub struct JobCanceller {
    job_id: JobId,
    tx: Arc<watch::Sender<bool>>,
}

impl JobCanceller {
    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// Request cancellation. Repeated calls are harmless.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

struct ActiveJob {
    id: JobId,
    cancel_tx: Arc<watch::Sender<bool>>,
    handle: JoinHandle<JobOutcome>,
}

/// Accepts conversion requests and runs at most one job at a time.
///
/// Must be used from within a Tokio runtime.
pub struct JobController {
    config: Arc<ConverterConfig>,
    launcher: Arc<dyn ToolLauncher>,
    probe: Arc<dyn DurationProbe>,
    observer: Arc<dyn JobObserver>,
    status_tx: Arc<watch::Sender<JobStatusView>>,
    active: Option<ActiveJob>,
}

impl JobController {
    /// Controller backed by real tool processes.
    pub fn new(config: ConverterConfig, observer: Arc<dyn JobObserver>) -> Self {
        let probe = FfprobeDurationProbe::new(config.ffprobe_program.clone());
        Self::with_tools(config, Arc::new(SystemLauncher), Arc::new(probe), observer)
    }

    /// Controller with explicit launcher and probe implementations.
    pub fn with_tools(
        config: ConverterConfig,
        launcher: Arc<dyn ToolLauncher>,
        probe: Arc<dyn DurationProbe>,
        observer: Arc<dyn JobObserver>,
    ) -> Self {
        let (status_tx, _) = watch::channel(JobStatusView::default());
        Self {
            config: Arc::new(config),
            launcher,
            probe,
            observer,
            status_tx: Arc::new(status_tx),
            active: None,
        }
    }

    /// Validate a request and start its job.
    ///
    /// Rejections happen before any process is spawned and never reach the
    /// observer. The output file is created empty so bad paths fail here.
    pub async fn submit(&mut self, request: ConversionRequest) -> WorkerResult<JobId> {
        if self.is_active() {
            return Err(WorkerError::JobActive);
        }
        request.validate().map_err(WorkerError::Validation)?;

        let job = Job::from_request(&request);
        ensure_output_path(&job.output)
            .await
            .map_err(|source| WorkerError::OutputPath {
                path: job.output.clone(),
                source,
            })?;

        let id = job.id.clone();
        let logger = JobLogger::new(&id, job.plan);
        info!(job_id = %id, plan = job.plan.as_str(), "Accepted conversion job");
        metrics::record_job_submitted(job.plan);

        self.status_tx.send_replace(JobStatusView {
            job_id: Some(id.clone()),
            ..JobStatusView::default()
        });

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let reporter = StatusReporter::new(self.observer.clone(), self.status_tx.clone());
        let supervisor = Supervisor::new(
            job,
            self.config.clone(),
            self.launcher.clone(),
            self.probe.clone(),
            cancel_rx,
            reporter,
        );
        let handle = tokio::spawn(supervisor.run().instrument(logger.create_span()));

        self.active = Some(ActiveJob {
            id: id.clone(),
            cancel_tx: Arc::new(cancel_tx),
            handle,
        });
        Ok(id)
    }

    /// Whether a job is still running.
    pub fn is_active(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|job| !job.handle.is_finished())
    }

    /// Request cancellation of the running job.
    ///
    /// Returns `false` when no job is running. The terminal outcome is
    /// reported later, once the tool has actually exited.
    pub fn cancel(&self) -> bool {
        match &self.active {
            Some(job) if !job.handle.is_finished() => {
                info!(job_id = %job.id, "Cancellation requested");
                job.cancel_tx.send_replace(true);
                true
            }
            _ => false,
        }
    }

    /// Cancel handle for the current job.
    pub fn canceller(&self) -> Option<JobCanceller> {
        self.active.as_ref().map(|job| JobCanceller {
            job_id: job.id.clone(),
            tx: job.cancel_tx.clone(),
        })
    }

    /// Latest status of the current or last job.
    pub fn status(&self) -> JobStatusView {
        self.status_tx.borrow().clone()
    }

    /// Receiver that is notified on every status change.
    pub fn subscribe(&self) -> watch::Receiver<JobStatusView> {
        self.status_tx.subscribe()
    }

    /// Wait for the current job to finish.
    ///
    /// Returns `None` when no job was submitted since the last wait.
    pub async fn wait(&mut self) -> Option<JobOutcome> {
        let job = self.active.take()?;
        match job.handle.await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!(job_id = %job.id, "Supervisor task ended abnormally: {}", e);
                Some(JobOutcome::failed(e.to_string()))
            }
        }
    }
}
