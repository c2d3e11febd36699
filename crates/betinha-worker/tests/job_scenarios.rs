//! End-to-end job scenarios against scripted tools.
//!
//! No OS process is started: the launcher hands out in-memory pipes and
//! fake process handles, so every exit code and cancellation race is
//! reproducible.

use std::collections::VecDeque;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use betinha_media::{
    DurationProbe, MediaError, MediaResult, SpawnedTool, ToolExit, ToolInvocation, ToolLauncher,
    ToolProcess,
};
use betinha_models::{ConversionRequest, JobOutcome, JobStatusView, OutputFormat, Phase};
use betinha_worker::{ConverterConfig, JobController, JobObserver, WorkerError};
use tokio::io::{AsyncReadExt, DuplexStream};
use tokio::sync::Notify;
use tokio_test::io::{Builder, Mock};

const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Counters {
    terminated: AtomicUsize,
    dropped: AtomicUsize,
}

enum Output {
    /// Scripted pipe; the process exits as soon as it is awaited
    Scripted(Mock),
    /// Pipe stays open, and the process stays alive, until terminated
    Live(Vec<u8>),
    /// Launch fails with ToolNotFound
    Missing,
}

struct Script {
    output: Output,
    exit: ToolExit,
}

impl Script {
    fn scripted(mock: Mock, exit: ToolExit) -> Self {
        Self {
            output: Output::Scripted(mock),
            exit,
        }
    }

    /// A tool that runs until it is signaled, then exits with `exit`.
    fn live(prefix: &[u8], exit: ToolExit) -> Self {
        Self {
            output: Output::Live(prefix.to_vec()),
            exit,
        }
    }

    fn missing() -> Self {
        Self {
            output: Output::Missing,
            exit: ToolExit::from_code(127),
        }
    }
}

struct FakeProcess {
    exit: ToolExit,
    live: bool,
    terminated: bool,
    reaped: bool,
    writer: Option<DuplexStream>,
    counters: Arc<Counters>,
}

#[async_trait]
impl ToolProcess for FakeProcess {
    fn id(&self) -> Option<u32> {
        if self.reaped {
            None
        } else {
            Some(4242)
        }
    }

    fn terminate(&mut self) -> MediaResult<()> {
        self.counters.terminated.fetch_add(1, Ordering::SeqCst);
        self.terminated = true;
        // Closing the write half ends the progress stream
        self.writer.take();
        Ok(())
    }

    async fn wait(&mut self) -> MediaResult<ToolExit> {
        if self.live && !self.terminated {
            std::future::pending::<()>().await;
        }
        self.reaped = true;
        Ok(self.exit)
    }
}

impl Drop for FakeProcess {
    fn drop(&mut self) {
        self.counters.dropped.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct ScriptedLauncher {
    scripts: Mutex<VecDeque<Script>>,
    invocations: Mutex<Vec<ToolInvocation>>,
    counters: Arc<Counters>,
}

impl ScriptedLauncher {
    fn new(scripts: Vec<Script>) -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(scripts.into()),
            ..Default::default()
        })
    }

    fn invocations(&self) -> Vec<ToolInvocation> {
        self.invocations.lock().unwrap().clone()
    }

    fn terminated(&self) -> usize {
        self.counters.terminated.load(Ordering::SeqCst)
    }

    fn dropped(&self) -> usize {
        self.counters.dropped.load(Ordering::SeqCst)
    }
}

impl ToolLauncher for ScriptedLauncher {
    fn launch(&self, invocation: &ToolInvocation) -> MediaResult<SpawnedTool> {
        self.invocations.lock().unwrap().push(invocation.clone());
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected tool launch");

        let fake = |live: bool, writer: Option<DuplexStream>| FakeProcess {
            exit: script.exit,
            live,
            terminated: false,
            reaped: false,
            writer,
            counters: self.counters.clone(),
        };

        match script.output {
            Output::Scripted(mock) => Ok(SpawnedTool {
                process: Box::new(fake(false, None)),
                progress: Box::new(mock),
            }),
            Output::Live(prefix) => {
                let (reader, writer) = tokio::io::duplex(64);
                Ok(SpawnedTool {
                    process: Box::new(fake(true, Some(writer))),
                    progress: Box::new(Cursor::new(prefix).chain(reader)),
                })
            }
            Output::Missing => Err(MediaError::ToolNotFound {
                tool: invocation.tool,
                program: invocation.program.clone(),
            }),
        }
    }
}

/// Holds a probe call open until the test releases it.
#[derive(Default)]
struct ProbeGate {
    entered: Notify,
    release: Notify,
}

struct StaticProbe {
    duration: f64,
    calls: Mutex<Vec<PathBuf>>,
    gate: Option<ProbeGate>,
}

impl StaticProbe {
    fn new(duration: f64) -> Arc<Self> {
        Arc::new(Self {
            duration,
            calls: Mutex::new(Vec::new()),
            gate: None,
        })
    }

    fn gated(duration: f64) -> Arc<Self> {
        Arc::new(Self {
            duration,
            calls: Mutex::new(Vec::new()),
            gate: Some(ProbeGate::default()),
        })
    }

    /// Wait until the supervisor is blocked inside the probe.
    async fn entered(&self) {
        self.gate.as_ref().expect("probe is not gated").entered.notified().await;
    }

    fn release(&self) {
        self.gate.as_ref().expect("probe is not gated").release.notify_one();
    }

    fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DurationProbe for StaticProbe {
    async fn duration(&self, path: &Path) -> f64 {
        self.calls.lock().unwrap().push(path.to_path_buf());
        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        self.duration
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Progress(f64, f64),
    Status(String),
    Terminal(JobOutcome),
}

#[derive(Default)]
struct RecordingObserver {
    events: Mutex<Vec<Event>>,
}

impl RecordingObserver {
    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn progress(&self) -> Vec<(f64, f64)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Progress(f, r) => Some((f, r)),
                _ => None,
            })
            .collect()
    }

    fn statuses(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Status(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    fn terminals(&self) -> Vec<JobOutcome> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Terminal(o) => Some(o),
                _ => None,
            })
            .collect()
    }
}

impl JobObserver for RecordingObserver {
    fn on_progress(&self, fraction: f64, remaining_secs: f64) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Progress(fraction, remaining_secs));
    }

    fn on_status(&self, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Status(message.to_string()));
    }

    fn on_terminal(&self, outcome: &JobOutcome) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Terminal(outcome.clone()));
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Harness {
    dir: tempfile::TempDir,
    launcher: Arc<ScriptedLauncher>,
    probe: Arc<StaticProbe>,
    observer: Arc<RecordingObserver>,
    controller: JobController,
}

impl Harness {
    fn new(scripts: Vec<Script>, duration: f64) -> Self {
        Self::with_probe(scripts, StaticProbe::new(duration))
    }

    fn with_probe(scripts: Vec<Script>, probe: Arc<StaticProbe>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let launcher = ScriptedLauncher::new(scripts);
        let observer = Arc::new(RecordingObserver::default());
        let config = ConverterConfig {
            download_path: dir.path().join("download.mkv"),
            ..ConverterConfig::default()
        };
        let controller =
            JobController::with_tools(config, launcher.clone(), probe.clone(), observer.clone());

        Self {
            dir,
            launcher,
            probe,
            observer,
            controller,
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn download_path(&self) -> PathBuf {
        self.path("download.mkv")
    }

    fn request(&self, input: &str, output: &str, format: OutputFormat) -> ConversionRequest {
        ConversionRequest::new(input, self.path(output).to_string_lossy(), format)
    }

    async fn wait(&mut self) -> JobOutcome {
        self.controller.wait().await.expect("no job was running")
    }

    async fn wait_for_status(&self, predicate: impl FnMut(&JobStatusView) -> bool) {
        let mut rx = self.controller.subscribe();
        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(predicate))
            .await
            .expect("status not reached")
            .expect("status channel closed");
    }
}

fn assert_progress(actual: &[(f64, f64)], expected: &[(f64, f64)]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "progress events {:?} vs {:?}",
        actual,
        expected
    );
    for (i, ((f, r), (ef, er))) in actual.iter().zip(expected).enumerate() {
        assert!(
            (f - ef).abs() < 1e-6 && (r - er).abs() < 1e-6,
            "event {}: got ({}, {}), expected ({}, {})",
            i,
            f,
            r,
            ef,
            er
        );
    }
}

fn arg_after<'a>(invocation: &'a ToolInvocation, flag: &str) -> Option<&'a str> {
    let pos = invocation.args.iter().position(|a| a == flag)?;
    invocation.args.get(pos + 1).map(String::as_str)
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_single_phase_success() {
    let transcoder = Builder::new()
        .wait(Duration::from_secs(60))
        .read(b"out_time_ms=60000000\n")
        .read(b"speed=2.0x\n")
        .read(b"progress=end\n")
        .build();
    let mut h = Harness::new(vec![Script::scripted(transcoder, ToolExit::from_code(0))], 120.0);

    let request = h.request("a.mov", "out", OutputFormat::Mp4);
    let job_id = h.controller.submit(request).await.unwrap();
    assert_eq!(h.wait().await, JobOutcome::Completed);

    // elapsed 60s: 60 media seconds left at 1x, then 30s once speed=2x arrives
    assert_progress(
        &h.observer.progress(),
        &[(0.0, 0.0), (0.5, 60.0), (60.0 / 90.0, 30.0), (1.0, 0.0), (1.0, 0.0)],
    );
    assert_eq!(h.observer.statuses(), vec!["Converting…", "Conversion finished."]);
    assert_eq!(h.observer.terminals(), vec![JobOutcome::Completed]);

    let output = h.path("out.mp4");
    let output_arg = output.to_string_lossy().into_owned();
    assert!(output.exists());
    assert_eq!(h.probe.calls(), vec![PathBuf::from("a.mov")]);

    let invocations = h.launcher.invocations();
    assert_eq!(invocations.len(), 1);
    assert_eq!(invocations[0].tool, "ffmpeg");
    assert_eq!(arg_after(&invocations[0], "-i"), Some("a.mov"));
    assert_eq!(
        invocations[0].args.last().map(String::as_str),
        Some(output_arg.as_str())
    );

    let status = h.controller.status();
    assert_eq!(status.job_id, Some(job_id));
    assert_eq!(status.phase, Phase::Transcoding);
    assert_eq!(status.fraction, 1.0);
    assert_eq!(status.outcome, Some(JobOutcome::Completed));
    assert!(!h.controller.is_active());
}

#[tokio::test(start_paused = true)]
async fn test_two_phase_success() {
    let downloader = Builder::new()
        .wait(Duration::from_secs(5))
        .read(b"[youtube] dQw4w9WgXcQ: Downloading webpage\n")
        .read(b"progress:[downloaded=500 total=1000 eta=10 speed=100.0 percent= 50.0%]\n")
        .build();
    let transcoder = Builder::new()
        .read(b"out_time_ms=20000000\nspeed=1.0x\nprogress=end\n")
        .build();
    let mut h = Harness::new(
        vec![
            Script::scripted(downloader, ToolExit::from_code(0)),
            Script::scripted(transcoder, ToolExit::from_code(0)),
        ],
        40.0,
    );
    std::fs::write(h.download_path(), b"stale").unwrap();

    let request = h.request(URL, "clip.mkv", OutputFormat::Mp3);
    h.controller.submit(request).await.unwrap();
    assert_eq!(h.wait().await, JobOutcome::Completed);

    // While downloading the ETA is yt-dlp's 10s; transcoding then starts at
    // elapsed 5s with 20 media seconds left.
    assert_progress(
        &h.observer.progress(),
        &[
            (0.0, 0.0),
            (5.0 / 15.0, 10.0),
            (0.2, 20.0),
            (0.2, 20.0),
            (1.0, 0.0),
            (1.0, 0.0),
        ],
    );
    assert_eq!(
        h.observer.statuses(),
        vec![
            "Downloading from YouTube…",
            "Download finished. Starting conversion…",
            "Conversion finished."
        ]
    );

    let invocations = h.launcher.invocations();
    assert_eq!(invocations.len(), 2);
    assert_eq!(invocations[0].tool, "yt-dlp");
    assert_eq!(invocations[0].program, "python3");
    assert_eq!(invocations[0].args.last().map(String::as_str), Some(URL));
    let download = h.download_path();
    let download_arg = download.to_string_lossy().into_owned();
    assert_eq!(arg_after(&invocations[0], "-o"), Some(download_arg.as_str()));

    assert_eq!(invocations[1].tool, "ffmpeg");
    assert_eq!(arg_after(&invocations[1], "-i"), Some(download_arg.as_str()));
    assert!(invocations[1].args.iter().any(|a| a == "-vn"));
    assert!(h.path("clip.mkv.mp3").exists());

    assert_eq!(h.probe.calls(), vec![download.clone()]);
    assert!(!download.exists(), "stale download must be removed before yt-dlp starts");
}

#[tokio::test]
async fn test_cancel_during_download() {
    let mut h = Harness::new(
        vec![Script::live(
            b"progress:[downloaded=100 total=1000 eta=30]\n",
            ToolExit::from_signal(15),
        )],
        40.0,
    );

    let request = h.request(URL, "out", OutputFormat::Mp4);
    h.controller.submit(request).await.unwrap();
    h.wait_for_status(|v| v.phase == Phase::Downloading && v.remaining_secs > 0.0)
        .await;

    assert!(h.controller.cancel());
    assert_eq!(h.wait().await, JobOutcome::Canceled);

    assert_eq!(h.launcher.terminated(), 1);
    assert_eq!(h.launcher.dropped(), 1);
    assert_eq!(h.launcher.invocations().len(), 1, "ffmpeg must not start");
    assert!(h.probe.calls().is_empty());

    assert_eq!(h.observer.progress().last(), Some(&(0.0, 0.0)));
    let statuses = h.observer.statuses();
    assert!(statuses.contains(&"Canceling…".to_string()));
    assert_eq!(statuses.last().map(String::as_str), Some("Canceled."));
    assert_eq!(h.observer.terminals(), vec![JobOutcome::Canceled]);

    let status = h.controller.status();
    assert_eq!(status.fraction, 0.0);
    assert_eq!(status.outcome, Some(JobOutcome::Canceled));
}

#[tokio::test]
async fn test_cancel_during_transcode_after_download() {
    let downloader = Builder::new()
        .read(b"progress:[downloaded=1000 total=1000 eta=0]\n")
        .build();
    let mut h = Harness::new(
        vec![
            Script::scripted(downloader, ToolExit::from_code(0)),
            Script::live(b"out_time_ms=10000000\n", ToolExit::from_code(255)),
        ],
        40.0,
    );

    let request = h.request(URL, "out", OutputFormat::Mp4);
    h.controller.submit(request).await.unwrap();
    // 30 media seconds left once ffmpeg reports
    h.wait_for_status(|v| v.phase == Phase::Transcoding && v.remaining_secs > 0.0)
        .await;

    assert!(h.controller.cancel());
    assert_eq!(h.wait().await, JobOutcome::Canceled);

    let invocations = h.launcher.invocations();
    assert_eq!(invocations.len(), 2);
    assert_eq!(invocations[1].tool, "ffmpeg");
    assert_eq!(h.launcher.terminated(), 1);
    assert_eq!(h.launcher.dropped(), 2);

    assert_eq!(h.observer.progress().last(), Some(&(0.0, 0.0)));
    let statuses = h.observer.statuses();
    assert!(statuses.contains(&"Canceling…".to_string()));
    assert_eq!(statuses.last().map(String::as_str), Some("Canceled."));
    assert_eq!(h.observer.terminals(), vec![JobOutcome::Canceled]);

    let status = h.controller.status();
    assert_eq!(status.phase, Phase::Transcoding);
    assert_eq!(status.fraction, 0.0);
}

#[tokio::test]
async fn test_cancel_between_phases_skips_transcode() {
    let probe = StaticProbe::gated(40.0);
    let mut h = Harness::with_probe(
        vec![Script::scripted(Builder::new().build(), ToolExit::from_code(0))],
        probe.clone(),
    );

    let request = h.request(URL, "out", OutputFormat::Mp4);
    h.controller.submit(request).await.unwrap();

    // Download finished; the supervisor is probing the downloaded file
    probe.entered().await;
    assert!(h.controller.cancel());
    probe.release();
    assert_eq!(h.wait().await, JobOutcome::Canceled);

    let invocations = h.launcher.invocations();
    assert_eq!(invocations.len(), 1, "ffmpeg must not start");
    assert_eq!(invocations[0].tool, "yt-dlp");
    assert_eq!(h.launcher.terminated(), 0);
    assert_eq!(h.launcher.dropped(), 1);
    assert_eq!(probe.calls(), vec![h.download_path()]);

    let statuses = h.observer.statuses();
    assert!(statuses.contains(&"Download finished. Starting conversion…".to_string()));
    assert!(!statuses.contains(&"Canceling…".to_string()));
    assert_eq!(statuses.last().map(String::as_str), Some("Canceled."));
    assert_eq!(h.observer.progress().last(), Some(&(0.0, 0.0)));
    assert_eq!(h.observer.terminals(), vec![JobOutcome::Canceled]);
}

#[tokio::test]
async fn test_cancel_takes_precedence_over_success_exit() {
    let mut h = Harness::new(vec![Script::live(b"", ToolExit::from_code(0))], 10.0);

    let request = h.request("a.mov", "still", OutputFormat::Png);
    h.controller.submit(request).await.unwrap();
    h.wait_for_status(|v| v.phase == Phase::Transcoding).await;

    let canceller = h.controller.canceller().unwrap();
    canceller.cancel();
    canceller.cancel();
    assert_eq!(h.wait().await, JobOutcome::Canceled);

    assert_eq!(h.launcher.terminated(), 1);
    assert_eq!(h.observer.terminals(), vec![JobOutcome::Canceled]);

    let invocations = h.launcher.invocations();
    assert_eq!(arg_after(&invocations[0], "-frames:v"), Some("1"));
}

#[tokio::test]
async fn test_validation_rejects_before_spawning() {
    let mut h = Harness::new(Vec::new(), 0.0);

    let request = ConversionRequest::new("a.mov", "", OutputFormat::Mp4);
    let err = h.controller.submit(request).await.unwrap_err();
    assert!(matches!(err, WorkerError::Validation(_)));
    assert!(err.is_rejection());
    assert_eq!(err.to_string(), "Select input and output first.");

    assert!(h.launcher.invocations().is_empty());
    assert!(h.observer.events().is_empty());
    assert!(h.controller.wait().await.is_none());
}

#[tokio::test]
async fn test_uncreatable_output_is_rejected() {
    let mut h = Harness::new(Vec::new(), 0.0);
    std::fs::write(h.path("blocker"), b"").unwrap();

    let request = h.request("a.mov", "blocker/out", OutputFormat::Gif);
    let err = h.controller.submit(request).await.unwrap_err();
    assert!(matches!(err, WorkerError::OutputPath { .. }));
    assert!(err.is_rejection());

    assert!(h.launcher.invocations().is_empty());
    assert!(h.observer.events().is_empty());
    assert!(h.controller.wait().await.is_none());
}

#[tokio::test]
async fn test_malformed_download_line_is_ignored() {
    let downloader = Builder::new()
        .read(b"progress:[downloaded=abc total=xyz eta=]\n")
        .build();
    let mut h = Harness::new(
        vec![
            Script::scripted(downloader, ToolExit::from_code(0)),
            Script::scripted(Builder::new().build(), ToolExit::from_code(0)),
        ],
        0.0,
    );

    let request = h.request(URL, "out", OutputFormat::Webp);
    h.controller.submit(request).await.unwrap();
    assert_eq!(h.wait().await, JobOutcome::Completed);

    // Only the initial reset and the final 100%: the bad line changed nothing
    assert_progress(&h.observer.progress(), &[(0.0, 0.0), (1.0, 0.0)]);
}

#[tokio::test]
async fn test_download_failure_skips_transcode() {
    let downloader = Builder::new()
        .read(b"ERROR: [youtube] dQw4w9WgXcQ: Video unavailable\n")
        .build();
    let mut h = Harness::new(vec![Script::scripted(downloader, ToolExit::from_code(1))], 0.0);

    let request = h.request(URL, "out", OutputFormat::Mp4);
    h.controller.submit(request).await.unwrap();
    assert_eq!(h.wait().await, JobOutcome::failed("Download failed."));

    assert_eq!(h.launcher.invocations().len(), 1);
    assert_eq!(
        h.observer.statuses().last().map(String::as_str),
        Some("Download failed.")
    );
    assert_eq!(h.observer.terminals().len(), 1);
}

#[tokio::test]
async fn test_conversion_failure() {
    let mut h = Harness::new(
        vec![Script::scripted(Builder::new().build(), ToolExit::from_code(1))],
        30.0,
    );

    let request = h.request("a.mov", "out", OutputFormat::Mp4);
    h.controller.submit(request).await.unwrap();
    assert_eq!(h.wait().await, JobOutcome::failed("Conversion failed."));
    assert_eq!(
        h.controller.status().outcome,
        Some(JobOutcome::failed("Conversion failed."))
    );
}

#[tokio::test]
async fn test_pipe_read_error_defers_to_exit_code() {
    let cases = [
        (0, JobOutcome::Completed, "Conversion finished."),
        (1, JobOutcome::failed("Conversion failed."), "Conversion failed."),
    ];

    for (code, expected, last_status) in cases {
        let transcoder = Builder::new()
            .read(b"out_time_ms=5000000\n")
            .read_error(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "pipe closed",
            ))
            .build();
        let mut h = Harness::new(
            vec![Script::scripted(transcoder, ToolExit::from_code(code))],
            10.0,
        );

        let request = h.request("a.mov", "out", OutputFormat::Mp4);
        h.controller.submit(request).await.unwrap();
        assert_eq!(h.wait().await, expected, "exit code {}", code);

        // The line before the error was still applied: 5 of 10 media seconds left
        assert!(
            h.observer
                .progress()
                .iter()
                .any(|(_, remaining)| (remaining - 5.0).abs() < 1e-6),
            "exit code {}: {:?}",
            code,
            h.observer.progress()
        );
        assert_eq!(
            h.observer.statuses().last().map(String::as_str),
            Some(last_status)
        );
        assert_eq!(h.observer.terminals(), vec![expected]);
        assert_eq!(h.launcher.terminated(), 0);
        assert_eq!(h.launcher.dropped(), 1);
        assert!(!h.controller.is_active());
    }
}

#[tokio::test]
async fn test_spawn_failure_reports_error_message() {
    let mut h = Harness::new(vec![Script::missing()], 30.0);

    let request = h.request("a.mov", "out", OutputFormat::Mp4);
    h.controller.submit(request).await.unwrap();
    assert_eq!(
        h.wait().await,
        JobOutcome::failed("ffmpeg not found: ffmpeg")
    );
    assert_eq!(h.observer.terminals().len(), 1);
    assert_eq!(h.launcher.dropped(), 0);
}

#[tokio::test]
async fn test_concurrent_submission_rejected() {
    let mut h = Harness::new(vec![Script::live(b"", ToolExit::from_signal(15))], 10.0);

    let first = h.request("a.mov", "first", OutputFormat::Mp4);
    h.controller.submit(first).await.unwrap();
    assert!(h.controller.is_active());

    let second = h.request("b.mov", "second", OutputFormat::Mp4);
    let err = h.controller.submit(second).await.unwrap_err();
    assert!(matches!(err, WorkerError::JobActive));
    assert_eq!(err.to_string(), "A job is already running.");
    assert!(!h.path("second.mp4").exists());

    assert!(h.controller.cancel());
    assert_eq!(h.wait().await, JobOutcome::Canceled);
}

#[tokio::test]
async fn test_cancel_without_job_is_noop() {
    let h = Harness::new(Vec::new(), 0.0);
    assert!(!h.controller.cancel());
    assert!(h.controller.canceller().is_none());
    assert_eq!(h.controller.status(), JobStatusView::default());
}

#[tokio::test]
async fn test_one_terminal_event_per_job() {
    let mut h = Harness::new(
        vec![
            Script::scripted(Builder::new().build(), ToolExit::from_code(0)),
            Script::scripted(Builder::new().build(), ToolExit::from_code(1)),
        ],
        5.0,
    );

    let first = h.request("a.mov", "one", OutputFormat::Mp4);
    h.controller.submit(first).await.unwrap();
    assert_eq!(h.wait().await, JobOutcome::Completed);

    let second = h.request("b.mov", "two", OutputFormat::Gif);
    h.controller.submit(second).await.unwrap();
    assert_eq!(h.wait().await, JobOutcome::failed("Conversion failed."));

    assert_eq!(
        h.observer.terminals(),
        vec![JobOutcome::Completed, JobOutcome::failed("Conversion failed.")]
    );
    assert_eq!(h.launcher.dropped(), 2);
}
