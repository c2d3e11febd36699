//! Command-line converter.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use betinha_models::{ConversionRequest, JobOutcome, OutputFormat};
use betinha_worker::{ConverterConfig, JobController, LogObserver};

/// Convert a local file or a YouTube URL with FFmpeg.
#[derive(Parser, Debug)]
#[command(name = "betinha", version, about)]
struct Cli {
    /// Input file path or YouTube URL
    input: String,

    /// Output path; the format's extension is appended if missing
    output: String,

    /// Output format (png, jpeg, webp, gif, mp4, mp3)
    #[arg(short, long, default_value = "mp4")]
    format: OutputFormat,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing, JSON when LOG_FORMAT=json
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(false))
            .with(env_filter)
            .init();
    }

    match run(cli).await {
        Ok(JobOutcome::Completed) => ExitCode::SUCCESS,
        Ok(JobOutcome::Failed { .. }) => ExitCode::from(1),
        Ok(JobOutcome::Canceled) => ExitCode::from(130),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<JobOutcome> {
    let config = ConverterConfig::from_env();
    info!("Converter config: {:?}", config);

    let mut controller = JobController::new(config, Arc::new(LogObserver::default()));
    let request = ConversionRequest::new(cli.input, cli.output, cli.format);
    let job_id = controller
        .submit(request)
        .await
        .context("Conversion rejected")?;
    info!(job_id = %job_id, "Conversion started");

    if let Some(canceller) = controller.canceller() {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!(job_id = %canceller.job_id(), "Received interrupt, canceling");
                canceller.cancel();
            }
        });
    }

    controller
        .wait()
        .await
        .context("No job was running")
}
