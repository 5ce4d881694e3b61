//! Worker entry points.
//!
//! Wires the configured engine and transcoder into an orchestrator and
//! runs it one of three ways: a single job from a file or stdin, a socket
//! server, or a client submitting to that server.

use crate::config::Config;
use crate::error::{Result, WorkerError};
use crate::ipc::{JobServer, OrchestratorHandler, submit_job};
use crate::job::{JobEnvelope, JobOutput, parse_job};
use crate::pipeline::orchestrator::JobOrchestrator;
use crate::synthesis::ProcessEngine;
use crate::transcode::FfmpegTranscoder;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Build the orchestrator from configuration.
pub fn build_orchestrator(config: &Config) -> Result<JobOrchestrator> {
    let engine = ProcessEngine::new(&config.engine.command, &config.engine.lang_code)?;
    let transcoder = FfmpegTranscoder::system(&config.transcoder.ffmpeg);

    tracing::debug!(
        engine = engine.program(),
        lang_code = engine.lang_code(),
        transcoder = %config.transcoder.ffmpeg,
        "Orchestrator ready"
    );

    Ok(JobOrchestrator::new(Arc::new(engine), Arc::new(transcoder)))
}

/// Read a job document from `path`, or stdin when `None`.
pub fn read_job_text(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path).map_err(|e| {
            WorkerError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read job file {}: {}", path.display(), e),
            ))
        }),
        None => {
            let mut buffer = String::new();
            std::io::stdin().lock().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

/// Run one job through `orchestrator`.
///
/// Malformed job documents become error responses, like any other job error.
pub fn run_job(orchestrator: &JobOrchestrator, job_text: &str) -> JobOutput {
    match parse_job(job_text) {
        Ok(input) => orchestrator.handle(&input),
        Err(e) => {
            tracing::warn!("Rejected job: {}", e);
            JobOutput::error(&e)
        }
    }
}

/// `synth`: one job in, one JSON response on stdout.
///
/// Job failures are reported in the payload; only infrastructure failures
/// (unreadable input, unusable configuration) return `Err`.
pub async fn run_synth(config: Config, input: Option<PathBuf>) -> Result<()> {
    let job_text = read_job_text(input.as_deref())?;
    let orchestrator = build_orchestrator(&config)?;

    let output = tokio::task::spawn_blocking(move || run_job(&orchestrator, &job_text))
        .await
        .map_err(|e| WorkerError::Other(format!("Job task panicked: {}", e)))?;

    print_output(&output)
}

/// `serve`: accept jobs on a Unix socket until Ctrl-C.
pub async fn run_serve(config: Config, socket: Option<PathBuf>) -> Result<()> {
    let socket_path = socket
        .or_else(|| config.server.socket.clone())
        .unwrap_or_else(JobServer::default_socket_path);

    let orchestrator = build_orchestrator(&config)?;
    tracing::info!(
        engine = orchestrator.engine_name(),
        transcoder = orchestrator.transcoder_name(),
        "Starting job server"
    );

    let server = JobServer::new(socket_path);
    let handler = OrchestratorHandler::new(orchestrator);
    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Interrupted"),
            Err(e) => tracing::error!("Failed to listen for Ctrl-C: {}", e),
        }
    };

    server.start(handler, shutdown).await
}

/// `submit`: send one job to a running server and print its response.
pub async fn run_submit(
    config: Config,
    socket: Option<PathBuf>,
    input: Option<PathBuf>,
) -> Result<()> {
    let socket_path = socket
        .or(config.server.socket)
        .unwrap_or_else(JobServer::default_socket_path);

    let job_text = read_job_text(input.as_deref())?;
    let envelope = JobEnvelope {
        input: parse_job(&job_text)?,
    };

    let output = submit_job(&socket_path, &envelope).await?;
    print_output(&output)
}

fn print_output(output: &JobOutput) -> Result<()> {
    let json = output.to_json().map_err(|e| WorkerError::Other(e.to_string()))?;
    println!("{}", json);
    Ok(())
}
