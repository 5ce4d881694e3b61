//! IPC client for submitting jobs to a running server.

use crate::error::{Result, WorkerError};
use crate::job::{JobEnvelope, JobOutput};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

/// Submit a job to the server via Unix socket.
///
/// # Errors
/// Returns `WorkerError::IpcConnection` if connection fails
/// Returns `WorkerError::IpcProtocol` if serialization/deserialization fails
pub async fn submit_job(socket_path: &Path, job: &JobEnvelope) -> Result<JobOutput> {
    let stream =
        UnixStream::connect(socket_path)
            .await
            .map_err(|e| WorkerError::IpcConnection {
                message: format!("Failed to connect to server: {}", e),
            })?;

    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    let job_json = serde_json::to_string(job).map_err(|e| WorkerError::IpcProtocol {
        message: format!("Failed to serialize job: {}", e),
    })?;

    writer
        .write_all(job_json.as_bytes())
        .await
        .map_err(|e| WorkerError::IpcConnection {
            message: format!("Failed to write job: {}", e),
        })?;

    writer
        .write_all(b"\n")
        .await
        .map_err(|e| WorkerError::IpcConnection {
            message: format!("Failed to write newline: {}", e),
        })?;

    writer
        .flush()
        .await
        .map_err(|e| WorkerError::IpcConnection {
            message: format!("Failed to flush writer: {}", e),
        })?;

    let mut response_line = String::new();
    reader
        .read_line(&mut response_line)
        .await
        .map_err(|e| WorkerError::IpcConnection {
            message: format!("Failed to read response: {}", e),
        })?;

    let response =
        JobOutput::from_json(response_line.trim()).map_err(|e| WorkerError::IpcProtocol {
            message: format!("Failed to deserialize response: {}", e),
        })?;

    Ok(response)
}
