//! Async Unix socket server accepting one job per connection.

use crate::defaults::MAX_JOB_BYTES;
use crate::error::{Result, WorkerError};
use crate::job::{JobInput, JobOutput, parse_job};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};

/// Handler trait for processing submitted jobs.
#[async_trait::async_trait]
pub trait JobHandler: Send + Sync {
    /// Handle a job and return its response.
    async fn handle(&self, job: JobInput) -> JobOutput;
}

/// Job server: each connection sends one JSON job line and gets one JSON
/// response line back.
pub struct JobServer {
    socket_path: PathBuf,
    max_job_bytes: u64,
}

impl JobServer {
    pub fn new(socket_path: PathBuf) -> Self {
        Self {
            socket_path,
            max_job_bytes: MAX_JOB_BYTES,
        }
    }

    /// Override the request line size limit.
    pub fn with_max_job_bytes(mut self, max_job_bytes: u64) -> Self {
        self.max_job_bytes = max_job_bytes;
        self
    }

    /// Get the socket path this server is using.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Get the default socket path based on XDG_RUNTIME_DIR or fallback.
    pub fn default_socket_path() -> PathBuf {
        if let Ok(xdg_runtime) = std::env::var("XDG_RUNTIME_DIR")
            && !xdg_runtime.is_empty()
        {
            PathBuf::from(xdg_runtime).join("tts-worker.sock")
        } else {
            let uid = unsafe { libc::getuid() };
            PathBuf::from(format!("/tmp/tts-worker-{}.sock", uid))
        }
    }

    /// Bind the socket and serve jobs until `shutdown` resolves.
    ///
    /// The socket file is removed on shutdown. Connections already accepted
    /// keep running on their own tasks.
    pub async fn start<H, F>(&self, handler: H, shutdown: F) -> Result<()>
    where
        H: JobHandler + 'static,
        F: Future<Output = ()>,
    {
        // Clean up any existing socket file
        self.remove_socket()?;

        let listener =
            UnixListener::bind(&self.socket_path).map_err(|e| WorkerError::IpcSocket {
                message: format!("Failed to bind to socket: {}", e),
            })?;

        tracing::info!(socket = %self.socket_path.display(), "Job server listening");

        let handler = Arc::new(handler);
        let max_job_bytes = self.max_job_bytes;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Job server shutting down");
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, _)) => {
                        let handler = Arc::clone(&handler);
                        tokio::spawn(async move {
                            if let Err(e) = handle_client(stream, handler, max_job_bytes).await {
                                tracing::warn!("Error handling client: {}", e);
                            }
                        });
                    }
                    Err(e) => {
                        return Err(WorkerError::IpcConnection {
                            message: format!("Failed to accept connection: {}", e),
                        });
                    }
                },
            }
        }

        drop(listener);
        self.remove_socket()
    }

    fn remove_socket(&self) -> Result<()> {
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path).map_err(|e| WorkerError::IpcSocket {
                message: format!("Failed to remove socket file: {}", e),
            })?;
        }
        Ok(())
    }
}

/// Handle a single client connection.
async fn handle_client<H>(stream: UnixStream, handler: Arc<H>, max_job_bytes: u64) -> Result<()>
where
    H: JobHandler,
{
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader.take(max_job_bytes));
    let mut line = String::new();

    let read = reader
        .read_line(&mut line)
        .await
        .map_err(|e| WorkerError::IpcConnection {
            message: format!("Failed to read from client: {}", e),
        })?;

    // A malformed job still gets a response so the client is not left waiting.
    let parsed = if read as u64 >= max_job_bytes && !line.ends_with('\n') {
        Err(WorkerError::JobParse {
            message: format!("request exceeds {} bytes", max_job_bytes),
        })
    } else {
        parse_job(line.trim())
    };

    let response = match parsed {
        Ok(job) => handler.handle(job).await,
        Err(e) => {
            tracing::warn!("Rejected job: {}", e);
            JobOutput::error(&e)
        }
    };

    let response_json = response.to_json().map_err(|e| WorkerError::IpcProtocol {
        message: format!("Failed to serialize response: {}", e),
    })?;

    writer
        .write_all(response_json.as_bytes())
        .await
        .map_err(|e| WorkerError::IpcConnection {
            message: format!("Failed to write to client: {}", e),
        })?;

    writer
        .write_all(b"\n")
        .await
        .map_err(|e| WorkerError::IpcConnection {
            message: format!("Failed to write newline to client: {}", e),
        })?;

    writer
        .flush()
        .await
        .map_err(|e| WorkerError::IpcConnection {
            message: format!("Failed to flush writer: {}", e),
        })?;

    Ok(())
}
