//! Job handler that runs the orchestrator on the blocking pool.

use crate::ipc::server::JobHandler;
use crate::job::{JobInput, JobOutput};
use crate::pipeline::orchestrator::JobOrchestrator;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Runs jobs one at a time against a shared orchestrator.
///
/// Connections are accepted concurrently, but the engine is driven by a
/// single job at a time; later jobs wait on the lock in arrival order.
pub struct OrchestratorHandler {
    orchestrator: Arc<JobOrchestrator>,
    lock: Mutex<()>,
}

impl OrchestratorHandler {
    pub fn new(orchestrator: JobOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            lock: Mutex::new(()),
        }
    }
}

#[async_trait::async_trait]
impl JobHandler for OrchestratorHandler {
    async fn handle(&self, job: JobInput) -> JobOutput {
        let _guard = self.lock.lock().await;
        let orchestrator = Arc::clone(&self.orchestrator);

        // Synthesis and transcoding block on child processes.
        tokio::task::spawn_blocking(move || orchestrator.handle(&job))
            .await
            .unwrap_or_else(|e| {
                tracing::error!("Job task panicked: {}", e);
                JobOutput::Error {
                    error: format!("Job task panicked: {}", e),
                }
            })
    }
}
