//! Unix socket transport for jobs.

pub mod client;
pub mod handler;
pub mod server;

pub use client::submit_job;
pub use handler::OrchestratorHandler;
pub use server::{JobHandler, JobServer};
