//! tts-worker - Text-to-speech job worker
//!
//! Turns a text job into MP3 audio plus a word-level transcript whose
//! timestamps run on one clock across every streamed engine segment.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

#[cfg(feature = "cli")]
pub mod app;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod ipc;
pub mod job;
pub mod logging;
pub mod pipeline;
pub mod synthesis;
pub mod transcode;
pub mod voices;

// Core traits (engine → pipeline → transcoder)
pub use synthesis::{MockEngine, ProcessEngine, SynthesisEngine};
pub use transcode::{FfmpegTranscoder, MockTranscoder, Transcoder};

// Pipeline
pub use pipeline::{AlignedToken, AudioAggregator, JobOrchestrator, TimelineStitcher};

// Job protocol
pub use job::{JobEnvelope, JobInput, JobOutput, SynthesisRequest, validate};

// Error handling
pub use error::{Result, WorkerError};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.0.1+abc1234"` when git hash is available, `"0.0.1"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
