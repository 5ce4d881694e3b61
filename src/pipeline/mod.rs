//! Synthesis pipeline for one job.
//!
//! A single forward pass over the engine's segment stream: each segment
//! feeds the audio aggregator and the timeline stitcher before the next one
//! is pulled, then the joined waveform goes to the transcoder.

pub mod aggregator;
pub mod orchestrator;
pub mod stitcher;
pub mod types;

pub use aggregator::AudioAggregator;
pub use orchestrator::JobOrchestrator;
pub use stitcher::TimelineStitcher;
pub use types::{AlignedToken, SynthesisResult, Waveform};
