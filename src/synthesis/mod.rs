//! Streaming synthesis engines and the segments they produce.

pub mod engine;
pub mod process;
pub mod segment;

pub use engine::{MockEngine, SegmentStream, SynthesisEngine};
pub use process::ProcessEngine;
pub use segment::{RawToken, SynthesisSegment};
