//! Data types flowing through the synthesis pipeline.

use serde::{Deserialize, Serialize};

/// A token placed on the request-wide timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedToken {
    /// Trimmed, non-empty display text.
    pub text: String,
    /// Start time in seconds, rounded to milliseconds.
    #[serde(rename = "start_ts")]
    pub start_secs: f64,
    /// End time in seconds, rounded to milliseconds.
    #[serde(rename = "end_ts")]
    pub end_secs: f64,
}

impl AlignedToken {
    pub fn new(text: &str, start_secs: f64, end_secs: f64) -> Self {
        Self {
            text: text.to_string(),
            start_secs,
            end_secs,
        }
    }
}

/// The full utterance: every non-empty segment waveform, in stream order.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    /// Number of segments that contributed samples.
    pub chunks: usize,
}

impl Waveform {
    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }
}

/// Encoded audio plus the transcript, ready to be shaped into a response.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisResult {
    pub audio: Vec<u8>,
    /// `None` when no token survived stitching.
    pub tokens: Option<Vec<AlignedToken>>,
}
