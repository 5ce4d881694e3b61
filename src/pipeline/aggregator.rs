//! Accumulates segment waveforms into one contiguous buffer.

use crate::defaults::SAMPLE_RATE;
use crate::error::{Result, WorkerError};
use crate::pipeline::types::Waveform;
use crate::synthesis::segment::SynthesisSegment;

/// Request-scoped audio accumulator.
#[derive(Debug, Default)]
pub struct AudioAggregator {
    samples: Vec<f32>,
    chunks: usize,
}

impl AudioAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the segment's waveform if it has one. Empty chunks are ignored.
    ///
    /// Returns the number of samples appended.
    pub fn consume_segment(&mut self, segment: &SynthesisSegment) -> usize {
        match segment.waveform.as_deref() {
            Some(chunk) if !chunk.is_empty() => {
                self.samples.extend_from_slice(chunk);
                self.chunks += 1;
                chunk.len()
            }
            _ => 0,
        }
    }

    /// Whether any non-empty chunk has been seen.
    pub fn has_audio(&self) -> bool {
        self.chunks > 0
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Hand over the concatenated waveform.
    pub fn finalize(self) -> Result<Waveform> {
        if !self.has_audio() {
            return Err(WorkerError::NoAudioProduced);
        }

        Ok(Waveform {
            samples: self.samples,
            sample_rate: SAMPLE_RATE,
            chunks: self.chunks,
        })
    }
}
