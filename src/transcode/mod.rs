//! Waveform to compressed-audio transcoding.

pub mod ffmpeg;
pub mod wav;

pub use ffmpeg::{CommandRunner, FfmpegTranscoder, SystemCommandRunner};
pub use wav::encode_wav;

use crate::error::{Result, WorkerError};
use std::sync::{Arc, Mutex};

/// Trait for turning raw samples into a compressed container.
pub trait Transcoder: Send + Sync {
    /// Encode mono float samples at `sample_rate` into MP3 at `bitrate_kbps`.
    fn transcode(&self, samples: &[f32], sample_rate: u32, bitrate_kbps: u32) -> Result<Vec<u8>>;

    /// Name used in logs.
    fn name(&self) -> &str;
}

impl<T: Transcoder> Transcoder for Arc<T> {
    fn transcode(&self, samples: &[f32], sample_rate: u32, bitrate_kbps: u32) -> Result<Vec<u8>> {
        (**self).transcode(samples, sample_rate, bitrate_kbps)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// One call seen by [`MockTranscoder`].
#[derive(Debug, Clone, PartialEq)]
pub struct TranscodeCall {
    pub samples: usize,
    pub sample_rate: u32,
    pub bitrate_kbps: u32,
}

/// Mock transcoder for testing.
#[derive(Debug)]
pub struct MockTranscoder {
    output: Vec<u8>,
    should_fail: bool,
    calls: Mutex<Vec<TranscodeCall>>,
}

impl Default for MockTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTranscoder {
    /// Returns a small fake MP3 payload on every call.
    pub fn new() -> Self {
        Self {
            output: b"ID3mock".to_vec(),
            should_fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_output(mut self, output: &[u8]) -> Self {
        self.output = output.to_vec();
        self
    }

    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    pub fn calls(&self) -> Vec<TranscodeCall> {
        match self.calls.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Transcoder for MockTranscoder {
    fn transcode(&self, samples: &[f32], sample_rate: u32, bitrate_kbps: u32) -> Result<Vec<u8>> {
        let call = TranscodeCall {
            samples: samples.len(),
            sample_rate,
            bitrate_kbps,
        };
        match self.calls.lock() {
            Ok(mut guard) => guard.push(call),
            Err(poisoned) => poisoned.into_inner().push(call),
        }

        if self.should_fail {
            return Err(WorkerError::TranscodingFailure {
                message: "mock transcoding failure".to_string(),
            });
        }
        Ok(self.output.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_transcoder_records_calls() {
        let transcoder = MockTranscoder::new().with_output(b"abc");
        let output = transcoder.transcode(&[0.0; 5], 24000, 96).unwrap();
        assert_eq!(output, b"abc".to_vec());
        assert_eq!(
            transcoder.calls(),
            vec![TranscodeCall {
                samples: 5,
                sample_rate: 24000,
                bitrate_kbps: 96,
            }]
        );
    }

    #[test]
    fn test_mock_transcoder_failure() {
        let transcoder = MockTranscoder::new().with_failure();
        let result = transcoder.transcode(&[0.0], 24000, 64);
        assert!(matches!(
            result,
            Err(WorkerError::TranscodingFailure { message }) if message == "mock transcoding failure"
        ));
        assert_eq!(transcoder.calls().len(), 1);
    }

    #[test]
    fn test_transcoder_trait_is_object_safe() {
        let transcoder: Box<dyn Transcoder> = Box::new(MockTranscoder::new());
        assert_eq!(transcoder.name(), "mock");
        assert!(transcoder.transcode(&[0.1], 24000, 64).is_ok());
    }

    #[test]
    fn test_arc_transcoder_delegates() {
        let inner = Arc::new(MockTranscoder::new());
        let shared = Arc::clone(&inner);
        assert!(shared.transcode(&[0.1, 0.2], 24000, 64).is_ok());
        assert_eq!(inner.calls().len(), 1);
    }
}
