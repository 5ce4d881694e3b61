//! Job orchestration: validate, stream, stitch, transcode, encode.
//!
//! ```text
//! JobInput ─▶ validate ─▶ engine.synthesize ─┬─▶ AudioAggregator ─▶ Transcoder ─▶ JobOutput
//!                                            └─▶ TimelineStitcher ──────────────▶
//! ```
//!
//! Each segment is fed to both accumulators before the next one is pulled.

use crate::error::Result;
use crate::job::{JobInput, JobOutput, SynthesisRequest, validate};
use crate::pipeline::aggregator::AudioAggregator;
use crate::pipeline::stitcher::TimelineStitcher;
use crate::pipeline::types::SynthesisResult;
use crate::synthesis::SynthesisEngine;
use crate::transcode::Transcoder;
use std::sync::Arc;

/// Runs jobs against a shared engine and transcoder.
///
/// Holds no per-request state; every call builds its own stitcher and
/// aggregator. Callers must not run two jobs against the same engine at
/// once.
#[derive(Clone)]
pub struct JobOrchestrator {
    engine: Arc<dyn SynthesisEngine>,
    transcoder: Arc<dyn Transcoder>,
}

impl JobOrchestrator {
    pub fn new(engine: Arc<dyn SynthesisEngine>, transcoder: Arc<dyn Transcoder>) -> Self {
        Self { engine, transcoder }
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    pub fn transcoder_name(&self) -> &str {
        self.transcoder.name()
    }

    /// Handle one raw job. Never fails: errors become `{"error": ...}`.
    pub fn handle(&self, input: &JobInput) -> JobOutput {
        let result = validate(input).and_then(|request| self.synthesize(&request));
        if let Err(e) = &result {
            if e.is_validation() {
                tracing::warn!("Rejected job: {}", e);
            } else {
                tracing::error!("Job failed: {}", e);
            }
        }
        JobOutput::from(result)
    }

    /// Run a validated request through the engine and the transcoder.
    pub fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesisResult> {
        tracing::info!(
            voice = request.voice_id(),
            bitrate_kbps = request.bitrate_kbps(),
            text_len = request.text().chars().count(),
            "Generating TTS"
        );

        let mut stitcher = TimelineStitcher::new();
        let mut aggregator = AudioAggregator::new();
        let mut segments = 0usize;

        for segment in self.engine.synthesize(request.text(), request.voice_id())? {
            let segment = segment?;
            segments += 1;
            let samples = aggregator.consume_segment(&segment);
            let emitted = stitcher.consume_segment(&segment).len();
            tracing::debug!(segment = segments, samples, tokens = emitted, "Segment received");
        }

        let waveform = aggregator.finalize()?;
        tracing::debug!(
            segments,
            chunks = waveform.chunks,
            samples = waveform.samples.len(),
            duration_secs = waveform.duration_secs(),
            dropped_tokens = stitcher.dropped(),
            "Stream consumed"
        );

        let audio = self.transcoder.transcode(
            &waveform.samples,
            waveform.sample_rate,
            request.bitrate_kbps(),
        )?;

        let tokens = stitcher.into_tokens();
        tracing::info!(
            audio_bytes = audio.len(),
            tokens = tokens.len(),
            "Generated MP3"
        );

        Ok(SynthesisResult {
            audio,
            tokens: (!tokens.is_empty()).then_some(tokens),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorkerError;
    use crate::pipeline::types::AlignedToken;
    use crate::synthesis::{MockEngine, RawToken, SynthesisSegment};
    use crate::transcode::MockTranscoder;

    fn orchestrator(engine: MockEngine) -> (JobOrchestrator, Arc<MockEngine>, Arc<MockTranscoder>) {
        let engine = Arc::new(engine);
        let transcoder = Arc::new(MockTranscoder::new());
        let orchestrator = JobOrchestrator::new(engine.clone(), transcoder.clone());
        (orchestrator, engine, transcoder)
    }

    fn request(text: &str) -> SynthesisRequest {
        validate(&JobInput::with_text(text)).unwrap()
    }

    #[test]
    fn test_two_segments_stitched_and_concatenated() {
        let (orchestrator, _, transcoder) = orchestrator(MockEngine::new().with_segments(vec![
            SynthesisSegment::new(vec![0.1; 100], vec![RawToken::timed("Hello", 0.0, 0.4)]),
            SynthesisSegment::new(vec![0.2; 100], vec![RawToken::timed("world", 0.0, 0.3)]),
        ]));

        let result = orchestrator.synthesize(&request("Hello world")).unwrap();

        assert_eq!(result.audio, b"ID3mock".to_vec());
        assert_eq!(
            result.tokens,
            Some(vec![
                AlignedToken::new("Hello", 0.0, 0.4),
                AlignedToken::new("world", 0.4, 0.7),
            ])
        );
        let calls = transcoder.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].samples, 200);
        assert_eq!(calls[0].sample_rate, 24000);
        assert_eq!(calls[0].bitrate_kbps, 64);
    }

    #[test]
    fn test_no_tokens_means_none() {
        let (orchestrator, _, _) = orchestrator(
            MockEngine::new().with_segment(SynthesisSegment::audio_only(vec![0.0; 50])),
        );
        let result = orchestrator.synthesize(&request("hi")).unwrap();
        assert_eq!(result.tokens, None);
    }

    #[test]
    fn test_no_segments_is_no_audio() {
        let (orchestrator, _, transcoder) = orchestrator(MockEngine::new());
        let result = orchestrator.synthesize(&request("hi"));
        assert!(matches!(result, Err(WorkerError::NoAudioProduced)));
        assert!(transcoder.calls().is_empty());
    }

    #[test]
    fn test_tokens_without_audio_is_no_audio() {
        let (orchestrator, _, _) = orchestrator(MockEngine::new().with_segment(
            SynthesisSegment::tokens_only(vec![RawToken::timed("lost", 0.0, 0.2)]),
        ));
        assert!(matches!(
            orchestrator.synthesize(&request("hi")),
            Err(WorkerError::NoAudioProduced)
        ));
    }

    #[test]
    fn test_engine_receives_text_and_voice() {
        let (orchestrator, engine, _) = orchestrator(
            MockEngine::new().with_segment(SynthesisSegment::audio_only(vec![0.0; 10])),
        );
        let input = JobInput::with_text("Good morning").voice("af_nova");
        assert!(orchestrator.handle(&input).is_success());
        assert_eq!(
            engine.requests(),
            vec![("Good morning".to_string(), "af_nova".to_string())]
        );
    }

    #[test]
    fn test_validation_failure_skips_engine() {
        let (orchestrator, engine, _) = orchestrator(MockEngine::new());
        let output = orchestrator.handle(&JobInput::with_text(""));
        assert_eq!(
            output,
            JobOutput::Error {
                error: "No text provided".to_string()
            }
        );
        assert_eq!(engine.call_count(), 0);
    }

    #[test]
    fn test_stream_failure_is_fatal() {
        let (orchestrator, _, transcoder) = orchestrator(
            MockEngine::new()
                .with_segment(SynthesisSegment::audio_only(vec![0.0; 10]))
                .with_stream_failure_after(1),
        );
        let output = orchestrator.handle(&JobInput::with_text("hi"));
        assert_eq!(
            output,
            JobOutput::Error {
                error: "Synthesis failed: mock stream failure".to_string()
            }
        );
        assert!(transcoder.calls().is_empty());
    }

    #[test]
    fn test_transcoding_failure_is_error_response() {
        let engine =
            Arc::new(MockEngine::new().with_segment(SynthesisSegment::audio_only(vec![0.0; 10])));
        let orchestrator =
            JobOrchestrator::new(engine, Arc::new(MockTranscoder::new().with_failure()));
        let output = orchestrator.handle(&JobInput::with_text("hi"));
        assert_eq!(
            output,
            JobOutput::Error {
                error: "Transcoding failed: mock transcoding failure".to_string()
            }
        );
    }

    #[test]
    fn test_custom_bitrate_reaches_transcoder() {
        let (orchestrator, _, transcoder) = orchestrator(
            MockEngine::new().with_segment(SynthesisSegment::audio_only(vec![0.0; 10])),
        );
        assert!(orchestrator.handle(&JobInput::with_text("hi").bitrate(128)).is_success());
        assert_eq!(transcoder.calls()[0].bitrate_kbps, 128);
    }

    #[test]
    fn test_requests_do_not_share_clock() {
        let (orchestrator, _, _) = orchestrator(MockEngine::new().with_segment(
            SynthesisSegment::new(vec![0.0; 10], vec![RawToken::timed("a", 0.0, 1.0)]),
        ));
        let first = orchestrator.synthesize(&request("a")).unwrap();
        let second = orchestrator.synthesize(&request("a")).unwrap();
        assert_eq!(first.tokens, second.tokens);
    }

    #[test]
    fn test_names_exposed() {
        let (orchestrator, _, _) = orchestrator(MockEngine::new());
        assert_eq!(orchestrator.engine_name(), "mock");
        assert_eq!(orchestrator.transcoder_name(), "mock");
    }
}
