use crate::error::{Result, WorkerError};
use crate::synthesis::segment::SynthesisSegment;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Lazy, finite, single-use sequence of segments for one request.
pub type SegmentStream<'a> = Box<dyn Iterator<Item = Result<SynthesisSegment>> + 'a>;

/// Trait for streaming text-to-speech synthesis.
///
/// One engine is built per process and shared; callers serialize requests
/// against it.
pub trait SynthesisEngine: Send + Sync {
    /// Start synthesizing `text` with `voice`.
    ///
    /// Segments are produced on demand as the stream is pulled. An `Err`
    /// item ends the request.
    fn synthesize(&self, text: &str, voice: &str) -> Result<SegmentStream<'_>>;

    /// Name used in logs.
    fn name(&self) -> &str;
}

impl<T: SynthesisEngine> SynthesisEngine for Arc<T> {
    fn synthesize(&self, text: &str, voice: &str) -> Result<SegmentStream<'_>> {
        (**self).synthesize(text, voice)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Mock engine for testing.
///
/// Replays a fixed script of segments on every call and records what it was
/// asked to synthesize.
#[derive(Debug, Default)]
pub struct MockEngine {
    segments: Vec<SynthesisSegment>,
    fail_after: Option<usize>,
    fail_to_start: bool,
    calls: AtomicUsize,
    requests: Mutex<Vec<(String, String)>>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a segment to the script.
    pub fn with_segment(mut self, segment: SynthesisSegment) -> Self {
        self.segments.push(segment);
        self
    }

    pub fn with_segments(mut self, segments: impl IntoIterator<Item = SynthesisSegment>) -> Self {
        self.segments.extend(segments);
        self
    }

    /// Yield an error after `count` segments have been streamed.
    pub fn with_stream_failure_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }

    /// Fail before streaming anything.
    pub fn with_start_failure(mut self) -> Self {
        self.fail_to_start = true;
        self
    }

    /// Number of times `synthesize` was called.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(text, voice)` pairs in call order.
    pub fn requests(&self) -> Vec<(String, String)> {
        match self.requests.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl SynthesisEngine for MockEngine {
    fn synthesize(&self, text: &str, voice: &str) -> Result<SegmentStream<'_>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let entry = (text.to_string(), voice.to_string());
        match self.requests.lock() {
            Ok(mut guard) => guard.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }

        if self.fail_to_start {
            return Err(WorkerError::EngineStart {
                program: "mock".to_string(),
                message: "mock engine failure".to_string(),
            });
        }

        let limit = self.fail_after.unwrap_or(self.segments.len());
        let scripted = self.segments.iter().take(limit).cloned().map(Ok);
        let failure = self.fail_after.map(|_| {
            Err(WorkerError::EngineStream {
                message: "mock stream failure".to_string(),
            })
        });

        Ok(Box::new(scripted.chain(failure)))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
