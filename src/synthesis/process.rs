//! Synthesis engine backed by a long-lived bridge process.
//!
//! The bridge is started once as `<command> --lang <code>` and keeps its
//! model loaded between jobs. Each job is one request line on its stdin:
//!
//! ```text
//! {"text": "Hello world", "voice": "am_adam"}
//! ```
//!
//! and the bridge answers with one JSON segment per line on stdout, closed
//! by an end marker:
//!
//! ```text
//! {"audio": [0.01, -0.02, ...], "tokens": [{"text": "Hello", "start_ts": 0.0, "end_ts": 0.4}]}
//! {"done": true}
//! ```
//!
//! A line `{"error": "..."}` ends the job with that message and leaves the
//! bridge running. Segment keys may be `null` or missing; blank lines are
//! ignored. A bridge that exits, writes garbage or is abandoned mid-job is
//! killed and started again on the next job.

use crate::error::{Result, WorkerError};
use crate::synthesis::engine::{SegmentStream, SynthesisEngine};
use crate::synthesis::segment::SynthesisSegment;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Lines, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Engine that drives one `<program> <args...> --lang <code>` process.
///
/// The process is spawned lazily on the first job. Jobs hold the bridge
/// for as long as their segment stream lives, so they run one at a time.
#[derive(Debug)]
pub struct ProcessEngine {
    program: String,
    args: Vec<String>,
    lang_code: String,
    bridge: Mutex<Option<Bridge>>,
    spawns: AtomicUsize,
}

impl ProcessEngine {
    /// Build from a command line (program first).
    pub fn new(command: &[String], lang_code: &str) -> Result<Self> {
        let (program, args) = command.split_first().ok_or_else(|| WorkerError::EngineStart {
            program: String::new(),
            message: "no engine command configured".to_string(),
        })?;

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            lang_code: lang_code.to_string(),
            bridge: Mutex::new(None),
            spawns: AtomicUsize::new(0),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn lang_code(&self) -> &str {
        &self.lang_code
    }

    /// Number of bridge processes started so far.
    pub fn spawn_count(&self) -> usize {
        self.spawns.load(Ordering::SeqCst)
    }

    fn spawn(&self) -> Result<Bridge> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .args(["--lang", &self.lang_code])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| WorkerError::EngineStart {
                program: self.program.clone(),
                message: e.to_string(),
            })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            kill_quietly(&mut child);
            return Err(WorkerError::EngineStart {
                program: self.program.clone(),
                message: "engine stdio was not captured".to_string(),
            });
        };

        let spawns = self.spawns.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(
            program = %self.program,
            pid = child.id(),
            spawns,
            "Engine process started"
        );

        Ok(Bridge {
            child,
            stdin,
            lines: BufReader::new(stdout).lines(),
        })
    }
}

impl SynthesisEngine for ProcessEngine {
    fn synthesize(&self, text: &str, voice: &str) -> Result<SegmentStream<'_>> {
        let mut slot = self.bridge.lock().unwrap_or_else(PoisonError::into_inner);

        let mut bridge = match slot.take() {
            Some(mut bridge) => {
                if bridge.is_alive() {
                    bridge
                } else {
                    tracing::warn!(program = %self.program, "Engine process exited, restarting");
                    drop(bridge);
                    self.spawn()?
                }
            }
            None => self.spawn()?,
        };

        bridge
            .send(&BridgeRequest { text, voice })
            .map_err(|e| WorkerError::EngineStream {
                message: format!("failed to send request to engine: {}", e),
            })?;

        tracing::debug!(program = %self.program, voice, "Request sent to engine");
        *slot = Some(bridge);

        Ok(Box::new(BridgeSegments {
            slot,
            finished: false,
        }))
    }

    fn name(&self) -> &str {
        &self.program
    }
}

#[derive(Serialize)]
struct BridgeRequest<'a> {
    text: &'a str,
    voice: &'a str,
}

/// One stdout line from the bridge.
#[derive(Deserialize)]
#[serde(untagged)]
enum BridgeLine {
    Done { done: bool },
    Failed { error: String },
    Segment(SynthesisSegment),
}

/// A running bridge process. Dropping it kills the process.
#[derive(Debug)]
struct Bridge {
    child: Child,
    stdin: ChildStdin,
    lines: Lines<BufReader<ChildStdout>>,
}

impl Bridge {
    fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    fn send(&mut self, request: &BridgeRequest<'_>) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.stdin, request).map_err(std::io::Error::from)?;
        self.stdin.write_all(b"\n")?;
        self.stdin.flush()
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        kill_quietly(&mut self.child);
    }
}

/// Segments of one job, read lazily while holding the bridge.
struct BridgeSegments<'a> {
    slot: MutexGuard<'a, Option<Bridge>>,
    finished: bool,
}

impl BridgeSegments<'_> {
    /// End the job and discard the bridge; the next job starts a fresh one.
    fn fail(&mut self, message: String) -> Option<Result<SynthesisSegment>> {
        self.finished = true;
        *self.slot = None;
        Some(Err(WorkerError::EngineStream { message }))
    }

    fn exit_message(&mut self) -> String {
        match self.slot.as_mut().map(|bridge| bridge.child.wait()) {
            Some(Ok(status)) => format!("engine exited with {}", status),
            Some(Err(e)) => format!("failed to wait for engine: {}", e),
            None => "engine is not running".to_string(),
        }
    }
}

impl Iterator for BridgeSegments<'_> {
    type Item = Result<SynthesisSegment>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            let line = self.slot.as_mut().and_then(|bridge| bridge.lines.next());
            match line {
                Some(Ok(line)) if line.trim().is_empty() => continue,
                Some(Ok(line)) => {
                    return match serde_json::from_str::<BridgeLine>(&line) {
                        Ok(BridgeLine::Segment(segment)) => Some(Ok(segment)),
                        Ok(BridgeLine::Done { done: true }) => {
                            self.finished = true;
                            None
                        }
                        Ok(BridgeLine::Done { done: false }) => continue,
                        Ok(BridgeLine::Failed { error }) => {
                            self.finished = true;
                            Some(Err(WorkerError::EngineStream { message: error }))
                        }
                        Err(e) => self.fail(format!("malformed segment from engine: {}", e)),
                    };
                }
                Some(Err(e)) => return self.fail(format!("failed to read engine output: {}", e)),
                None => {
                    let message = self.exit_message();
                    return self.fail(message);
                }
            }
        }
    }
}

impl Drop for BridgeSegments<'_> {
    fn drop(&mut self) {
        if !self.finished {
            // Unread output would leak into the next job.
            tracing::debug!("Job abandoned mid-stream, discarding engine process");
            *self.slot = None;
        }
    }
}

fn kill_quietly(child: &mut Child) {
    if let Err(e) = child.kill() {
        tracing::trace!("Engine process already gone: {}", e);
    }
    if let Err(e) = child.wait() {
        tracing::debug!("Failed to reap engine process: {}", e);
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    // sh -c assigns the trailing `--lang a` to $0 and $1.
    fn shell_engine(script: &str) -> ProcessEngine {
        let command = vec!["sh".to_string(), "-c".to_string(), script.to_string()];
        ProcessEngine::new(&command, "a").unwrap()
    }

    fn collect(engine: &ProcessEngine, text: &str) -> Result<Vec<SynthesisSegment>> {
        engine.synthesize(text, "am_adam")?.collect()
    }

    #[test]
    fn test_empty_command_rejected() {
        let result = ProcessEngine::new(&[], "a");
        assert!(matches!(result, Err(WorkerError::EngineStart { .. })));
    }

    #[test]
    fn test_engine_name_is_program() {
        let engine = shell_engine("true");
        assert_eq!(engine.name(), "sh");
        assert_eq!(engine.program(), "sh");
        assert_eq!(engine.lang_code(), "a");
        assert_eq!(engine.spawn_count(), 0);
    }

    #[test]
    fn test_missing_program_is_start_error() {
        let command = vec!["/nonexistent/tts-bridge".to_string()];
        let engine = ProcessEngine::new(&command, "a").unwrap();
        match engine.synthesize("hi", "am_adam") {
            Err(WorkerError::EngineStart { program, .. }) => {
                assert_eq!(program, "/nonexistent/tts-bridge");
            }
            Err(other) => panic!("Expected EngineStart, got {:?}", other),
            Ok(_) => panic!("Expected EngineStart, got a stream"),
        }
    }

    #[test]
    fn test_reads_segments_until_done() {
        let engine = shell_engine(
            r#"while IFS= read -r line; do
printf '%s\n' '{"audio": [0.1, 0.2], "tokens": [{"text": "Hi", "start_ts": 0.0, "end_ts": 0.2}]}'
printf '\n'
printf '%s\n' '{"audio": null, "tokens": null}'
printf '%s\n' '{"done": true}'
done"#,
        );

        let segments = collect(&engine, "Hi").unwrap();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].waveform, Some(vec![0.1, 0.2]));
        assert_eq!(segments[0].tokens.as_ref().map(Vec::len), Some(1));
        assert_eq!(segments[1], SynthesisSegment::default());
    }

    #[test]
    fn test_request_and_lang_reach_the_bridge() {
        // The request object comes back as a token record.
        let engine = shell_engine(
            r#"while IFS= read -r line; do
printf '{"tokens": [%s, {"text": "%s"}]}\n' "$line" "$1"
printf '{"done": true}\n'
done"#,
        );

        let segments: Vec<_> = engine
            .synthesize("hello", "af_sky")
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        let tokens = segments[0].tokens.clone().unwrap();
        assert_eq!(tokens[0].text.as_deref(), Some("hello"));
        let request: serde_json::Value =
            serde_json::from_str(tokens[0].repr.as_deref().unwrap()).unwrap();
        assert_eq!(request, serde_json::json!({"text": "hello", "voice": "af_sky"}));
        assert_eq!(tokens[1].text.as_deref(), Some("a"));
    }

    #[test]
    fn test_one_process_serves_sequential_jobs() {
        let engine = shell_engine(
            r#"n=0
while IFS= read -r line; do
n=$((n+1))
printf '{"audio": [%s]}\n' "$n"
printf '{"done": true}\n'
done"#,
        );

        let first = collect(&engine, "one").unwrap();
        let second = collect(&engine, "two").unwrap();

        assert_eq!(first[0].waveform, Some(vec![1.0]));
        assert_eq!(second[0].waveform, Some(vec![2.0]));
        assert_eq!(engine.spawn_count(), 1);
    }

    #[test]
    fn test_error_line_ends_job_and_keeps_process() {
        let engine = shell_engine(
            r#"while IFS= read -r line; do
case "$line" in
*unspeakable*) printf '{"error": "no phonemes for input"}\n' ;;
*) printf '{"audio": [0.5]}\n{"done": true}\n' ;;
esac
done"#,
        );

        match collect(&engine, "unspeakable") {
            Err(WorkerError::EngineStream { message }) => {
                assert_eq!(message, "no phonemes for input");
            }
            other => panic!("Expected EngineStream, got {:?}", other),
        }
        assert_eq!(collect(&engine, "fine").unwrap().len(), 1);
        assert_eq!(engine.spawn_count(), 1);
    }

    #[test]
    fn test_malformed_line_restarts_process() {
        let engine = shell_engine(
            r#"while IFS= read -r line; do
case "$line" in
*boom*) echo not-json ;;
*) printf '{"audio": [0.5]}\n{"done": true}\n' ;;
esac
done"#,
        );

        let mut stream = engine.synthesize("boom", "am_adam").unwrap();
        assert!(matches!(
            stream.next(),
            Some(Err(WorkerError::EngineStream { .. }))
        ));
        assert!(stream.next().is_none());
        drop(stream);

        assert_eq!(collect(&engine, "fine").unwrap().len(), 1);
        assert_eq!(engine.spawn_count(), 2);
    }

    #[test]
    fn test_exit_mid_job_is_stream_error() {
        let engine = shell_engine(r#"read -r line; printf '{"audio": [0.5]}\n'; exit 3"#);
        let items: Vec<_> = engine.synthesize("hi", "am_adam").unwrap().collect();

        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        match &items[1] {
            Err(WorkerError::EngineStream { message }) => {
                assert!(message.contains("exited"), "{}", message);
            }
            other => panic!("Expected EngineStream, got {:?}", other),
        }
    }

    #[test]
    fn test_abandoned_job_restarts_process() {
        let engine = shell_engine(
            r#"while IFS= read -r line; do
case "$line" in
*flood*) while true; do echo '{"audio": [0.0]}'; done ;;
*) printf '{"audio": [0.5]}\n{"done": true}\n' ;;
esac
done"#,
        );

        let mut stream = engine.synthesize("flood", "am_adam").unwrap();
        assert!(matches!(stream.next(), Some(Ok(_))));
        drop(stream);

        let segments = collect(&engine, "fine").unwrap();
        assert_eq!(segments, vec![SynthesisSegment::audio_only(vec![0.5])]);
        assert_eq!(engine.spawn_count(), 2);
    }
}
