//! MP3 transcoding through an external ffmpeg process.
//!
//! The `CommandRunner` trait keeps process execution swappable so the
//! transcoder can be tested without ffmpeg installed.

use crate::defaults;
use crate::error::{Result, WorkerError};
use crate::transcode::Transcoder;
use crate::transcode::wav::encode_wav;
use std::io::Write;
use std::process::{Command, Stdio};

/// Runs a program with the given stdin and returns its stdout.
pub trait CommandRunner: Send + Sync {
    /// Execute `program` with `args`, feeding `input` on stdin.
    ///
    /// Returns `TranscoderNotFound` if the program does not exist and
    /// `TranscodingFailure` if it exits unsuccessfully.
    fn run(&self, program: &str, args: &[String], input: &[u8]) -> Result<Vec<u8>>;
}

/// Production runner using std::process::Command.
#[derive(Debug, Clone, Default)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[String], input: &[u8]) -> Result<Vec<u8>> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    WorkerError::TranscoderNotFound {
                        tool: program.to_string(),
                    }
                } else {
                    WorkerError::TranscodingFailure {
                        message: format!("Failed to execute {}: {}", program, e),
                    }
                }
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| WorkerError::TranscodingFailure {
            message: format!("{} stdin was not captured", program),
        })?;

        // stdin is written from a scoped thread while wait_with_output drains
        // stdout and stderr, so large inputs cannot fill both pipes at once.
        let (write_result, output) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || stdin.write_all(input));
            let output = child.wait_with_output();
            let write_result = writer
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")));
            (write_result, output)
        });

        let output = output.map_err(|e| WorkerError::TranscodingFailure {
            message: format!("Failed to wait for {}: {}", program, e),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(WorkerError::TranscodingFailure {
                message: format!(
                    "{} failed with status {}: {}",
                    program,
                    output.status,
                    stderr.trim()
                ),
            });
        }

        if let Err(e) = write_result {
            return Err(WorkerError::TranscodingFailure {
                message: format!("Failed to write to {}: {}", program, e),
            });
        }

        Ok(output.stdout)
    }
}

/// Transcoder that pipes a WAV rendition of the waveform through ffmpeg.
pub struct FfmpegTranscoder<R: CommandRunner> {
    program: String,
    runner: R,
}

impl<R: CommandRunner> FfmpegTranscoder<R> {
    pub fn new(program: &str, runner: R) -> Self {
        Self {
            program: program.to_string(),
            runner,
        }
    }

    /// Arguments for a WAV-on-stdin, MP3-on-stdout conversion.
    pub fn mp3_args(bitrate_kbps: u32) -> Vec<String> {
        let bitrate = format!("{}k", bitrate_kbps);
        [
            "-hide_banner",
            "-loglevel",
            "error",
            "-f",
            "wav",
            "-i",
            "pipe:0",
            "-codec:a",
            "libmp3lame",
            "-b:a",
            bitrate.as_str(),
            "-f",
            defaults::OUTPUT_FORMAT,
            "pipe:1",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }
}

impl FfmpegTranscoder<SystemCommandRunner> {
    /// Create a transcoder running the real `program`.
    pub fn system(program: &str) -> Self {
        Self::new(program, SystemCommandRunner::new())
    }
}

impl<R: CommandRunner> Transcoder for FfmpegTranscoder<R> {
    fn transcode(&self, samples: &[f32], sample_rate: u32, bitrate_kbps: u32) -> Result<Vec<u8>> {
        let wav = encode_wav(samples, sample_rate)?;
        let args = Self::mp3_args(bitrate_kbps);

        tracing::debug!(
            program = %self.program,
            wav_bytes = wav.len(),
            bitrate_kbps,
            "Transcoding to MP3"
        );

        let mp3 = self.runner.run(&self.program, &args, &wav)?;
        if mp3.is_empty() {
            return Err(WorkerError::TranscodingFailure {
                message: format!("{} produced no output", self.program),
            });
        }

        Ok(mp3)
    }

    fn name(&self) -> &str {
        &self.program
    }
}
