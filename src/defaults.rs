//! Fixed contracts shared by the job handler, the engine bridge and the transcoder.
//!
//! These are not configuration: the engine always produces audio at
//! [`SAMPLE_RATE`], and the job protocol defaults are part of the wire format.

/// Sample rate of every waveform produced by the synthesis engine, in Hz.
///
/// The engine emits 24kHz mono float samples; nothing in the pipeline resamples.
pub const SAMPLE_RATE: u32 = 24000;

/// Voice used when a job does not name one.
pub const DEFAULT_VOICE: &str = "am_adam";

/// The only output container the transcoder produces.
pub const OUTPUT_FORMAT: &str = "mp3";

/// MP3 bitrate in kbps used when a job does not request one.
pub const DEFAULT_BITRATE_KBPS: u32 = 64;

/// Language code passed to the engine bridge ("a" = American English).
pub const DEFAULT_LANG_CODE: &str = "a";

/// Synthesis bridge executable looked up on `PATH`.
///
/// The bridge reads one JSON request per line on stdin and answers with
/// JSON-line segments on stdout.
pub const DEFAULT_ENGINE_COMMAND: &str = "kokoro-bridge";

/// Name of the ffmpeg executable looked up on `PATH`.
pub const DEFAULT_FFMPEG: &str = "ffmpeg";

/// Longest job line the socket server reads, in bytes.
pub const MAX_JOB_BYTES: u64 = 1024 * 1024;

/// Timestamps are rounded to this many decimal places (milliseconds).
pub const TIMESTAMP_DECIMALS: i32 = 3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_voice_is_in_catalog() {
        assert!(crate::voices::is_valid_voice(DEFAULT_VOICE));
    }

    #[test]
    fn default_bitrate_is_positive() {
        assert!(DEFAULT_BITRATE_KBPS > 0);
    }
}
