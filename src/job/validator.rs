//! Voice and format validation.
//!
//! Pure and total: no side effects, every input maps to a request or an error.

use crate::defaults::OUTPUT_FORMAT;
use crate::error::{Result, WorkerError};
use crate::job::request::{JobInput, SynthesisRequest};
use crate::voices;

/// Check a job against the allow-list and the supported format.
///
/// Checks run in a fixed order (text, voice, format, bitrate) and the first
/// failure wins.
pub fn validate(input: &JobInput) -> Result<SynthesisRequest> {
    let text = input.text();
    if text.trim().is_empty() {
        return Err(WorkerError::InvalidInput);
    }

    let voice = input.voice_id();
    if !voices::is_valid_voice(voice) {
        return Err(WorkerError::InvalidVoice {
            voice: voice.to_string(),
            valid: voices::allow_list(),
        });
    }

    let format = input.output_format();
    if format != OUTPUT_FORMAT {
        return Err(WorkerError::UnsupportedFormat {
            format: format.to_string(),
        });
    }

    let bitrate = input.mp3_bitrate();
    let bitrate_kbps = u32::try_from(bitrate)
        .ok()
        .filter(|&kbps| kbps > 0)
        .ok_or(WorkerError::InvalidBitrate { bitrate })?;

    Ok(SynthesisRequest::new(
        text.to_string(),
        voice.to_string(),
        bitrate_kbps,
    ))
}
