//! In-memory WAV encoding.

use crate::error::{Result, WorkerError};
use std::io::Cursor;

/// Encode float samples as a 16-bit PCM mono WAV file.
///
/// Samples outside [-1.0, 1.0] are clamped.
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut buffer = Cursor::new(Vec::with_capacity(44 + samples.len() * 2));
    let mut writer =
        hound::WavWriter::new(&mut buffer, spec).map_err(|e| WorkerError::TranscodingFailure {
            message: format!("Failed to create WAV writer: {}", e),
        })?;

    for &sample in samples {
        writer
            .write_sample(to_pcm16(sample))
            .map_err(|e| WorkerError::TranscodingFailure {
                message: format!("Failed to write WAV sample: {}", e),
            })?;
    }

    writer
        .finalize()
        .map_err(|e| WorkerError::TranscodingFailure {
            message: format!("Failed to finalize WAV: {}", e),
        })?;

    Ok(buffer.into_inner())
}

fn to_pcm16(sample: f32) -> i16 {
    let clamped = if sample.is_nan() {
        0.0
    } else {
        sample.clamp(-1.0, 1.0)
    };
    (clamped * f32::from(i16::MAX)) as i16
}
