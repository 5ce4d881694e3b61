//! Job input as delivered by the transport, and the validated request built from it.

use crate::defaults;
use crate::error::{Result, WorkerError};
use serde::{Deserialize, Serialize};

/// Raw job input.
///
/// Every field is optional on the wire; [`JobInput::text`] falls back to an
/// empty string (rejected by validation) and the rest fall back to the
/// protocol defaults. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mp3_bitrate: Option<i64>,
}

impl JobInput {
    /// Input with only the text set; everything else defaults.
    pub fn with_text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Default::default()
        }
    }

    pub fn voice(mut self, voice_id: &str) -> Self {
        self.voice_id = Some(voice_id.to_string());
        self
    }

    pub fn format(mut self, output_format: &str) -> Self {
        self.output_format = Some(output_format.to_string());
        self
    }

    pub fn bitrate(mut self, kbps: i64) -> Self {
        self.mp3_bitrate = Some(kbps);
        self
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    pub fn voice_id(&self) -> &str {
        self.voice_id.as_deref().unwrap_or(defaults::DEFAULT_VOICE)
    }

    pub fn output_format(&self) -> &str {
        self.output_format
            .as_deref()
            .unwrap_or(defaults::OUTPUT_FORMAT)
    }

    pub fn mp3_bitrate(&self) -> i64 {
        self.mp3_bitrate
            .unwrap_or(i64::from(defaults::DEFAULT_BITRATE_KBPS))
    }
}

/// Transport wrapper: `{"input": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobEnvelope {
    pub input: JobInput,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JobDocument {
    Envelope(JobEnvelope),
    Bare(JobInput),
}

/// Parse a job from JSON, accepting either the `{"input": ...}` envelope or a bare input object.
pub fn parse_job(json: &str) -> Result<JobInput> {
    let document: JobDocument =
        serde_json::from_str(json).map_err(|e| WorkerError::JobParse {
            message: e.to_string(),
        })?;

    Ok(match document {
        JobDocument::Envelope(envelope) => envelope.input,
        JobDocument::Bare(input) => input,
    })
}

/// A validated synthesis request.
///
/// Only [`crate::job::validate`] constructs one, so holding a value means
/// the text is non-blank, the voice is on the allow-list, the format is MP3
/// and the bitrate is positive.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    text: String,
    voice_id: String,
    bitrate_kbps: u32,
}

impl SynthesisRequest {
    pub(crate) fn new(text: String, voice_id: String, bitrate_kbps: u32) -> Self {
        Self {
            text,
            voice_id,
            bitrate_kbps,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn voice_id(&self) -> &str {
        &self.voice_id
    }

    pub fn output_format(&self) -> &'static str {
        defaults::OUTPUT_FORMAT
    }

    pub fn bitrate_kbps(&self) -> u32 {
        self.bitrate_kbps
    }
}
