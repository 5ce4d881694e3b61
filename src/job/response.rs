//! Job output: either encoded audio plus an optional transcript, or an error string.

use crate::error::{Result, WorkerError};
use crate::pipeline::types::{AlignedToken, SynthesisResult};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};

/// Response returned to the transport.
///
/// Serializes as `{"audio_base64": ..., "tokens": [...]}` on success (the
/// `tokens` key is omitted when no transcript was produced) or as
/// `{"error": ...}` on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobOutput {
    Success {
        audio_base64: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tokens: Option<Vec<AlignedToken>>,
    },
    Error {
        error: String,
    },
}

impl JobOutput {
    /// Encode a finished synthesis for the wire.
    pub fn success(result: SynthesisResult) -> Self {
        JobOutput::Success {
            audio_base64: BASE64.encode(&result.audio),
            tokens: result.tokens,
        }
    }

    pub fn error(error: &WorkerError) -> Self {
        JobOutput::Error {
            error: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, JobOutput::Success { .. })
    }

    /// Decode the audio payload, if this is a success response.
    pub fn audio_bytes(&self) -> Option<Vec<u8>> {
        match self {
            JobOutput::Success { audio_base64, .. } => BASE64.decode(audio_base64).ok(),
            JobOutput::Error { .. } => None,
        }
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl From<Result<SynthesisResult>> for JobOutput {
    fn from(result: Result<SynthesisResult>) -> Self {
        match result {
            Ok(result) => JobOutput::success(result),
            Err(e) => JobOutput::error(&e),
        }
    }
}
