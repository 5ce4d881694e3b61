//! Error types for tts-worker.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkerError {
    // Job validation errors
    #[error("No text provided")]
    InvalidInput,

    #[error("Invalid mp3_bitrate {bitrate}. Must be a positive integer.")]
    InvalidBitrate { bitrate: i64 },

    #[error("Invalid voice_id '{voice}'. Valid: {valid}")]
    InvalidVoice { voice: String, valid: String },

    #[error("Unsupported output_format '{format}'. Only 'mp3' is supported.")]
    UnsupportedFormat { format: String },

    // Synthesis errors
    #[error("Failed to start synthesis engine {program}: {message}")]
    EngineStart { program: String, message: String },

    #[error("Synthesis failed: {message}")]
    EngineStream { message: String },

    #[error("No audio generated")]
    NoAudioProduced,

    // Transcoding errors
    #[error("Transcoder not found: {tool}")]
    TranscoderNotFound { tool: String },

    #[error("Transcoding failed: {message}")]
    TranscodingFailure { message: String },

    // Job protocol errors
    #[error("Invalid job: {message}")]
    JobParse { message: String },

    // IPC errors
    #[error("IPC socket error: {message}")]
    IpcSocket { message: String },

    #[error("IPC protocol error: {message}")]
    IpcProtocol { message: String },

    #[error("IPC connection failed: {message}")]
    IpcConnection { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

impl WorkerError {
    /// Whether the error was caused by the job's own fields.
    ///
    /// Validation errors are raised before the engine is touched.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            WorkerError::InvalidInput
                | WorkerError::InvalidBitrate { .. }
                | WorkerError::InvalidVoice { .. }
                | WorkerError::UnsupportedFormat { .. }
        )
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, WorkerError>;
