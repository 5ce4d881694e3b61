use crate::defaults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub transcoder: TranscoderConfig,
    pub server: ServerConfig,
}

/// Synthesis bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Program and leading arguments; `--lang` is appended.
    pub command: Vec<String>,
    pub lang_code: String,
}

/// MP3 transcoder configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TranscoderConfig {
    pub ffmpeg: String,
}

/// Job server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ServerConfig {
    pub socket: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command: vec![defaults::DEFAULT_ENGINE_COMMAND.to_string()],
            lang_code: defaults::DEFAULT_LANG_CODE.to_string(),
        }
    }
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg: defaults::DEFAULT_FFMPEG.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Invalid TOML and unreadable files are errors.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e)
                if e.downcast_ref::<std::io::Error>()
                    .is_some_and(|io_err| io_err.kind() == std::io::ErrorKind::NotFound) =>
            {
                Ok(Self::default())
            }
            Err(e) => Err(e.context(format!("Failed to load config from {}", path.display()))),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - TTS_WORKER_ENGINE_COMMAND → engine.command (split on whitespace)
    /// - TTS_WORKER_LANG_CODE → engine.lang_code
    /// - TTS_WORKER_FFMPEG → transcoder.ffmpeg
    /// - TTS_WORKER_SOCKET → server.socket
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(command) = std::env::var("TTS_WORKER_ENGINE_COMMAND")
            && !command.trim().is_empty()
        {
            self.engine.command = command.split_whitespace().map(str::to_string).collect();
        }

        if let Ok(lang_code) = std::env::var("TTS_WORKER_LANG_CODE")
            && !lang_code.is_empty()
        {
            self.engine.lang_code = lang_code;
        }

        if let Ok(ffmpeg) = std::env::var("TTS_WORKER_FFMPEG")
            && !ffmpeg.is_empty()
        {
            self.transcoder.ffmpeg = ffmpeg;
        }

        if let Ok(socket) = std::env::var("TTS_WORKER_SOCKET")
            && !socket.is_empty()
        {
            self.server.socket = Some(PathBuf::from(socket));
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/tts-worker/config.toml on Linux, or `None` if the
    /// config directory cannot be determined.
    #[cfg(feature = "cli")]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tts-worker").join("config.toml"))
    }
}
