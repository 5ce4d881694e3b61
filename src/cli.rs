//! Command-line interface for tts-worker
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Text-to-speech job worker
#[derive(Parser, Debug)]
#[command(
    name = "tts-worker",
    version,
    about = "Text-to-speech job worker: text in, MP3 and word timestamps out"
)]
pub struct Cli {
    /// Subcommand to execute (default: synth from stdin)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose logging (-v: debug, -vv: trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one job and print the JSON response
    Synth {
        /// Job file, either {"input": {...}} or a bare input object (default: stdin)
        #[arg(long, short, value_name = "FILE")]
        input: Option<PathBuf>,
    },

    /// Serve jobs on a Unix socket
    Serve {
        /// Path to Unix socket (default: $XDG_RUNTIME_DIR/tts-worker.sock)
        #[arg(long, value_name = "PATH")]
        socket: Option<PathBuf>,
    },

    /// Send one job to a running server and print the response
    Submit {
        /// Path to Unix socket (default: $XDG_RUNTIME_DIR/tts-worker.sock)
        #[arg(long, value_name = "PATH")]
        socket: Option<PathBuf>,

        /// Job file (default: stdin)
        #[arg(long, short, value_name = "FILE")]
        input: Option<PathBuf>,
    },

    /// List accepted voice ids
    Voices,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}
