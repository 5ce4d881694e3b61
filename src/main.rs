use anyhow::Result;
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use tts_worker::app::{run_serve, run_submit, run_synth};
use tts_worker::cli::{Cli, Commands};
use tts_worker::config::Config;
use tts_worker::logging::init_logging;
use tts_worker::voices::{VoiceInfo, list_voices};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose)?;
    tracing::debug!(version = %tts_worker::version_string(), "tts-worker starting");

    match cli.command {
        None => {
            let config = load_config(cli.config.as_deref())?;
            run_synth(config, None).await?;
        }
        Some(Commands::Synth { input }) => {
            let config = load_config(cli.config.as_deref())?;
            run_synth(config, input).await?;
        }
        Some(Commands::Serve { socket }) => {
            let config = load_config(cli.config.as_deref())?;
            run_serve(config, socket).await?;
        }
        Some(Commands::Submit { socket, input }) => {
            let config = load_config(cli.config.as_deref())?;
            run_submit(config, socket, input).await?;
        }
        Some(Commands::Voices) => {
            print_voices();
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "tts-worker",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/tts-worker/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&std::path::Path>) -> Result<Config> {
    let config = match custom_path {
        Some(path) => Config::load(path)?,
        None => match Config::default_path() {
            Some(default_path) => Config::load_or_default(&default_path)?,
            None => Config::default(),
        },
    };

    Ok(config.with_env_overrides())
}

/// Print the voice catalog, aliases first.
fn print_voices() {
    let color = std::io::stdout().is_terminal();
    println!("Voices:");
    for voice in list_voices() {
        println!("  {}", format_voice(voice, color));
    }
}

fn format_voice(voice: &VoiceInfo, color: bool) -> String {
    let kind = if voice.alias { "alias" } else { "voice" };
    if color {
        format!(
            "{:<12} {:<10} {:<7} {} {}",
            voice.id.green(),
            voice.name,
            voice.gender.as_str(),
            voice.style.dimmed(),
            format!("({})", kind).dimmed()
        )
    } else {
        format!(
            "{:<12} {:<10} {:<7} {} ({})",
            voice.id,
            voice.name,
            voice.gender.as_str(),
            voice.style,
            kind
        )
    }
}
