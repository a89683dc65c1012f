//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod engines;
mod extract;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{Config, Preset};

#[derive(Parser)]
#[command(name = "cardocr")]
#[command(about = "Multi-engine OCR and contact extraction for visiting cards")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Engine/charset preset, applied on top of the config file
    #[arg(long, global = true, value_enum, env = "CARDOCR_PRESET")]
    preset: Option<Preset>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Address to bind to: PORT, HOST, or HOST:PORT (default from config: 127.0.0.1:5000)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Process an image and/or text once and print the JSON result
    Extract {
        /// Image file to OCR
        #[arg(short, long)]
        image: Option<PathBuf>,
        /// Raw text to merge with the OCR output
        #[arg(short, long)]
        text: Option<String>,
        /// Pretty-print the JSON output
        #[arg(short, long)]
        pretty: bool,
    },

    /// List configured OCR engines and whether they can run
    Engines,
}

/// Load configuration from the explicit path or by discovery.
async fn load_config(path: Option<&PathBuf>, preset: Option<Preset>) -> anyhow::Result<Config> {
    let mut config = match path {
        Some(path) => Config::load_from_path(path).await?.with_env_overrides(),
        None => Config::load().await?,
    };
    if let Some(preset) = preset {
        config.apply_preset(preset);
    }
    Ok(config)
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref(), cli.preset).await?;

    match cli.command {
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.bind.clone());
            serve::cmd_serve(&config, &bind).await
        }
        Commands::Extract {
            image,
            text,
            pretty,
        } => extract::cmd_extract(&config, image.as_deref(), text, pretty).await,
        Commands::Engines => engines::cmd_engines(&config),
    }
}
