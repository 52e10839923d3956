//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod analyze;
mod helpers;
mod providers;
mod serve;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::analysis::{Analyzer, OrchestratorSettings};
use crate::config::Config;
use crate::providers::ProviderRegistry;

#[derive(Parser)]
#[command(name = "a11y")]
#[command(about = "Accessibility conformance report (VPAT/ACR) analyzer")]
#[command(version)]
pub struct Cli {
    /// Config file (default: discover a11y-analyzer.{toml,yaml,json})
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

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
    /// Start the HTTP API server
    Serve {
        /// Address to bind to: PORT, HOST, or HOST:PORT (default: 127.0.0.1:8000)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Analyze a local PDF, DOCX or HTML conformance report
    Analyze {
        /// Report file
        file: PathBuf,
        /// AI provider: auto, none, or a provider id (openai, gemini, groq, ollama)
        #[arg(short, long, default_value = "auto")]
        provider: String,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List configured AI providers
    Providers,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            serve::cmd_serve(&config, &bind).await
        }
        Commands::Analyze {
            file,
            provider,
            json,
        } => analyze::cmd_analyze(&config, &file, &provider, json).await,
        Commands::Providers => providers::cmd_providers(&config),
    }
}

/// Build an analyzer from configuration.
fn build_analyzer(config: &Config) -> anyhow::Result<Analyzer> {
    let registry = ProviderRegistry::from_config(&config.ai)?;
    Ok(Analyzer::new(
        Arc::new(registry),
        OrchestratorSettings::from_config(&config.ai),
    ))
}
