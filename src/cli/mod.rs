//! CLI module for Catalyst
//!
//! - `serve`: start the HTTP server (default)
//! - `providers list|test`: inspect and probe configured providers
//! - `analyze`: run one analysis over a transcript file or stdin

use clap::{Parser, Subcommand};

pub mod analyze;
pub mod providers;

/// Catalyst relationship-coaching backend
#[derive(Parser, Debug)]
#[command(name = "catalyst")]
#[command(about = "LLM provider routing for relationship coaching")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the server (default)
    Serve,
    /// Inspect and probe LLM providers
    Providers {
        #[command(subcommand)]
        command: ProvidersCommand,
    },
    /// Analyze a conversation transcript
    Analyze(analyze::AnalyzeArgs),
}

#[derive(Subcommand, Debug)]
pub enum ProvidersCommand {
    /// List catalog entries with configuration and health state
    List,
    /// Probe provider connectivity
    Test {
        /// Probe only this provider
        #[arg(long)]
        name: Option<String>,
    },
}

/// Dispatch a parsed command line
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Serve) | None => crate::server::run().await,
        Some(Commands::Providers { command }) => match command {
            ProvidersCommand::List => providers::list().await,
            ProvidersCommand::Test { name } => providers::test(name.as_deref()).await,
        },
        Some(Commands::Analyze(args)) => analyze::run(args).await,
    }
}
