//! Jira provider plugin - serve the provider protocol to the host runtime.

use std::io;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use hemmer_provider_sdk::{serve, ProviderService};
use tracing::info;
use tracing_subscriber::EnvFilter;

use jira_provider::{Provider, VERSION};

/// Jira provider - manage Jira users, groups and group memberships.
#[derive(Parser)]
#[command(name = "jira-provider", version = VERSION)]
#[command(about = "Declarative provider for Jira users, groups and group memberships")]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, default_value = "false", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the provider server and print the handshake line (default).
    Serve,

    /// Print the provider schema as JSON.
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the handshake
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let provider = Provider::new();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            info!(version = VERSION, "Starting Jira provider");
            serve(provider)
                .await
                .map_err(|e| anyhow!("Provider server failed: {e}"))?;
        }

        Commands::Schema => {
            let schema = serde_json::to_string_pretty(&provider.schema())
                .context("Failed to serialize provider schema")?;
            println!("{schema}");
        }
    }

    Ok(())
}
