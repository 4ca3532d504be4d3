//! # Signer Runtime
//!
//! Entry point for the signer bridge host.
//!
//! ## Startup Sequence
//!
//! 1. Parse arguments
//! 2. Load configuration (defaults, TOML file, `SB_*` environment)
//! 3. Install logging (stderr; stdout carries the JSON report)
//! 4. Open the pending store and recover any outstanding request
//! 5. Run the subcommand and print its report

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use signer_runtime::{execute, open_bridge, Command, RuntimeConfig};

/// Delegates signing and NIP-44 encryption to an external signer app
#[derive(Parser, Debug)]
#[command(name = "signer-runtime")]
#[command(about = "Delegate signing and NIP-44 encryption to an external signer app")]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter, overrides the configured level
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

fn load_config(args: &Args) -> Result<RuntimeConfig> {
    let mut config = RuntimeConfig::load(args.config.as_deref())?;
    config.apply_env_overrides(|key| std::env::var(key).ok());
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    config.validate()?;
    Ok(config)
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).context("Failed to load configuration")?;
    init_logging(&config.logging.level).context("Failed to initialize logging")?;
    debug!(?config, "Configuration loaded");

    let bridge = open_bridge(&config)?;
    let report = match execute(&bridge, args.command).await {
        Ok(report) => report,
        Err(e) => {
            error!(error = %format!("{e:#}"), "Command failed");
            return Err(e);
        }
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
