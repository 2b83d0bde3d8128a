//! price-bridge: privileged agent for the price overlay consumer.
//!
//! Speaks newline-delimited JSON on stdin/stdout; logs go to stderr.

use anyhow::{Context, Result};
use bridge_runtime::admin;
use bridge_runtime::container::open_repository;
use bridge_runtime::{BridgeConfig, BridgeContainer, BridgeRuntime};
use bridge_telemetry::{init_telemetry, TelemetryConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing::{info, warn};

/// Privileged agent brokering storage and network access for the consumer
#[derive(Parser, Debug)]
#[command(name = "price-bridge", version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "PB_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory, overriding the file and PB_DATA_DIR
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Serve the consumer over stdin/stdout (default)
    Run,
    /// Store the Web API key
    SetApiKey { key: String },
    /// Delete the stored Web API key
    ClearApiKey,
    /// Print stored state as JSON, key redacted
    Show,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_telemetry(&TelemetryConfig::from_env()).context("failed to initialize telemetry")?;

    let mut config =
        BridgeConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = dir;
    }

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(config).await,
        Command::SetApiKey { key } => {
            let (repo, _lock) = open_repository(&config).context("failed to open store")?;
            admin::set_api_key(&repo, &key)?;
            info!("API key saved");
            Ok(())
        }
        Command::ClearApiKey => {
            let (repo, _lock) = open_repository(&config).context("failed to open store")?;
            admin::clear_api_key(&repo)?;
            Ok(())
        }
        Command::Show => {
            let (repo, _lock) = open_repository(&config).context("failed to open store")?;
            let state = admin::redacted_state(&repo);
            println!("{}", serde_json::to_string_pretty(&state)?);
            Ok(())
        }
    }
}

async fn run(config: BridgeConfig) -> Result<()> {
    let container = BridgeContainer::open(config).context("failed to start bridge")?;
    let runtime = BridgeRuntime::new(container);

    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    let reason = runtime
        .serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout(), interrupt)
        .await;
    info!(?reason, "Bridge exited");
    Ok(())
}
