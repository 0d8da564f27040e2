//! Emote manager Discord bot.
//!
//! Reads `DISCORD_TOKEN` from the environment (or `.env`) and runs until
//! interrupted.

use clap::Parser;
use emote_manager::observability::{ObservabilityConfig, init_observability};
use emote_manager::{EmoteBot, EmoteConfig};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "emote-manager", version, about = "Discord emote manager bot")]
struct Cli {
    /// Configuration file replacing the default search path
    #[arg(short, long, env = "EMOTE_MANAGER_CONFIG")]
    config: Option<PathBuf>,

    /// Log level filter, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }

    init_observability(
        ObservabilityConfig::default()
            .with_log_level(cli.log_level)
            .with_json_logs(cli.json_logs),
    )?;

    let config = match &cli.config {
        Some(path) => EmoteConfig::from_file(path)?,
        None => EmoteConfig::load()?,
    };
    info!(prefix = %config.bot().prefix(), "Configuration loaded");

    let token = std::env::var("DISCORD_TOKEN").map_err(|_| {
        error!("DISCORD_TOKEN is not set");
        "DISCORD_TOKEN environment variable is required"
    })?;

    let mut bot = EmoteBot::new(token, config).await?;

    let manager = bot.manager().clone();
    let shards = bot.shard_manager();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown requested");
                manager.shutdown();
                shards.shutdown_all().await;
            }
            Err(e) => warn!(error = %e, "Could not listen for ctrl-c"),
        }
    });

    bot.start().await?;
    info!("Emote bot stopped");
    Ok(())
}
