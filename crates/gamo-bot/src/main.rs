mod bootstrap_helpers;
mod startup;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use gamo_cli::Cli;
use gamo_core::start_status_poll_scheduler;
use gamo_discord_runtime::DiscordBotRuntime;
use tokio::sync::watch;

use crate::bootstrap_helpers::init_tracing;
use crate::startup::{
    build_components, discord_runtime_config, log_startup_status, poll_scheduler_config,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    tracing::info!(config = %cli.redacted_summary(), "starting gamo bot");

    let components = build_components(&cli)?;
    log_startup_status(components.api.as_ref()).await;

    let (ready_tx, ready_rx) = watch::channel(false);
    let mut discord = DiscordBotRuntime::connect(
        discord_runtime_config(&cli),
        Arc::clone(&components.dispatcher),
        ready_tx,
    )
    .await?;
    let mut poller = start_status_poll_scheduler(
        poll_scheduler_config(&cli),
        components.api.clone(),
        discord.outbound(),
        ready_rx,
    )?;

    let shard_manager = discord.shard_manager();
    let outcome = tokio::select! {
        result = discord.run() => result,
        signal = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
            shard_manager.shutdown_all().await;
            signal.context("failed to listen for the shutdown signal")
        }
    };
    poller.shutdown().await;
    tracing::info!("gamo bot stopped");
    outcome
}
