//! Wiring from parsed settings to the bot's long-lived components.

use std::sync::Arc;

use anyhow::{Context, Result};
use gamo_api::{GamocosmClient, GamocosmConfig, ManagementApi, StatusSnapshot};
use gamo_cli::Cli;
use gamo_core::{CommandDispatcher, DispatcherSettings, PollSchedulerConfig};
use gamo_discord_runtime::DiscordRuntimeConfig;
use gamo_query::{MinecraftQueryClient, MinecraftQueryConfig};

pub(crate) struct BotComponents {
    pub(crate) api: Arc<GamocosmClient>,
    pub(crate) dispatcher: Arc<CommandDispatcher>,
}

pub(crate) fn build_components(cli: &Cli) -> Result<BotComponents> {
    let api = Arc::new(
        GamocosmClient::new(GamocosmConfig {
            api_base: cli.api_base.clone(),
            server_id: cli.server_id.clone(),
            api_key: cli.api_key.clone(),
            request_timeout_ms: cli.request_timeout_ms,
        })
        .context("failed to configure the Gamocosm management client")?,
    );
    let query = Arc::new(MinecraftQueryClient::new(MinecraftQueryConfig {
        timeout: cli.query_timeout(),
        query_port: cli.query_port,
    }));
    let dispatcher = Arc::new(CommandDispatcher::new(
        api.clone(),
        query,
        DispatcherSettings {
            prefix: cli.command_prefix.clone(),
            public_host: cli.public_host(),
        },
    ));
    Ok(BotComponents { api, dispatcher })
}

pub(crate) fn poll_scheduler_config(cli: &Cli) -> PollSchedulerConfig {
    PollSchedulerConfig {
        interval: cli.poll_interval(),
        prefix: cli.command_prefix.clone(),
        public_host: cli.public_host(),
    }
}

pub(crate) fn discord_runtime_config(cli: &Cli) -> DiscordRuntimeConfig {
    DiscordRuntimeConfig {
        token: cli.discord_token.clone(),
        channel_id: cli.discord_channel,
    }
}

/// Logs the server state seen at startup. An unreachable API is not fatal;
/// the poll loop keeps retrying on its own schedule.
pub(crate) async fn log_startup_status(api: &dyn ManagementApi) -> Option<StatusSnapshot> {
    match api.fetch_status().await {
        Ok(snapshot) => {
            tracing::info!(
                server_up = snapshot.server_up,
                game_up = snapshot.game_up,
                pending_operation = snapshot.pending_operation_label(),
                domain = %snapshot.domain,
                "management API reachable"
            );
            Some(snapshot)
        }
        Err(error) => {
            tracing::warn!(error = %error, "management API unreachable at startup");
            None
        }
    }
}
