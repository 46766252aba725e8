use std::sync::{Arc, OnceLock};

use anyhow::{Context as _, Result};
use gamo_core::{CommandDispatcher, CommandInvocation};
use serenity::all::{Context, EventHandler, GatewayIntents, Message, Ready};
use serenity::async_trait;
use serenity::gateway::ShardManager;
use serenity::model::id::ChannelId;
use serenity::Client;
use tokio::sync::watch;

use crate::discord_outbound::{send_to_channel, shard_latency, DiscordOutbound, ShardManagerSlot};

#[derive(Clone)]
/// Public struct `DiscordRuntimeConfig` used across gamo components.
pub struct DiscordRuntimeConfig {
    pub token: String,
    pub channel_id: u64,
}

impl std::fmt::Debug for DiscordRuntimeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordRuntimeConfig")
            .field("token", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .finish()
    }
}

fn gateway_intents() -> GatewayIntents {
    GatewayIntents::GUILD_MESSAGES | GatewayIntents::DIRECT_MESSAGES | GatewayIntents::MESSAGE_CONTENT
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct InboundRoute {
    invocation: CommandInvocation,
    reply_channel: ChannelId,
}

/// Decides whether an inbound message reaches the dispatcher. Bot authors,
/// this bot included, are skipped; replies go to the configured channel
/// whichever channel the command came from.
fn route_inbound_message(
    author_is_bot: bool,
    author_tag: String,
    content: &str,
    configured_channel: ChannelId,
) -> Option<InboundRoute> {
    if author_is_bot {
        return None;
    }
    Some(InboundRoute {
        invocation: CommandInvocation {
            caller: author_tag,
            text: content.to_string(),
            gateway_latency: None,
        },
        reply_channel: configured_channel,
    })
}

struct DiscordEventHandler {
    dispatcher: Arc<CommandDispatcher>,
    channel_id: ChannelId,
    ready_tx: watch::Sender<bool>,
    shard_manager: ShardManagerSlot,
}

#[async_trait]
impl EventHandler for DiscordEventHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        tracing::info!(
            user = %ready.user.name,
            guilds = ready.guilds.len(),
            "discord gateway ready"
        );
        self.ready_tx.send_replace(true);
    }

    async fn message(&self, ctx: Context, message: Message) {
        let Some(route) = route_inbound_message(
            message.author.bot,
            message.author.tag(),
            &message.content,
            self.channel_id,
        ) else {
            return;
        };
        let invocation = CommandInvocation {
            gateway_latency: shard_latency(&self.shard_manager, ctx.shard_id).await,
            ..route.invocation
        };
        let Some(reply) = self.dispatcher.handle(&invocation).await else {
            return;
        };
        if let Err(error) = send_to_channel(&ctx.http, route.reply_channel, &reply).await {
            tracing::warn!(
                caller = %invocation.caller,
                error = %format!("{error:#}"),
                "failed to deliver command reply"
            );
        }
    }
}

/// Connected-but-not-started Discord client plus its outbound adapter.
pub struct DiscordBotRuntime {
    client: Client,
    outbound: Arc<DiscordOutbound>,
}

impl DiscordBotRuntime {
    /// Builds the gateway client. `ready_tx` flips to `true` on the first
    /// `ready` event.
    pub async fn connect(
        config: DiscordRuntimeConfig,
        dispatcher: Arc<CommandDispatcher>,
        ready_tx: watch::Sender<bool>,
    ) -> Result<Self> {
        if config.channel_id == 0 {
            anyhow::bail!("discord channel id must be greater than zero");
        }
        let channel_id = ChannelId::new(config.channel_id);
        let shard_manager: ShardManagerSlot = Arc::new(OnceLock::new());
        let handler = DiscordEventHandler {
            dispatcher,
            channel_id,
            ready_tx,
            shard_manager: Arc::clone(&shard_manager),
        };

        let client = Client::builder(&config.token, gateway_intents())
            .event_handler(handler)
            .await
            .context("failed to build discord client")?;
        let _ = shard_manager.set(Arc::clone(&client.shard_manager));
        let outbound = Arc::new(DiscordOutbound::new(
            Arc::clone(&client.http),
            channel_id,
            shard_manager,
        ));
        tracing::debug!(channel_id = config.channel_id, "discord client built");
        Ok(Self { client, outbound })
    }

    pub fn outbound(&self) -> Arc<DiscordOutbound> {
        Arc::clone(&self.outbound)
    }

    pub fn shard_manager(&self) -> Arc<ShardManager> {
        Arc::clone(&self.client.shard_manager)
    }

    /// Runs the gateway connection until it stops or fails.
    pub async fn run(&mut self) -> Result<()> {
        self.client
            .start()
            .await
            .context("discord gateway connection failed")
    }
}
