use std::sync::{Arc, OnceLock};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use gamo_core::{ChatOutbound, OutboundMessage};
use serenity::gateway::{ActivityData, ShardManager};
use serenity::http::Http;
use serenity::model::id::{ChannelId, ShardId};
use serenity::model::user::OnlineStatus;

use crate::discord_render::build_message;

/// Shard manager slot, filled once the gateway client exists.
pub(crate) type ShardManagerSlot = Arc<OnceLock<Arc<ShardManager>>>;

pub(crate) async fn send_to_channel(
    http: &Http,
    channel_id: ChannelId,
    message: &OutboundMessage,
) -> Result<()> {
    channel_id
        .send_message(http, build_message(message))
        .await
        .with_context(|| format!("failed to send discord message to channel {channel_id}"))?;
    Ok(())
}

pub(crate) async fn shard_latency(slot: &ShardManagerSlot, shard_id: ShardId) -> Option<Duration> {
    let manager = slot.get()?;
    let runners = manager.runners.lock().await;
    runners.get(&shard_id).and_then(|runner| runner.latency)
}

#[derive(Clone)]
/// Sends bot output to the configured announcement channel.
pub struct DiscordOutbound {
    http: Arc<Http>,
    channel_id: ChannelId,
    shard_manager: ShardManagerSlot,
}

impl DiscordOutbound {
    pub(crate) fn new(http: Arc<Http>, channel_id: ChannelId, shard_manager: ShardManagerSlot) -> Self {
        Self {
            http,
            channel_id,
            shard_manager,
        }
    }

    pub fn channel_id(&self) -> ChannelId {
        self.channel_id
    }
}

#[async_trait]
impl ChatOutbound for DiscordOutbound {
    async fn send(&self, message: OutboundMessage) -> Result<()> {
        send_to_channel(&self.http, self.channel_id, &message).await
    }

    async fn set_presence(&self, presence: &str) -> Result<()> {
        let manager = self
            .shard_manager
            .get()
            .context("discord shard manager is not available yet")?;
        let activity = Some(ActivityData::listening(presence));
        let runners = manager.runners.lock().await;
        for runner in runners.values() {
            runner
                .runner_tx
                .set_presence(activity.clone(), OnlineStatus::Online);
        }
        tracing::debug!(presence, shards = runners.len(), "discord presence updated");
        Ok(())
    }
}
