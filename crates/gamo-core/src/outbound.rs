use anyhow::Result;
use async_trait::async_trait;

use crate::notifier::OutboundMessage;

#[async_trait]
/// Trait contract for delivering bot output to the announcement channel.
pub trait ChatOutbound: Send + Sync {
    async fn send(&self, message: OutboundMessage) -> Result<()>;

    /// Publishes the bot's activity line. Transports without presence ignore it.
    async fn set_presence(&self, _presence: &str) -> Result<()> {
        Ok(())
    }
}
