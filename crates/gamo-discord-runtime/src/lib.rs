//! Discord transport for the gamo bot: gateway event handling, command
//! replies, status announcements, and presence updates over serenity.

mod discord_outbound;
mod discord_render;
mod discord_runtime;

pub use discord_outbound::DiscordOutbound;
pub use discord_render::{
    build_embed, build_message, card_colour, truncate_for_discord, MAX_EMBED_FIELD_VALUE_CHARS,
    MAX_MESSAGE_CHARS,
};
pub use discord_runtime::{DiscordBotRuntime, DiscordRuntimeConfig};
