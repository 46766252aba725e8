//! Conversion of transport-neutral bot messages into serenity builders.

use gamo_core::{CardTone, OutboundMessage, StatusCard};
use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::model::Colour;

pub const MAX_MESSAGE_CHARS: usize = 2000;
pub const MAX_EMBED_FIELD_VALUE_CHARS: usize = 1024;
const MAX_EMBED_TITLE_CHARS: usize = 256;
const MAX_EMBED_DESCRIPTION_CHARS: usize = 4096;
const TRUNCATION_MARKER: &str = "...";

/// Caps `value` at `max_chars` characters, marking the cut.
pub fn truncate_for_discord(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let keep = max_chars.saturating_sub(TRUNCATION_MARKER.len());
    let mut truncated = value.chars().take(keep).collect::<String>();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}

pub fn card_colour(tone: CardTone) -> Colour {
    match tone {
        CardTone::Online => Colour::new(0x2E_CC_71),
        CardTone::Offline => Colour::new(0xE7_4C_3C),
        CardTone::Neutral => Colour::new(0x34_98_DB),
    }
}

pub fn build_embed(card: &StatusCard) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(truncate_for_discord(&card.title, MAX_EMBED_TITLE_CHARS))
        .colour(card_colour(card.tone));
    if let Some(description) = &card.description {
        embed = embed.description(truncate_for_discord(
            description,
            MAX_EMBED_DESCRIPTION_CHARS,
        ));
    }
    for field in &card.fields {
        embed = embed.field(
            &field.name,
            truncate_for_discord(&field.value, MAX_EMBED_FIELD_VALUE_CHARS),
            field.inline,
        );
    }
    embed
}

pub fn build_message(message: &OutboundMessage) -> CreateMessage {
    match message {
        OutboundMessage::Text(text) => {
            CreateMessage::new().content(truncate_for_discord(text, MAX_MESSAGE_CHARS))
        }
        OutboundMessage::Card(card) => CreateMessage::new().embed(build_embed(card)),
        OutboundMessage::Report(cards) => {
            CreateMessage::new().embeds(cards.iter().map(build_embed).collect())
        }
    }
}
