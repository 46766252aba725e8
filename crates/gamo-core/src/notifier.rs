//! Rendering of transition events, status reports, and command replies into
//! transport-neutral chat payloads.

use gamo_api::StatusSnapshot;
use gamo_query::GameQueryReport;

use crate::commands::ActionOutcome;
use crate::registry::CategoryRegistry;
use crate::transition::{OperationChangeKind, TransitionEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardTone {
    Online,
    Offline,
    Neutral,
}

impl CardTone {
    fn from_up(up: bool) -> Self {
        if up {
            Self::Online
        } else {
            Self::Offline
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Structured message; chat adapters map it to their rich-message format.
pub struct StatusCard {
    pub title: String,
    pub description: Option<String>,
    pub fields: Vec<CardField>,
    pub tone: CardTone,
}

impl StatusCard {
    fn new(title: impl Into<String>, tone: CardTone) -> Self {
        Self {
            title: title.into(),
            description: None,
            fields: Vec::new(),
            tone,
        }
    }

    fn field(mut self, name: &str, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(CardField {
            name: name.to_string(),
            value: value.into(),
            inline,
        });
        self
    }

    fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn plain_text(&self) -> String {
        let mut lines = vec![self.title.clone()];
        if let Some(description) = &self.description {
            lines.push(description.clone());
        }
        for field in &self.fields {
            lines.push(format!("{}: {}", field.name, field.value));
        }
        lines.join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    Text(String),
    Card(StatusCard),
    /// Several cards delivered as one message.
    Report(Vec<StatusCard>),
}

impl OutboundMessage {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Plain-text view used for logging and text-only transports.
    pub fn plain_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Card(card) => card.plain_text(),
            Self::Report(cards) => cards
                .iter()
                .map(StatusCard::plain_text)
                .collect::<Vec<_>>()
                .join("\n\n"),
        }
    }
}

fn up_label(up: bool) -> &'static str {
    if up {
        "online"
    } else {
        "offline"
    }
}

/// Host players connect to: the configured public host, else the server domain.
pub fn connect_host<'a>(snapshot: &'a StatusSnapshot, public_host: Option<&'a str>) -> &'a str {
    public_host
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .unwrap_or(snapshot.domain.as_str())
}

/// Returns `None` for events that are not announced.
pub fn render_transition_event(
    event: &TransitionEvent,
    snapshot: &StatusSnapshot,
    public_host: Option<&str>,
) -> Option<OutboundMessage> {
    let message = match event {
        TransitionEvent::VpsUp => OutboundMessage::text("VPS is now **up**."),
        TransitionEvent::VpsDown => OutboundMessage::text("VPS is now **down**."),
        TransitionEvent::OperationChanged { .. } => match event.operation_kind()? {
            OperationChangeKind::Preparing => {
                OutboundMessage::text("Starting the game server, please wait...")
            }
            OperationChangeKind::Rebooting => {
                OutboundMessage::text("Rebooting the server, please wait...")
            }
            OperationChangeKind::ShutdownComplete => {
                OutboundMessage::text("Shutdown complete. The world has been saved.")
            }
            OperationChangeKind::Other => return None,
        },
        TransitionEvent::GameUp => OutboundMessage::Card(
            StatusCard::new("Game server is now **up**", CardTone::Online)
                .description("Come and join!")
                .field(
                    "Server address",
                    format!("`{}`", connect_host(snapshot, public_host)),
                    true,
                )
                .field("IP address", format!("`{}`", snapshot.ip), true),
        ),
        TransitionEvent::GameDown => OutboundMessage::text("Game server is now **down**."),
    };
    Some(message)
}

/// Composite report for the `status` command: one VPS card and one game card.
pub fn render_status_report(
    snapshot: &StatusSnapshot,
    game: Option<&GameQueryReport>,
    public_host: Option<&str>,
) -> OutboundMessage {
    let vps = StatusCard::new(
        format!("VPS is **{}**", up_label(snapshot.server_up)),
        CardTone::from_up(snapshot.server_up),
    )
    .field(
        "Pending operations",
        format!("**{}**", snapshot.pending_operation_label()),
        false,
    )
    .field("Gamocosm alias", format!("`{}`", snapshot.domain), true)
    .field("IP address", format!("`{}`", snapshot.ip), true);

    let mut game_card = StatusCard::new(
        format!("Game server is **{}**", up_label(snapshot.game_up)),
        CardTone::from_up(snapshot.game_up),
    )
    .field(
        "Server hostname",
        format!("`{}`", connect_host(snapshot, public_host)),
        false,
    );

    match (snapshot.game_up, game) {
        (true, Some(report)) => {
            let names = if report.player_names.is_empty() {
                "nobody".to_string()
            } else {
                report
                    .player_names
                    .iter()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            game_card = game_card
                .field("Latency", format!("**{} ms**", report.latency_ms), true)
                .field("Version", report.version.clone(), true)
                .field(
                    &format!(
                        "Players online ({}/{})",
                        report.players_online, report.players_max
                    ),
                    format!("**{names}**"),
                    false,
                );
            if let Some(brand) = &report.software_brand {
                game_card = game_card.field("Software", brand.clone(), true);
            }
        }
        (true, None) => {
            game_card = game_card.description("Live server details are unavailable right now.");
        }
        (false, _) => {}
    }

    OutboundMessage::Report(vec![vps, game_card])
}

/// Reply for a gated command. A remote failure reason is returned unchanged.
pub fn render_action_outcome(outcome: &ActionOutcome) -> OutboundMessage {
    match outcome {
        ActionOutcome::Triggered { .. } => OutboundMessage::text("Action successfully triggered."),
        ActionOutcome::Rejected { requested, current } => OutboundMessage::Text(format!(
            "Cannot run `{requested}` while `{current}` is still in progress. Please wait and try again."
        )),
        ActionOutcome::Failed { reason, .. } => OutboundMessage::Text(reason.clone()),
        ActionOutcome::Unavailable { action, .. } => OutboundMessage::Text(format!(
            "Could not reach the server management API for `{action}`. Please try again later."
        )),
    }
}

pub fn render_ping(latency_ms: Option<u64>) -> OutboundMessage {
    match latency_ms {
        Some(latency_ms) => OutboundMessage::Text(format!("Pong! {latency_ms}ms")),
        None => OutboundMessage::text("Pong!"),
    }
}

pub fn render_download(snapshot: &StatusSnapshot, prefix: &str) -> OutboundMessage {
    match &snapshot.download_url {
        Some(url) => OutboundMessage::Text(format!("World download: {url}")),
        None => OutboundMessage::Text(format!(
            "No world download is available right now. Run `{prefix}backup` first."
        )),
    }
}

pub fn render_help(registry: &CategoryRegistry, prefix: &str) -> OutboundMessage {
    let mut card = StatusCard::new("Available commands", CardTone::Neutral);
    for category in registry.categories() {
        let lines = category
            .commands()
            .iter()
            .map(|command| format!("`{prefix}{}` {}", command.usage, command.summary))
            .collect::<Vec<_>>()
            .join("\n");
        card = card.field(category.title(), lines, false);
    }
    OutboundMessage::Card(card)
}

/// Presence line published alongside each poll.
pub fn render_presence(snapshot: &StatusSnapshot, prefix: &str) -> String {
    let state = if snapshot.game_up { "up" } else { "down" };
    format!("{prefix}help | Server {state}")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use gamo_api::StatusSnapshot;
    use gamo_query::GameQueryReport;

    use super::{
        render_action_outcome, render_download, render_help, render_ping, render_presence,
        render_status_report, render_transition_event, CardTone, OutboundMessage,
    };
    use crate::commands::ActionOutcome;
    use crate::registry::CategoryRegistry;
    use crate::transition::TransitionEvent;

    fn live_snapshot() -> StatusSnapshot {
        StatusSnapshot {
            server_up: true,
            pending_operation: None,
            domain: "abc.gamocosm.com".to_string(),
            ip: "203.0.113.7".to_string(),
            game_up: true,
            download_url: None,
        }
    }

    fn operation(from: Option<&str>, to: Option<&str>) -> TransitionEvent {
        TransitionEvent::OperationChanged {
            from: from.map(str::to_string),
            to: to.map(str::to_string),
        }
    }

    #[test]
    fn unit_transition_table_renders_expected_intents() {
        let snapshot = live_snapshot();
        let text = |event: TransitionEvent| {
            render_transition_event(&event, &snapshot, None).map(|message| message.plain_text())
        };
        assert_eq!(text(TransitionEvent::VpsUp).as_deref(), Some("VPS is now **up**."));
        assert_eq!(
            text(TransitionEvent::VpsDown).as_deref(),
            Some("VPS is now **down**.")
        );
        assert_eq!(
            text(operation(None, Some("preparing"))).as_deref(),
            Some("Starting the game server, please wait...")
        );
        assert_eq!(
            text(operation(Some("preparing"), Some("rebooting"))).as_deref(),
            Some("Rebooting the server, please wait...")
        );
        assert_eq!(
            text(operation(Some("saving"), None)).as_deref(),
            Some("Shutdown complete. The world has been saved.")
        );
        assert_eq!(
            text(TransitionEvent::GameDown).as_deref(),
            Some("Game server is now **down**.")
        );
    }

    #[test]
    fn unit_uninteresting_operation_changes_render_nothing() {
        let snapshot = live_snapshot();
        assert_eq!(
            render_transition_event(&operation(None, Some("saving")), &snapshot, None),
            None
        );
        assert_eq!(
            render_transition_event(&operation(Some("saving"), Some("resizing")), &snapshot, None),
            None
        );
    }

    #[test]
    fn functional_game_up_card_includes_connect_info() {
        let snapshot = live_snapshot();
        let Some(OutboundMessage::Card(card)) =
            render_transition_event(&TransitionEvent::GameUp, &snapshot, Some("play.example.test"))
        else {
            panic!("expected card");
        };
        assert_eq!(card.tone, CardTone::Online);
        assert_eq!(card.fields[0].value, "`play.example.test`");
        assert_eq!(card.fields[1].value, "`203.0.113.7`");
    }

    #[test]
    fn functional_status_report_includes_live_details() {
        let snapshot = live_snapshot();
        let report = GameQueryReport {
            latency_ms: 42,
            players_online: 2,
            players_max: 10,
            player_names: BTreeSet::from(["steve".to_string(), "alex".to_string()]),
            version: "1.20.4".to_string(),
            software_brand: Some("Paper on 1.20.4".to_string()),
        };
        let OutboundMessage::Report(cards) = render_status_report(&snapshot, Some(&report), None)
        else {
            panic!("expected report");
        };
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].tone, CardTone::Online);
        let vps = OutboundMessage::Card(cards[0].clone()).plain_text();
        assert!(vps.contains("VPS is **online**"));
        assert!(vps.contains("Pending operations: **none**"));
        assert!(vps.contains("Gamocosm alias: `abc.gamocosm.com`"));
        let game = OutboundMessage::Card(cards[1].clone()).plain_text();
        assert!(game.contains("Server hostname: `abc.gamocosm.com`"));
        assert!(game.contains("Latency: **42 ms**"));
        assert!(game.contains("Players online (2/10): **alex, steve**"));
        assert!(game.contains("Software: Paper on 1.20.4"));
    }

    #[test]
    fn regression_status_report_omits_enrichment_when_query_failed() {
        let snapshot = live_snapshot();
        let report = render_status_report(&snapshot, None, None).plain_text();
        assert!(report.contains("Live server details are unavailable right now."));
        assert!(!report.contains("Latency"));
    }

    #[test]
    fn unit_status_report_for_stopped_server_has_no_live_fields() {
        let snapshot = StatusSnapshot::default();
        let report = render_status_report(&snapshot, None, None).plain_text();
        assert!(report.contains("VPS is **offline**"));
        assert!(report.contains("Game server is **offline**"));
        assert!(!report.contains("unavailable"));
    }

    #[test]
    fn unit_action_outcomes_render_exactly_one_reply() {
        assert_eq!(
            render_action_outcome(&ActionOutcome::Failed {
                action: "start".to_string(),
                reason: "insufficient funds".to_string(),
            }),
            OutboundMessage::Text("insufficient funds".to_string())
        );
        assert_eq!(
            render_action_outcome(&ActionOutcome::Triggered {
                action: "stop".to_string()
            })
            .plain_text(),
            "Action successfully triggered."
        );
        assert!(render_action_outcome(&ActionOutcome::Rejected {
            requested: "start".to_string(),
            current: "stop".to_string(),
        })
        .plain_text()
        .contains("while `stop` is still in progress"));
        assert!(render_action_outcome(&ActionOutcome::Unavailable {
            action: "backup".to_string(),
            error: "connection refused".to_string(),
        })
        .plain_text()
        .starts_with("Could not reach the server management API"));
    }

    #[test]
    fn unit_small_renderers() {
        assert_eq!(render_ping(Some(87)).plain_text(), "Pong! 87ms");
        assert_eq!(render_ping(None).plain_text(), "Pong!");
        assert_eq!(render_presence(&live_snapshot(), "!"), "!help | Server up");
        assert!(render_download(&StatusSnapshot::default(), "!")
            .plain_text()
            .contains("`!backup`"));
    }

    #[test]
    fn functional_help_lists_every_category() {
        let help = render_help(&CategoryRegistry::standard(), "!").plain_text();
        assert!(help.contains("Diagnostics"));
        assert!(help.contains("`!stop`"));
        assert!(help.contains("`!command <text>`"));
    }
}
