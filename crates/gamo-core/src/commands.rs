//! Chat command parsing and dispatch.

use std::sync::Arc;
use std::time::Duration;

use gamo_api::{ManagementApi, ManagementApiError, RemoteAction};
use gamo_query::GameQuery;

use crate::action_gate::ActionGate;
use crate::notifier::{
    connect_host, render_action_outcome, render_download, render_help, render_ping,
    render_status_report, OutboundMessage,
};
use crate::registry::CategoryRegistry;

const API_UNAVAILABLE_REPLY: &str =
    "Could not reach the server management API. Please try again later.";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Enumerates supported `BotCommand` values.
pub enum BotCommand {
    Help,
    Ping,
    Status,
    Start,
    Stop,
    Reboot,
    Pause,
    Resume,
    Backup,
    Download,
    Console { text: String },
    Invalid { message: String },
}

impl BotCommand {
    /// Registry name of the command; `invalid` for parse failures.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Ping => "ping",
            Self::Status => "status",
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Reboot => "reboot",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Backup => "backup",
            Self::Download => "download",
            Self::Console { .. } => "command",
            Self::Invalid { .. } => "invalid",
        }
    }

    pub fn remote_action(&self) -> Option<RemoteAction> {
        let action = match self {
            Self::Start => RemoteAction::Start,
            Self::Stop => RemoteAction::Stop,
            Self::Reboot => RemoteAction::Reboot,
            Self::Pause => RemoteAction::Pause,
            Self::Resume => RemoteAction::Resume,
            Self::Backup => RemoteAction::Backup,
            Self::Console { text } => RemoteAction::Command(text.clone()),
            _ => return None,
        };
        Some(action)
    }
}

/// Parses `text` as a prefixed command. Returns `None` when the text is not
/// addressed to the bot or names no known command.
pub fn parse_bot_command(text: &str, prefix: &str) -> Option<BotCommand> {
    if prefix.is_empty() {
        return None;
    }
    let args = text.trim().strip_prefix(prefix)?;
    if args.is_empty() || args.starts_with(char::is_whitespace) {
        return None;
    }

    let mut parts = args.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    let remainder = parts.next().unwrap_or_default().trim();
    let without_args = |command: BotCommand| {
        if remainder.is_empty() {
            command
        } else {
            BotCommand::Invalid {
                message: format!("Usage: `{prefix}{name}`"),
            }
        }
    };

    let parsed = match name {
        "help" => without_args(BotCommand::Help),
        "ping" => without_args(BotCommand::Ping),
        "status" => without_args(BotCommand::Status),
        "start" => without_args(BotCommand::Start),
        "stop" => without_args(BotCommand::Stop),
        "reboot" => without_args(BotCommand::Reboot),
        "pause" => without_args(BotCommand::Pause),
        "resume" => without_args(BotCommand::Resume),
        "backup" => without_args(BotCommand::Backup),
        "download" => without_args(BotCommand::Download),
        "command" => {
            if remainder.is_empty() {
                BotCommand::Invalid {
                    message: format!("Usage: `{prefix}command <text>`"),
                }
            } else {
                BotCommand::Console {
                    text: remainder.to_string(),
                }
            }
        }
        _ => {
            tracing::debug!(command = name, "ignoring unknown command");
            return None;
        }
    };
    Some(parsed)
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of a gated remote action.
pub enum ActionOutcome {
    Triggered { action: String },
    Rejected { requested: String, current: String },
    Failed { action: String, reason: String },
    Unavailable { action: String, error: String },
}

impl ActionOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Triggered { .. } => "triggered",
            Self::Rejected { .. } => "rejected",
            Self::Failed { .. } => "failed",
            Self::Unavailable { .. } => "unavailable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub caller: String,
    pub text: String,
    pub gateway_latency: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherSettings {
    pub prefix: String,
    /// Hostname players connect to; the server domain is used when unset.
    pub public_host: Option<String>,
}

/// Shared context for command handlers, built once at startup.
pub struct CommandDispatcher {
    api: Arc<dyn ManagementApi>,
    query: Arc<dyn GameQuery>,
    registry: CategoryRegistry,
    settings: DispatcherSettings,
}

impl CommandDispatcher {
    pub fn new(
        api: Arc<dyn ManagementApi>,
        query: Arc<dyn GameQuery>,
        settings: DispatcherSettings,
    ) -> Self {
        Self {
            api,
            query,
            registry: CategoryRegistry::standard(),
            settings,
        }
    }

    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &DispatcherSettings {
        &self.settings
    }

    /// Handles one chat message. Returns the single reply, or `None` when the
    /// message is not a command.
    pub async fn handle(&self, invocation: &CommandInvocation) -> Option<OutboundMessage> {
        let command = parse_bot_command(&invocation.text, &self.settings.prefix)?;
        let (reply, outcome) = self.execute(&command, invocation).await;
        tracing::info!(
            command = command.name(),
            caller = %invocation.caller,
            outcome,
            "handled chat command"
        );
        Some(reply)
    }

    async fn execute(
        &self,
        command: &BotCommand,
        invocation: &CommandInvocation,
    ) -> (OutboundMessage, &'static str) {
        if let BotCommand::Invalid { message } = command {
            return (OutboundMessage::Text(message.clone()), "invalid");
        }

        if let Some(action) = command.remote_action() {
            let Some((category, descriptor)) = self.registry.resolve(command.name()) else {
                return (
                    OutboundMessage::Text(format!("Unknown command `{}`.", command.name())),
                    "invalid",
                );
            };
            let outcome = if descriptor.gated {
                self.run_gated(category.gate(), action).await
            } else {
                self.run_remote(action).await
            };
            return (render_action_outcome(&outcome), outcome.label());
        }

        match command {
            BotCommand::Help => (
                render_help(&self.registry, &self.settings.prefix),
                "replied",
            ),
            BotCommand::Ping => {
                let latency_ms = invocation
                    .gateway_latency
                    .map(|latency| u64::try_from(latency.as_millis()).unwrap_or(u64::MAX));
                (render_ping(latency_ms), "replied")
            }
            BotCommand::Status => self.status_report().await,
            BotCommand::Download => match self.api.fetch_status().await {
                Ok(snapshot) => (
                    render_download(&snapshot, &self.settings.prefix),
                    "replied",
                ),
                Err(error) => {
                    tracing::warn!(command = "download", error = %error, "status fetch failed");
                    (OutboundMessage::text(API_UNAVAILABLE_REPLY), "unavailable")
                }
            },
            _ => (
                OutboundMessage::Text(format!("Unknown command `{}`.", command.name())),
                "invalid",
            ),
        }
    }

    async fn status_report(&self) -> (OutboundMessage, &'static str) {
        let snapshot = match self.api.fetch_status().await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                tracing::warn!(command = "status", error = %error, "status fetch failed");
                return (OutboundMessage::text(API_UNAVAILABLE_REPLY), "unavailable");
            }
        };
        let public_host = self.settings.public_host.as_deref();
        let report = if snapshot.game_up {
            let host = connect_host(&snapshot, public_host);
            match self.query.query(host).await {
                Ok(report) => Some(report),
                Err(error) => {
                    tracing::warn!(host, error = %error, "game server query failed");
                    None
                }
            }
        } else {
            None
        };
        (
            render_status_report(&snapshot, report.as_ref(), public_host),
            "replied",
        )
    }

    /// Admission check and set happen before the first await.
    async fn run_gated(&self, gate: &ActionGate, action: RemoteAction) -> ActionOutcome {
        let verb = action.verb();
        let _permit = match gate.try_acquire(verb) {
            Ok(permit) => permit,
            Err(busy) => {
                return ActionOutcome::Rejected {
                    requested: verb.to_string(),
                    current: busy.current_action,
                }
            }
        };
        self.run_remote(action).await
    }

    async fn run_remote(&self, action: RemoteAction) -> ActionOutcome {
        let verb = action.verb().to_string();
        match self.api.perform(&action).await {
            Ok(()) => ActionOutcome::Triggered { action: verb },
            Err(ManagementApiError::RemoteActionFailed(reason)) => ActionOutcome::Failed {
                action: verb,
                reason,
            },
            Err(error) => {
                tracing::warn!(action = %verb, error = %error, "remote action failed");
                ActionOutcome::Unavailable {
                    action: verb,
                    error: error.to_string(),
                }
            }
        }
    }
}
