//! Bot engine: transition detection, action gating, command dispatch, and
//! the status poll scheduler. Chat transports plug in through
//! [`ChatOutbound`]; the management API and game query through the traits
//! re-exported from `gamo-api` and `gamo-query`.

mod action_gate;
mod commands;
mod notifier;
mod outbound;
mod poll_scheduler;
mod registry;
#[cfg(test)]
mod test_support;
mod transition;

pub use action_gate::{ActionGate, ActionPermit, GateBusy};
pub use commands::{
    parse_bot_command, ActionOutcome, BotCommand, CommandDispatcher, CommandInvocation,
    DispatcherSettings,
};
pub use notifier::{
    connect_host, render_action_outcome, render_download, render_help, render_ping,
    render_presence, render_status_report, render_transition_event, CardField, CardTone,
    OutboundMessage, StatusCard,
};
pub use outbound::ChatOutbound;
pub use poll_scheduler::{
    start_status_poll_scheduler, PollCycleReport, PollSchedulerConfig, StatusPollHandle,
    StatusPoller, DEFAULT_POLL_INTERVAL,
};
pub use registry::{CategoryId, CategoryRegistry, CommandCategory, CommandDescriptor};
pub use transition::{
    detect, OperationChangeKind, TransitionEvent, TransitionState, OPERATION_PREPARING,
    OPERATION_REBOOTING, OPERATION_SAVING,
};
