//! Transition detection over consecutive status snapshots.
//!
//! Three signals are tracked independently: VPS power, the pending-operation
//! label, and the game process. A signal fires at most one event per change
//! and stays silent while its value is steady, so repeated polls of the same
//! state never produce duplicate notifications.

use gamo_api::StatusSnapshot;

pub const OPERATION_PREPARING: &str = "preparing";
pub const OPERATION_REBOOTING: &str = "rebooting";
pub const OPERATION_SAVING: &str = "saving";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Last observed values of the tracked signals.
pub struct TransitionState {
    pub last_server_up: bool,
    pub last_game_up: bool,
    pub last_pending_operation: Option<String>,
}

impl TransitionState {
    /// Baseline taken from a snapshot without emitting any event.
    pub fn from_snapshot(snapshot: &StatusSnapshot) -> Self {
        Self {
            last_server_up: snapshot.server_up,
            last_game_up: snapshot.game_up,
            last_pending_operation: snapshot.pending_operation.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Classification of a pending-operation change.
pub enum OperationChangeKind {
    Preparing,
    Rebooting,
    ShutdownComplete,
    Other,
}

impl OperationChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preparing => "preparing",
            Self::Rebooting => "rebooting",
            Self::ShutdownComplete => "shutdown_complete",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionEvent {
    VpsUp,
    VpsDown,
    OperationChanged {
        from: Option<String>,
        to: Option<String>,
    },
    GameUp,
    GameDown,
}

impl TransitionEvent {
    pub fn operation_kind(&self) -> Option<OperationChangeKind> {
        let Self::OperationChanged { from, to } = self else {
            return None;
        };
        let kind = match (from.as_deref(), to.as_deref()) {
            (_, Some(OPERATION_PREPARING)) => OperationChangeKind::Preparing,
            (_, Some(OPERATION_REBOOTING)) => OperationChangeKind::Rebooting,
            (Some(OPERATION_SAVING), None) => OperationChangeKind::ShutdownComplete,
            _ => OperationChangeKind::Other,
        };
        Some(kind)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::VpsUp => "vps_up",
            Self::VpsDown => "vps_down",
            Self::OperationChanged { .. } => "operation_changed",
            Self::GameUp => "game_up",
            Self::GameDown => "game_down",
        }
    }
}

/// Diffs `snapshot` against `previous`.
///
/// Events are ordered VPS, pending operation, game. The returned state always
/// carries all three latest values.
pub fn detect(
    previous: &TransitionState,
    snapshot: &StatusSnapshot,
) -> (Vec<TransitionEvent>, TransitionState) {
    let mut events = Vec::new();

    if snapshot.server_up != previous.last_server_up {
        events.push(if snapshot.server_up {
            TransitionEvent::VpsUp
        } else {
            TransitionEvent::VpsDown
        });
    }

    if snapshot.pending_operation != previous.last_pending_operation {
        let leaving_saving = previous.last_pending_operation.as_deref() == Some(OPERATION_SAVING);
        // Clearing a label is only news when a save finished.
        if snapshot.pending_operation.is_some() || leaving_saving {
            events.push(TransitionEvent::OperationChanged {
                from: previous.last_pending_operation.clone(),
                to: snapshot.pending_operation.clone(),
            });
        }
    }

    if snapshot.game_up != previous.last_game_up {
        events.push(if snapshot.game_up {
            TransitionEvent::GameUp
        } else {
            TransitionEvent::GameDown
        });
    }

    (events, TransitionState::from_snapshot(snapshot))
}
