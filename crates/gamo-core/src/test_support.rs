use std::collections::{BTreeSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use gamo_api::{ManagementApi, ManagementApiError, RemoteAction, StatusSnapshot};
use gamo_query::{GameQuery, GameQueryError, GameQueryReport};

use crate::notifier::OutboundMessage;
use crate::outbound::ChatOutbound;

pub(crate) fn live_snapshot() -> StatusSnapshot {
    StatusSnapshot {
        server_up: true,
        pending_operation: None,
        domain: "abc.gamocosm.com".to_string(),
        ip: "203.0.113.7".to_string(),
        game_up: true,
        download_url: None,
    }
}

pub(crate) fn live_report() -> GameQueryReport {
    GameQueryReport {
        latency_ms: 12,
        players_online: 1,
        players_max: 10,
        player_names: BTreeSet::from(["alex".to_string()]),
        version: "1.20.4".to_string(),
        software_brand: None,
    }
}

/// Scripted management API. Status results are served in order and the last
/// one repeats once the script runs out.
#[derive(Default)]
pub(crate) struct FakeManagementApi {
    statuses: Mutex<VecDeque<Result<StatusSnapshot, ManagementApiError>>>,
    action_result: Option<Result<(), ManagementApiError>>,
    action_delay: Option<Duration>,
    performed: Mutex<Vec<RemoteAction>>,
    fetches: AtomicUsize,
}

impl FakeManagementApi {
    pub(crate) fn with_statuses(
        mut self,
        statuses: Vec<Result<StatusSnapshot, ManagementApiError>>,
    ) -> Self {
        self.statuses = Mutex::new(statuses.into());
        self
    }

    pub(crate) fn with_action_result(mut self, result: Result<(), ManagementApiError>) -> Self {
        self.action_result = Some(result);
        self
    }

    pub(crate) fn with_action_delay(mut self, delay: Duration) -> Self {
        self.action_delay = Some(delay);
        self
    }

    pub(crate) fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub(crate) fn performed(&self) -> Vec<RemoteAction> {
        self.performed.lock().expect("performed lock").clone()
    }
}

#[async_trait]
impl ManagementApi for FakeManagementApi {
    async fn fetch_status(&self) -> Result<StatusSnapshot, ManagementApiError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let mut statuses = self.statuses.lock().expect("status lock");
        match statuses.len() {
            0 => Ok(StatusSnapshot::default()),
            1 => statuses.front().cloned().expect("last status"),
            _ => statuses.pop_front().expect("next status"),
        }
    }

    async fn perform(&self, action: &RemoteAction) -> Result<(), ManagementApiError> {
        self.performed
            .lock()
            .expect("performed lock")
            .push(action.clone());
        if let Some(delay) = self.action_delay {
            tokio::time::sleep(delay).await;
        }
        self.action_result.clone().unwrap_or(Ok(()))
    }
}

pub(crate) struct FakeGameQuery {
    report: Option<GameQueryReport>,
}

impl FakeGameQuery {
    pub(crate) fn answering(report: GameQueryReport) -> Self {
        Self {
            report: Some(report),
        }
    }

    pub(crate) fn failing() -> Self {
        Self { report: None }
    }
}

#[async_trait]
impl GameQuery for FakeGameQuery {
    async fn query(&self, _host: &str) -> Result<GameQueryReport, GameQueryError> {
        self.report
            .clone()
            .ok_or_else(|| GameQueryError::Protocol("no server".to_string()))
    }
}

#[derive(Default)]
pub(crate) struct RecordingOutbound {
    pub(crate) fail_sends: bool,
    sent: Mutex<Vec<OutboundMessage>>,
    presences: Mutex<Vec<String>>,
}

impl RecordingOutbound {
    pub(crate) fn failing() -> Self {
        Self {
            fail_sends: true,
            ..Self::default()
        }
    }

    pub(crate) fn sent_text(&self) -> Vec<String> {
        self.sent
            .lock()
            .expect("sent lock")
            .iter()
            .map(OutboundMessage::plain_text)
            .collect()
    }

    pub(crate) fn presences(&self) -> Vec<String> {
        self.presences.lock().expect("presence lock").clone()
    }
}

#[async_trait]
impl ChatOutbound for RecordingOutbound {
    async fn send(&self, message: OutboundMessage) -> Result<()> {
        if self.fail_sends {
            bail!("channel unavailable");
        }
        self.sent.lock().expect("sent lock").push(message);
        Ok(())
    }

    async fn set_presence(&self, presence: &str) -> Result<()> {
        self.presences
            .lock()
            .expect("presence lock")
            .push(presence.to_string());
        Ok(())
    }
}
