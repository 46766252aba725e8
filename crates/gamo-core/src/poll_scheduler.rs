//! Periodic status polling: fetch, diff, announce, and refresh presence.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use gamo_api::{ManagementApi, StatusSnapshot};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

use crate::notifier::{render_presence, render_transition_event};
use crate::outbound::ChatOutbound;
use crate::transition::{detect, TransitionState};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq)]
/// Public struct `PollSchedulerConfig` used across gamo components.
pub struct PollSchedulerConfig {
    pub interval: Duration,
    pub prefix: String,
    pub public_host: Option<String>,
}

impl PollSchedulerConfig {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            prefix: prefix.into(),
            public_host: None,
        }
    }

    fn interval_ms(&self) -> u64 {
        u64::try_from(self.interval.as_millis()).unwrap_or(u64::MAX)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Outcome of one poll tick.
pub struct PollCycleReport {
    pub tick: u64,
    /// The tick only recorded the initial state.
    pub baseline: bool,
    pub fetch_failed: bool,
    pub events: Vec<&'static str>,
    pub messages_sent: usize,
    pub send_failures: usize,
    pub presence_updated: bool,
}

/// Owns the transition state for the lifetime of the poll task.
pub struct StatusPoller {
    api: Arc<dyn ManagementApi>,
    outbound: Arc<dyn ChatOutbound>,
    prefix: String,
    public_host: Option<String>,
    state: Option<TransitionState>,
    last_presence: Option<String>,
    tick_count: u64,
}

impl StatusPoller {
    pub fn new(
        api: Arc<dyn ManagementApi>,
        outbound: Arc<dyn ChatOutbound>,
        prefix: impl Into<String>,
        public_host: Option<String>,
    ) -> Self {
        Self {
            api,
            outbound,
            prefix: prefix.into(),
            public_host,
            state: None,
            last_presence: None,
            tick_count: 0,
        }
    }

    pub fn state(&self) -> Option<&TransitionState> {
        self.state.as_ref()
    }

    pub async fn run_poll_cycle(&mut self) -> PollCycleReport {
        self.tick_count = self.tick_count.saturating_add(1);
        let mut report = PollCycleReport {
            tick: self.tick_count,
            ..PollCycleReport::default()
        };

        let snapshot = match self.api.fetch_status().await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                tracing::warn!(tick = report.tick, error = %error, "status poll failed");
                report.fetch_failed = true;
                return report;
            }
        };

        let events = match self.state.take() {
            None => {
                report.baseline = true;
                self.state = Some(TransitionState::from_snapshot(&snapshot));
                Vec::new()
            }
            Some(previous) => {
                let (events, updated) = detect(&previous, &snapshot);
                self.state = Some(updated);
                events
            }
        };

        for event in &events {
            report.events.push(event.label());
            let Some(message) =
                render_transition_event(event, &snapshot, self.public_host.as_deref())
            else {
                continue;
            };
            match self.outbound.send(message).await {
                Ok(()) => report.messages_sent += 1,
                Err(error) => {
                    report.send_failures += 1;
                    tracing::warn!(
                        event = event.label(),
                        error = %error,
                        "failed to deliver status notification"
                    );
                }
            }
        }

        self.refresh_presence(&snapshot, &mut report).await;
        tracing::debug!(
            tick = report.tick,
            baseline = report.baseline,
            events = ?report.events,
            messages_sent = report.messages_sent,
            send_failures = report.send_failures,
            presence_updated = report.presence_updated,
            "status poll cycle complete"
        );
        report
    }

    async fn refresh_presence(&mut self, snapshot: &StatusSnapshot, report: &mut PollCycleReport) {
        let presence = render_presence(snapshot, &self.prefix);
        if self.last_presence.as_deref() == Some(presence.as_str()) {
            return;
        }
        match self.outbound.set_presence(&presence).await {
            Ok(()) => {
                self.last_presence = Some(presence);
                report.presence_updated = true;
            }
            Err(error) => {
                tracing::warn!(presence = %presence, error = %error, "failed to update presence");
            }
        }
    }
}

#[derive(Debug)]
/// Public struct `StatusPollHandle` used across gamo components.
pub struct StatusPollHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    reports: watch::Receiver<PollCycleReport>,
}

impl StatusPollHandle {
    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Receiver of the most recent cycle report.
    pub fn subscribe_reports(&self) -> watch::Receiver<PollCycleReport> {
        self.reports.clone()
    }

    pub async fn shutdown(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

/// Spawns the poll loop. Polling starts once `ready` turns true.
pub fn start_status_poll_scheduler(
    config: PollSchedulerConfig,
    api: Arc<dyn ManagementApi>,
    outbound: Arc<dyn ChatOutbound>,
    ready: watch::Receiver<bool>,
) -> Result<StatusPollHandle> {
    if config.interval.is_zero() {
        anyhow::bail!("status poll interval must be greater than zero");
    }
    let handle = tokio::runtime::Handle::try_current()
        .context("status poll scheduler requires an active Tokio runtime")?;

    tracing::info!(
        interval_ms = config.interval_ms(),
        "status poll scheduler started"
    );
    let poller = StatusPoller::new(api, outbound, config.prefix, config.public_host);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let (report_tx, reports) = watch::channel(PollCycleReport::default());
    let task = handle.spawn(run_status_poll_loop(
        poller,
        config.interval,
        ready,
        shutdown_rx,
        report_tx,
    ));
    Ok(StatusPollHandle {
        shutdown_tx: Some(shutdown_tx),
        task: Some(task),
        reports,
    })
}

async fn wait_until_ready(ready: &mut watch::Receiver<bool>) -> bool {
    ready.wait_for(|ready| *ready).await.is_ok()
}

async fn run_status_poll_loop(
    mut poller: StatusPoller,
    period: Duration,
    mut ready: watch::Receiver<bool>,
    mut shutdown_rx: oneshot::Receiver<()>,
    report_tx: watch::Sender<PollCycleReport>,
) {
    tokio::select! {
        is_ready = wait_until_ready(&mut ready) => {
            if !is_ready {
                tracing::warn!("chat readiness signal dropped before ready, status polling disabled");
                return;
            }
        }
        _ = &mut shutdown_rx => return,
    }

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let report = poller.run_poll_cycle().await;
                report_tx.send_replace(report);
            }
            _ = &mut shutdown_rx => {
                tracing::info!(ticks = poller.tick_count, "status poll scheduler stopped");
                break;
            }
        }
    }
}
