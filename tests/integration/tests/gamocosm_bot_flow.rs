use std::{sync::Arc, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use gamo_api::{GamocosmClient, GamocosmConfig};
use gamo_core::{
    start_status_poll_scheduler, ChatOutbound, CommandDispatcher, CommandInvocation,
    DispatcherSettings, OutboundMessage, PollSchedulerConfig, StatusPoller,
};
use gamo_query::{MinecraftQueryClient, MinecraftQueryConfig};
use httpmock::prelude::*;
use httpmock::Mock;
use serde_json::{json, Value};
use tokio::sync::{watch, Mutex as AsyncMutex};

const API_ROOT: &str = "/servers/srv-7/api/key-7";

#[derive(Default)]
struct RecordingChannel {
    messages: AsyncMutex<Vec<OutboundMessage>>,
    presences: AsyncMutex<Vec<String>>,
}

impl RecordingChannel {
    async fn texts(&self) -> Vec<String> {
        self.messages
            .lock()
            .await
            .iter()
            .map(OutboundMessage::plain_text)
            .collect()
    }
}

#[async_trait]
impl ChatOutbound for RecordingChannel {
    async fn send(&self, message: OutboundMessage) -> Result<()> {
        self.messages.lock().await.push(message);
        Ok(())
    }

    async fn set_presence(&self, presence: &str) -> Result<()> {
        self.presences.lock().await.push(presence.to_string());
        Ok(())
    }
}

fn management_client(server: &MockServer) -> Arc<GamocosmClient> {
    Arc::new(
        GamocosmClient::new(GamocosmConfig {
            api_base: server.base_url(),
            server_id: "srv-7".to_string(),
            api_key: "key-7".to_string(),
            request_timeout_ms: 5_000,
        })
        .expect("management client"),
    )
}

fn dispatcher(server: &MockServer) -> Arc<CommandDispatcher> {
    Arc::new(CommandDispatcher::new(
        management_client(server),
        Arc::new(MinecraftQueryClient::new(MinecraftQueryConfig {
            timeout: Duration::from_millis(300),
            query_port: None,
        })),
        DispatcherSettings {
            prefix: "!".to_string(),
            public_host: None,
        },
    ))
}

fn status_mock<'a>(server: &'a MockServer, body: Value) -> Mock<'a> {
    server.mock(|when, then| {
        when.method(GET).path(format!("{API_ROOT}/status"));
        then.status(200).json_body(body);
    })
}

async fn reply(dispatcher: &CommandDispatcher, text: &str) -> String {
    dispatcher
        .handle(&CommandInvocation {
            caller: "steve#0001".to_string(),
            text: text.to_string(),
            gateway_latency: None,
        })
        .await
        .expect("command reply")
        .plain_text()
}

#[tokio::test]
async fn integration_poll_cycles_announce_server_lifecycle() {
    let server = MockServer::start();
    let channel = Arc::new(RecordingChannel::default());
    let mut poller = StatusPoller::new(management_client(&server), channel.clone(), "!", None);

    let mut current = status_mock(&server, json!({ "server": false, "minecraft": false }));
    let baseline = poller.run_poll_cycle().await;
    assert!(baseline.baseline);

    let steps = [
        json!({ "server": true, "status": "preparing", "minecraft": false }),
        json!({
            "server": true,
            "status": null,
            "minecraft": true,
            "domain": "xyz.gamocosm.com",
            "ip": "198.51.100.4"
        }),
        json!({ "server": true, "status": "saving", "minecraft": false }),
        json!({ "server": false, "status": null, "minecraft": false }),
    ];
    for step in steps {
        current.delete();
        current = status_mock(&server, step);
        let report = poller.run_poll_cycle().await;
        assert!(!report.fetch_failed);
    }

    let texts = channel.texts().await;
    assert_eq!(
        texts,
        vec![
            "VPS is now **up**.".to_string(),
            "Starting the game server, please wait...".to_string(),
            "Game server is now **up**\nCome and join!\nServer address: `xyz.gamocosm.com`\nIP address: `198.51.100.4`".to_string(),
            "Game server is now **down**.".to_string(),
            "VPS is now **down**.".to_string(),
            "Shutdown complete. The world has been saved.".to_string(),
        ]
    );
    assert_eq!(
        channel.presences.lock().await.clone(),
        vec![
            "!help | Server down".to_string(),
            "!help | Server up".to_string(),
            "!help | Server down".to_string(),
        ]
    );
}

#[tokio::test]
async fn regression_poll_outage_does_not_replay_or_lose_transitions() {
    let server = MockServer::start();
    let channel = Arc::new(RecordingChannel::default());
    let mut poller = StatusPoller::new(management_client(&server), channel.clone(), "!", None);

    let mut current = status_mock(&server, json!({ "server": true, "minecraft": false }));
    poller.run_poll_cycle().await;

    current.delete();
    let mut outage = server.mock(|when, then| {
        when.method(GET).path(format!("{API_ROOT}/status"));
        then.status(503).body("maintenance");
    });
    assert!(poller.run_poll_cycle().await.fetch_failed);
    assert!(channel.texts().await.is_empty());

    outage.delete();
    let _recovered = status_mock(&server, json!({ "server": true, "minecraft": true }));
    let report = poller.run_poll_cycle().await;
    assert_eq!(report.events, vec!["game_up"]);
    assert_eq!(channel.texts().await.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn integration_overlapping_stops_are_rejected_until_the_first_finishes() {
    let server = MockServer::start();
    let stop = server.mock(|when, then| {
        when.method(POST).path(format!("{API_ROOT}/stop"));
        then.status(200)
            .delay(Duration::from_millis(400))
            .json_body(json!({ "error": null }));
    });
    let dispatcher = dispatcher(&server);

    let first = {
        let dispatcher = Arc::clone(&dispatcher);
        tokio::spawn(async move { reply(&dispatcher, "!stop").await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    let second = reply(&dispatcher, "!stop").await;
    assert_eq!(
        second,
        "Cannot run `stop` while `stop` is still in progress. Please wait and try again."
    );

    assert_eq!(
        first.await.expect("first stop task"),
        "Action successfully triggered."
    );
    assert_eq!(
        reply(&dispatcher, "!stop").await,
        "Action successfully triggered."
    );
    assert_eq!(stop.calls(), 2);
}

#[tokio::test]
async fn integration_remote_rejection_reason_reaches_the_user_verbatim() {
    let server = MockServer::start();
    let start = server.mock(|when, then| {
        when.method(POST).path(format!("{API_ROOT}/start"));
        then.status(200)
            .json_body(json!({ "error": "insufficient funds" }));
    });
    let dispatcher = dispatcher(&server);

    assert_eq!(reply(&dispatcher, "!start").await, "insufficient funds");
    assert_eq!(start.calls(), 1);
    // The gate was released on the failure path.
    assert_eq!(reply(&dispatcher, "!start").await, "insufficient funds");
}

#[tokio::test]
async fn integration_console_command_forwards_free_text() {
    let server = MockServer::start();
    let command = server.mock(|when, then| {
        when.method(POST)
            .path(format!("{API_ROOT}/command"))
            .body("command=say+hello+everyone");
        then.status(200).json_body(json!({ "error": null }));
    });
    let dispatcher = dispatcher(&server);

    assert_eq!(
        reply(&dispatcher, "!command say hello everyone").await,
        "Action successfully triggered."
    );
    command.assert();
}

#[tokio::test]
async fn functional_status_command_reports_stopped_server() {
    let server = MockServer::start();
    let _status = status_mock(
        &server,
        json!({
            "server": false,
            "status": null,
            "domain": "xyz.gamocosm.com",
            "minecraft": false
        }),
    );
    let dispatcher = dispatcher(&server);

    let text = reply(&dispatcher, "!status").await;
    assert!(text.contains("VPS is **offline**"));
    assert!(text.contains("Pending operations: **none**"));
    assert!(text.contains("IP address: `-`"));
    assert!(text.contains("Game server is **offline**"));
}

#[tokio::test]
async fn integration_scheduler_polls_after_chat_readiness() {
    let server = MockServer::start();
    let status = status_mock(&server, json!({ "server": true, "minecraft": true }));
    let channel = Arc::new(RecordingChannel::default());
    let (ready_tx, ready_rx) = watch::channel(false);

    let mut handle = start_status_poll_scheduler(
        PollSchedulerConfig {
            interval: Duration::from_millis(50),
            ..PollSchedulerConfig::new("!")
        },
        management_client(&server),
        channel.clone(),
        ready_rx,
    )
    .expect("start scheduler");

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(status.calls(), 0);

    let mut reports = handle.subscribe_reports();
    ready_tx.send(true).expect("signal ready");
    tokio::time::timeout(
        Duration::from_secs(5),
        reports.wait_for(|report| report.tick >= 3),
    )
    .await
    .expect("scheduler ticks in time")
    .expect("report channel open");
    handle.shutdown().await;

    assert!(status.calls() >= 3);
    assert!(channel.texts().await.is_empty());
    assert_eq!(
        channel.presences.lock().await.clone(),
        vec!["!help | Server up".to_string()]
    );
}
