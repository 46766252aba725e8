use std::collections::BTreeSet;
use std::future::Future;
use std::io;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use mc_query::status::data::StatusResponse;

use crate::{GameQuery, GameQueryError, GameQueryReport, ServerAddress, DEFAULT_GAME_PORT};

const VANILLA_BRAND: &str = "vanilla";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Public struct `MinecraftQueryConfig` used across gamo components.
pub struct MinecraftQueryConfig {
    pub timeout: Duration,
    /// UDP query port; the game port is used when unset.
    pub query_port: Option<u16>,
}

impl Default for MinecraftQueryConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(3),
            query_port: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PingSummary {
    version: String,
    players_online: u32,
    players_max: u32,
    sample_names: Vec<String>,
}

impl PingSummary {
    fn from_status(status: StatusResponse) -> Self {
        let players = status.players;
        Self {
            version: status.version.name,
            players_online: u32::try_from(players.online).unwrap_or(u32::MAX),
            players_max: u32::try_from(players.max).unwrap_or(u32::MAX),
            sample_names: players
                .sample
                .into_iter()
                .flatten()
                .map(|player| player.name)
                .filter(|name| !name.trim().is_empty())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FullStatSummary {
    players: Vec<String>,
    software_brand: String,
}

/// Brand parsed from the full-stat `plugins` value (`"<brand>: <plugin>; <plugin>"`).
fn software_brand(plugins: &str) -> String {
    let plugins = plugins.trim();
    if plugins.is_empty() {
        return VANILLA_BRAND.to_string();
    }
    plugins
        .split_once(':')
        .map(|(brand, _)| brand)
        .unwrap_or(plugins)
        .trim()
        .to_string()
}

fn merge_report(
    latency_ms: u64,
    ping: PingSummary,
    full: Option<FullStatSummary>,
) -> GameQueryReport {
    let (player_names, software_brand) = match full {
        Some(full) => (
            full.players.into_iter().collect::<BTreeSet<_>>(),
            Some(full.software_brand),
        ),
        None => (ping.sample_names.into_iter().collect(), None),
    };
    GameQueryReport {
        latency_ms,
        players_online: ping.players_online,
        players_max: ping.players_max,
        player_names,
        version: ping.version,
        software_brand,
    }
}

fn query_error(error: io::Error) -> GameQueryError {
    match error.kind() {
        io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => {
            GameQueryError::Protocol(error.to_string())
        }
        _ => GameQueryError::Io(error),
    }
}

#[derive(Debug, Clone, Default)]
/// Queries a Minecraft server with the status ping, enriched by the UDP query when enabled.
pub struct MinecraftQueryClient {
    config: MinecraftQueryConfig,
}

impl MinecraftQueryClient {
    pub fn new(config: MinecraftQueryConfig) -> Self {
        Self { config }
    }

    async fn with_timeout<T, F>(&self, future: F) -> Result<T, GameQueryError>
    where
        F: Future<Output = io::Result<T>>,
    {
        let timeout_ms = u64::try_from(self.config.timeout.as_millis()).unwrap_or(u64::MAX);
        tokio::time::timeout(self.config.timeout, future)
            .await
            .map_err(|_| GameQueryError::Timeout(timeout_ms))?
            .map_err(query_error)
    }
}

#[async_trait]
impl GameQuery for MinecraftQueryClient {
    async fn query(&self, host: &str) -> Result<GameQueryReport, GameQueryError> {
        let address = ServerAddress::parse(host, DEFAULT_GAME_PORT)?;
        let (target, game_port) = address.socket_target();

        let started = Instant::now();
        let status = self
            .with_timeout(mc_query::status::status(target, game_port))
            .await?;
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let query_port = self.config.query_port.unwrap_or(game_port);
        let full = match self
            .with_timeout(mc_query::query::stat_full(target, query_port))
            .await
        {
            Ok(full) => Some(FullStatSummary {
                software_brand: software_brand(&full.plugins),
                players: full.players,
            }),
            Err(error) => {
                tracing::debug!(
                    host = %target,
                    port = query_port,
                    error = %error,
                    "full stat query unavailable, using status ping sample"
                );
                None
            }
        };

        Ok(merge_report(latency_ms, PingSummary::from_status(status), full))
    }
}
