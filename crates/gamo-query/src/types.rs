use std::collections::BTreeSet;

use async_trait::async_trait;
use thiserror::Error;

pub const DEFAULT_GAME_PORT: u16 = 25_565;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Live data read from a running game server.
pub struct GameQueryReport {
    pub latency_ms: u64,
    pub players_online: u32,
    pub players_max: u32,
    pub player_names: BTreeSet<String>,
    pub version: String,
    /// Server software brand; `None` when the full-stat query was unavailable.
    pub software_brand: Option<String>,
}

#[derive(Debug, Error)]
/// Enumerates supported `GameQueryError` values.
pub enum GameQueryError {
    #[error("invalid server address '{0}'")]
    InvalidAddress(String),
    #[error("game query io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("game query timed out after {0} ms")]
    Timeout(u64),
    #[error("game query protocol error: {0}")]
    Protocol(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Host/port pair of a game server.
pub struct ServerAddress {
    pub host: String,
    pub port: u16,
}

impl ServerAddress {
    /// Parses `host`, `host:port`, a bare IPv6 address, or `[v6]:port`,
    /// falling back to `default_port`.
    pub fn parse(raw: &str, default_port: u16) -> Result<Self, GameQueryError> {
        let invalid = || GameQueryError::InvalidAddress(raw.to_string());
        let parse_port = |port: &str| port.parse::<u16>().map_err(|_| invalid());
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "-" {
            return Err(invalid());
        }
        let (host, port) = if let Some(bracketed) = trimmed.strip_prefix('[') {
            let (host, tail) = bracketed.split_once(']').ok_or_else(invalid)?;
            match tail {
                "" => (host, default_port),
                _ => (host, parse_port(tail.strip_prefix(':').ok_or_else(invalid)?)?),
            }
        } else if trimmed.matches(':').count() > 1 {
            (trimmed, default_port)
        } else {
            match trimmed.split_once(':') {
                Some((host, port)) => (host, parse_port(port)?),
                None => (trimmed, default_port),
            }
        };
        if host.is_empty() || port == 0 {
            return Err(invalid());
        }
        Ok(Self {
            host: host.to_string(),
            port,
        })
    }

    pub fn socket_target(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

#[async_trait]
/// Trait contract for querying live game-server data.
pub trait GameQuery: Send + Sync {
    async fn query(&self, host: &str) -> Result<GameQueryReport, GameQueryError>;
}
