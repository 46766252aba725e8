use std::time::Duration;

use clap::Parser;

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_port(value: &str) -> Result<u16, String> {
    let parsed = value
        .parse::<u16>()
        .map_err(|error| format!("failed to parse port: {error}"))?;
    if parsed == 0 {
        return Err("port must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_command_prefix(value: &str) -> Result<String, String> {
    if value.is_empty() {
        return Err("command prefix must not be empty".to_string());
    }
    if value.chars().any(char::is_whitespace) {
        return Err("command prefix must not contain whitespace".to_string());
    }
    Ok(value.to_string())
}

fn parse_non_blank(value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("value must not be blank".to_string());
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Clone, Parser)]
#[command(
    name = "gamo-bot",
    about = "Discord bot that watches and controls a Gamocosm-hosted Minecraft server",
    version
)]
/// Public struct `Cli` used across gamo components.
pub struct Cli {
    #[arg(
        long = "server-id",
        env = "GAMO_SERVER_ID",
        value_parser = parse_non_blank,
        help = "Gamocosm server id."
    )]
    pub server_id: String,

    #[arg(
        long = "api-key",
        env = "GAMO_API_KEY",
        hide_env_values = true,
        value_parser = parse_non_blank,
        help = "Gamocosm server API key."
    )]
    pub api_key: String,

    #[arg(
        long = "discord-token",
        env = "GAMO_DISCORD_TOKEN",
        hide_env_values = true,
        value_parser = parse_non_blank,
        help = "Discord bot token."
    )]
    pub discord_token: String,

    #[arg(
        long = "discord-channel",
        env = "GAMO_DISCORD_CHANNEL",
        value_parser = parse_positive_u64,
        help = "Discord channel id that receives status announcements."
    )]
    pub discord_channel: u64,

    #[arg(
        long = "command-prefix",
        env = "GAMO_COMMAND_PREFIX",
        value_parser = parse_command_prefix,
        help = "Prefix that marks a chat message as a bot command, for example '!'."
    )]
    pub command_prefix: String,

    #[arg(
        long = "public-host",
        env = "GAMO_PUBLIC_HOST",
        help = "Hostname players connect to. Defaults to the Gamocosm domain."
    )]
    pub public_host: Option<String>,

    #[arg(
        long = "api-base",
        env = "GAMO_API_BASE",
        default_value = "https://gamocosm.com",
        help = "Base URL of the Gamocosm management API."
    )]
    pub api_base: String,

    #[arg(
        long = "poll-interval-seconds",
        env = "GAMO_POLL_INTERVAL_SECONDS",
        default_value_t = 15,
        value_parser = parse_positive_u64,
        help = "Seconds between status polls."
    )]
    pub poll_interval_seconds: u64,

    #[arg(
        long = "request-timeout-ms",
        env = "GAMO_REQUEST_TIMEOUT_MS",
        default_value_t = 10_000,
        value_parser = parse_positive_u64,
        help = "HTTP timeout for management API requests."
    )]
    pub request_timeout_ms: u64,

    #[arg(
        long = "query-timeout-ms",
        env = "GAMO_QUERY_TIMEOUT_MS",
        default_value_t = 3_000,
        value_parser = parse_positive_u64,
        help = "Timeout for each live game server query."
    )]
    pub query_timeout_ms: u64,

    #[arg(
        long = "query-port",
        env = "GAMO_QUERY_PORT",
        value_parser = parse_port,
        help = "UDP port of the game server query protocol. Defaults to the game port."
    )]
    pub query_port: Option<u16>,
}

impl Cli {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    /// Configured public host; blank values count as unset.
    pub fn public_host(&self) -> Option<String> {
        self.public_host
            .as_deref()
            .map(str::trim)
            .filter(|host| !host.is_empty())
            .map(str::to_string)
    }
}
