use crate::Cli;

/// Masks a secret, keeping only its length visible.
pub fn redact_secret(value: &str) -> String {
    if value.is_empty() {
        "<unset>".to_string()
    } else {
        format!("<redacted:{} chars>", value.chars().count())
    }
}

impl Cli {
    /// One-line effective configuration with credentials masked.
    pub fn redacted_summary(&self) -> String {
        format!(
            "server_id={} api_key={} discord_token={} discord_channel={} command_prefix={} public_host={} api_base={} poll_interval_seconds={} request_timeout_ms={} query_timeout_ms={} query_port={}",
            self.server_id,
            redact_secret(&self.api_key),
            redact_secret(&self.discord_token),
            self.discord_channel,
            self.command_prefix,
            self.public_host().unwrap_or_else(|| "-".to_string()),
            self.api_base,
            self.poll_interval_seconds,
            self.request_timeout_ms,
            self.query_timeout_ms,
            self.query_port
                .map(|port| port.to_string())
                .unwrap_or_else(|| "game-port".to_string()),
        )
    }
}
