//! Decoding and normalization of the management API `status` payload.

use serde::Deserialize;

use crate::{ManagementApiError, StatusSnapshot, MISSING_FIELD_PLACEHOLDER};

#[derive(Debug, Clone, Default, Deserialize)]
/// Raw `GET status` body. Unrecognized fields are ignored.
pub struct RawStatusResponse {
    #[serde(default)]
    pub server: Option<bool>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub minecraft: Option<bool>,
    #[serde(default)]
    pub download: Option<String>,
}

/// Decodes a `GET status` body and fills absent fields with their defaults.
pub fn parse_status_payload(body: &str) -> Result<StatusSnapshot, ManagementApiError> {
    let raw = serde_json::from_str::<RawStatusResponse>(body).map_err(|error| {
        ManagementApiError::MalformedResponse {
            operation: "status".to_string(),
            reason: error.to_string(),
        }
    })?;
    Ok(normalize_status_payload(raw))
}

pub fn normalize_status_payload(raw: RawStatusResponse) -> StatusSnapshot {
    StatusSnapshot {
        server_up: raw.server.unwrap_or(false),
        pending_operation: non_blank(raw.status),
        domain: non_blank(raw.domain).unwrap_or_else(|| MISSING_FIELD_PLACEHOLDER.to_string()),
        ip: non_blank(raw.ip).unwrap_or_else(|| MISSING_FIELD_PLACEHOLDER.to_string()),
        game_up: raw.minecraft.unwrap_or(false),
        download_url: non_blank(raw.download),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
