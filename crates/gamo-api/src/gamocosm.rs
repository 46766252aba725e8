//! HTTP client for the Gamocosm per-server management API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde::Deserialize;

use crate::status::parse_status_payload;
use crate::{ManagementApi, ManagementApiError, RemoteAction, StatusSnapshot};

pub const DEFAULT_GAMOCOSM_API_BASE: &str = "https://gamocosm.com";
const ERROR_BODY_PREVIEW_CHARS: usize = 320;

#[derive(Debug, Clone)]
/// Public struct `GamocosmConfig` used across gamo components.
pub struct GamocosmConfig {
    pub api_base: String,
    pub server_id: String,
    pub api_key: String,
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ActionResponse {
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone)]
/// Management API client bound to one server.
///
/// Each call is a single attempt; failures are returned to the caller as-is.
pub struct GamocosmClient {
    http: reqwest::Client,
    server_root: String,
}

impl GamocosmClient {
    pub fn new(config: GamocosmConfig) -> Result<Self, ManagementApiError> {
        let server_id = config.server_id.trim();
        let api_key = config.api_key.trim();
        if server_id.is_empty() {
            return Err(ManagementApiError::InvalidConfiguration(
                "server id must not be empty".to_string(),
            ));
        }
        if api_key.is_empty() {
            return Err(ManagementApiError::InvalidConfiguration(
                "api key must not be empty".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("gamo-bot"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.request_timeout_ms.max(1)))
            .build()
            .map_err(|error| {
                ManagementApiError::InvalidConfiguration(format!(
                    "failed to create http client: {error}"
                ))
            })?;

        let api_base = config.api_base.trim().trim_end_matches('/');
        let api_base = if api_base.is_empty() {
            DEFAULT_GAMOCOSM_API_BASE
        } else {
            api_base
        };
        Ok(Self {
            http,
            server_root: format!("{api_base}/servers/{server_id}/api/{api_key}"),
        })
    }

    fn endpoint(&self, verb: &str) -> String {
        format!("{}/{verb}", self.server_root)
    }

    async fn read_body(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<(reqwest::StatusCode, String), ManagementApiError> {
        // reqwest errors embed the request URL, which carries the api key.
        let response = request
            .send()
            .await
            .map_err(|error| unavailable(operation, error.without_url().to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| unavailable(operation, error.without_url().to_string()))?;
        tracing::debug!(
            operation = operation,
            status = status.as_u16(),
            body_bytes = body.len(),
            "management api call completed"
        );
        Ok((status, body))
    }
}

#[async_trait]
impl ManagementApi for GamocosmClient {
    async fn fetch_status(&self) -> Result<StatusSnapshot, ManagementApiError> {
        let (status, body) = self
            .read_body("status", self.http.get(self.endpoint("status")))
            .await?;
        if !status.is_success() {
            return Err(unavailable(
                "status",
                format!(
                    "status {}: {}",
                    status.as_u16(),
                    truncate_for_error(&body, ERROR_BODY_PREVIEW_CHARS)
                ),
            ));
        }
        parse_status_payload(&body)
    }

    async fn perform(&self, action: &RemoteAction) -> Result<(), ManagementApiError> {
        let operation = action.verb();
        let request = self.http.post(self.endpoint(operation));
        let request = match action {
            RemoteAction::Command(command) => request.form(&[("command", command.as_str())]),
            _ => request.form(&[] as &[(&str, &str)]),
        };
        let (status, body) = self.read_body(operation, request).await?;

        let decoded = serde_json::from_str::<ActionResponse>(&body);
        if let Ok(ActionResponse {
            error: Some(reason),
        }) = &decoded
        {
            if !reason.is_empty() {
                return Err(ManagementApiError::RemoteActionFailed(reason.clone()));
            }
        }
        if !status.is_success() {
            return Err(unavailable(
                operation,
                format!(
                    "status {}: {}",
                    status.as_u16(),
                    truncate_for_error(&body, ERROR_BODY_PREVIEW_CHARS)
                ),
            ));
        }
        decoded
            .map(|_| ())
            .map_err(|error| ManagementApiError::MalformedResponse {
                operation: operation.to_string(),
                reason: error.to_string(),
            })
    }
}

fn unavailable(operation: &str, reason: String) -> ManagementApiError {
    ManagementApiError::RemoteUnavailable {
        operation: operation.to_string(),
        reason,
    }
}

fn truncate_for_error(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let mut truncated = value.chars().take(max_chars).collect::<String>();
    truncated.push_str("...");
    truncated
}
