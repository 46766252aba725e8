use async_trait::async_trait;
use thiserror::Error;

/// Placeholder used for textual status fields the management API left out.
pub const MISSING_FIELD_PLACEHOLDER: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Normalized status of the remote server as reported by one `GET status` call.
///
/// Every field has a value once constructed; see [`crate::normalize_status_payload`]
/// for the defaults applied to absent fields.
pub struct StatusSnapshot {
    pub server_up: bool,
    pub pending_operation: Option<String>,
    pub domain: String,
    pub ip: String,
    pub game_up: bool,
    pub download_url: Option<String>,
}

impl StatusSnapshot {
    /// Pending operation label, or `"none"` when nothing is in progress.
    pub fn pending_operation_label(&self) -> &str {
        self.pending_operation.as_deref().unwrap_or("none")
    }
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self {
            server_up: false,
            pending_operation: None,
            domain: MISSING_FIELD_PLACEHOLDER.to_string(),
            ip: MISSING_FIELD_PLACEHOLDER.to_string(),
            game_up: false,
            download_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Enumerates the mutating calls exposed by the management API.
pub enum RemoteAction {
    Start,
    Stop,
    Reboot,
    Pause,
    Resume,
    Backup,
    Command(String),
}

impl RemoteAction {
    /// Endpoint verb appended to the server API root.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Reboot => "reboot",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Backup => "backup",
            Self::Command(_) => "command",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Enumerates supported `ManagementApiError` values.
pub enum ManagementApiError {
    #[error("management api {operation} unavailable: {reason}")]
    RemoteUnavailable { operation: String, reason: String },
    #[error("management api {operation} returned a malformed response: {reason}")]
    MalformedResponse { operation: String, reason: String },
    #[error("invalid management api configuration: {0}")]
    InvalidConfiguration(String),
    /// The API accepted the request and reported a failure; the reason is kept verbatim.
    #[error("{0}")]
    RemoteActionFailed(String),
}

#[async_trait]
/// Trait contract for the remote server management API.
pub trait ManagementApi: Send + Sync {
    async fn fetch_status(&self) -> Result<StatusSnapshot, ManagementApiError>;

    async fn perform(&self, action: &RemoteAction) -> Result<(), ManagementApiError>;
}
