//! Client for the remote game-server management API.
//!
//! Exposes the normalized [`StatusSnapshot`], the mutating [`RemoteAction`]
//! calls, and the [`ManagementApi`] trait seam used by the bot core.

mod gamocosm;
mod status;
mod types;

pub use gamocosm::{GamocosmClient, GamocosmConfig, DEFAULT_GAMOCOSM_API_BASE};
pub use status::{normalize_status_payload, parse_status_payload, RawStatusResponse};
pub use types::{
    ManagementApi, ManagementApiError, RemoteAction, StatusSnapshot, MISSING_FIELD_PLACEHOLDER,
};
