//! Live game-server queries.
//!
//! [`MinecraftQueryClient`] runs a Server List Ping for version and player
//! counts, then tries the UDP full-stat query for the complete player list and
//! server software. A failed full-stat query degrades to the status ping's
//! player sample. Both exchanges are provided by `mc-query`.

mod client;
mod types;

pub use client::{MinecraftQueryClient, MinecraftQueryConfig};
pub use types::{GameQuery, GameQueryError, GameQueryReport, ServerAddress, DEFAULT_GAME_PORT};
