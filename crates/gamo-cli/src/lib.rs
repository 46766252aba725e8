//! Process configuration for the gamo bot binary.
//!
//! Every setting is a clap flag backed by a `GAMO_*` environment variable.

pub mod cli_args;
pub mod config_summary;

pub use cli_args::Cli;
pub use config_summary::redact_secret;
