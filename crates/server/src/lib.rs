//! HTTP server for the timetravel record store
//!
//! - config: `timetravel.toml` loading
//! - cli: command-line flags layered over the config
//! - telemetry: `tracing` subscriber setup
//! - api: axum router, handlers and error mapping

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod cli;
pub mod config;
pub mod telemetry;

pub use api::{router, ApiError, AppState};
pub use config::{ConfigError, ServerConfig};
