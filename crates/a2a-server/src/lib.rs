//! # a2a-server
//!
//! Server core for the Agent-to-Agent (A2A) protocol: the task lifecycle
//! state machine, a per-context conversation cache, a JSON-RPC
//! dispatcher, SSE streaming, and an axum HTTP surface, built on the
//! wire types in `a2a-core`.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use a2a_server::config::ServerConfig;
//! use a2a_server::conversation::EchoOpener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     a2a_server::telemetry::init_telemetry(&Default::default())?;
//!     let config = ServerConfig::new(Arc::new(EchoOpener));
//!     a2a_server::run(config).await
//! }
//! ```

pub mod config;
pub mod conversation;
pub mod dispatcher;
pub mod http;
pub mod runner;
pub mod store;
pub mod streaming;
pub mod telemetry;
pub mod trace_context;

use std::sync::Arc;

pub use config::ServerConfig;
pub use dispatcher::AppState;
pub use store::{InMemoryTaskStore, StoreError, TaskStore};

/// Wire up `AppState` from `config` and serve until a graceful shutdown
/// completes.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let state = Arc::new(AppState::from_config(&config));
    http::serve(config, state).await
}
