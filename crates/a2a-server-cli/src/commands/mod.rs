//! CLI flags for the `a2a-server` binary.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use a2a_core::AgentCard;
use a2a_server::config::{
    ServerConfig, TelemetryConfig, DEFAULT_MAX_BODY_SIZE, DEFAULT_PORT, DEFAULT_WRITE_TIMEOUT,
};
use a2a_server::conversation::EchoOpener;

/// Serve an Agent-to-Agent (A2A) JSON-RPC endpoint.
#[derive(Parser)]
#[command(name = "a2a-server", version, about = "Serve an A2A protocol endpoint")]
pub struct Cli {
    /// TCP port to listen on.
    #[arg(long, env = "A2A_SERVER_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// HTTP write timeout, in seconds.
    #[arg(long, env = "A2A_SERVER_WRITE_TIMEOUT_SECS", default_value_t = DEFAULT_WRITE_TIMEOUT.as_secs())]
    pub write_timeout_secs: u64,

    /// Maximum accepted request body size, in bytes.
    #[arg(long, env = "A2A_SERVER_MAX_BODY_SIZE", default_value_t = DEFAULT_MAX_BODY_SIZE)]
    pub max_body_size: usize,

    /// Path to a JSON Agent Card to serve verbatim at
    /// `/.well-known/agent.json`. Defaults to a minimal generated card.
    #[arg(long, env = "A2A_SERVER_AGENT_CARD")]
    pub agent_card: Option<PathBuf>,

    /// Export spans via OTLP in addition to logging.
    #[arg(long, env = "A2A_SERVER_OTLP_ENABLED")]
    pub otlp_enabled: bool,

    /// OTLP exporter endpoint.
    #[arg(long, env = "A2A_SERVER_OTLP_ENDPOINT", default_value = "http://localhost:4317")]
    pub otlp_endpoint: String,

    /// Emit logs as JSON instead of the human-readable format.
    #[arg(long, env = "A2A_SERVER_JSON_LOGS")]
    pub json_logs: bool,
}

/// Build a `ServerConfig` from parsed flags and run the server until a
/// graceful shutdown completes.
pub async fn execute(cli: Cli) -> anyhow::Result<()> {
    let telemetry = TelemetryConfig {
        otlp_enabled: cli.otlp_enabled,
        otlp_endpoint: cli.otlp_endpoint.clone(),
        json: cli.json_logs,
    };
    a2a_server::telemetry::init_telemetry(&telemetry)?;

    let mut config = ServerConfig::new(Arc::new(EchoOpener))
        .with_port(cli.port)
        .with_write_timeout(Duration::from_secs(cli.write_timeout_secs))
        .with_max_body_size(cli.max_body_size);

    if let Some(path) = &cli.agent_card {
        let raw = fs::read_to_string(path)?;
        let card: AgentCard = serde_json::from_str(&raw)?;
        card.validate()?;
        config = config.with_agent_card(card);
    }

    a2a_server::run(config).await
}
