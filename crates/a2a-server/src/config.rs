//! Server configuration.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use a2a_core::AgentCard;

use crate::conversation::ConversationOpener;
use crate::store::{InMemoryTaskStore, TaskStore};

/// Configuration for an A2A HTTP server.
///
/// `opener` has no default beyond the demo echo conversation used by the
/// CLI binary; every other field has a documented default constant.
pub struct ServerConfig {
    pub port: u16,
    pub write_timeout: Duration,
    pub max_body_size: usize,
    pub task_store: Arc<dyn TaskStore>,
    pub agent_card: AgentCard,
    pub opener: Arc<dyn ConversationOpener>,
}

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

impl ServerConfig {
    /// Start from defaults plus the one required collaborator: a
    /// `ConversationOpener`. Everything else can be overridden with the
    /// builder-style `with_*` methods.
    pub fn new(opener: Arc<dyn ConversationOpener>) -> Self {
        let agent_card = AgentCard::minimal(
            "a2a-server",
            format!("http://localhost:{DEFAULT_PORT}/a2a")
                .parse()
                .expect("default endpoint URL is always valid"),
        );
        Self {
            port: DEFAULT_PORT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            task_store: Arc::new(InMemoryTaskStore::new()),
            agent_card,
            opener,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_write_timeout(mut self, d: Duration) -> Self {
        self.write_timeout = d;
        self
    }

    pub fn with_max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }

    pub fn with_task_store(mut self, store: Arc<dyn TaskStore>) -> Self {
        self.task_store = store;
        self
    }

    pub fn with_agent_card(mut self, card: AgentCard) -> Self {
        self.agent_card = card;
        self
    }
}

/// Telemetry/observability configuration, independent of the HTTP
/// surface so it can be initialized before the server is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Whether to export spans via OTLP in addition to logging.
    #[serde(default)]
    pub otlp_enabled: bool,

    /// OTLP exporter endpoint.
    #[serde(default = "default_otlp_endpoint")]
    pub otlp_endpoint: String,

    /// Emit logs as JSON instead of the human-readable format.
    #[serde(default = "default_true")]
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            otlp_enabled: false,
            otlp_endpoint: default_otlp_endpoint(),
            json: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_otlp_endpoint() -> String {
    "http://localhost:4317".into()
}
