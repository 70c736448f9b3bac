//! Agent Card — the self-describing metadata document for agent discovery.
//!
//! Every A2A server publishes its Agent Card at `/.well-known/agent.json`.
//! The card describes the agent's capabilities, skills, supported
//! interfaces, and security schemes. Unlike a client SDK, this server
//! never fetches a remote card — it only serves its own, verbatim.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// An A2A Agent Card — metadata describing an agent's capabilities.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    /// Human-readable name of the agent.
    pub name: String,

    /// Description of what the agent does.
    pub description: String,

    /// Semantic version of the agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// The provider/organization that created this agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<AgentProvider>,

    /// URL to the agent's icon/logo.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<Url>,

    /// Interfaces supported by this agent (URLs + protocol bindings).
    pub supported_interfaces: Vec<AgentInterface>,

    /// Capabilities declared by this agent.
    #[serde(default)]
    pub capabilities: AgentCapabilities,

    /// Security schemes supported by this agent.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security_schemes: Vec<SecurityScheme>,

    /// Default input content types accepted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_input_modes: Vec<ContentType>,

    /// Default output content types produced.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_output_modes: Vec<ContentType>,

    /// Skills (specific abilities) of this agent.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<AgentSkill>,
}

impl AgentCard {
    /// A minimal card, used as the configuration default: a name, an
    /// empty-but-valid interface list pointed at `endpoint`, and
    /// streaming declared (the server always supports `message/stream`).
    pub fn minimal(name: impl Into<String>, endpoint: Url) -> Self {
        Self {
            name: name.into(),
            description: "An A2A-compatible agent".into(),
            version: None,
            provider: None,
            icon_url: None,
            supported_interfaces: vec![AgentInterface {
                url: endpoint,
                protocol_binding: ProtocolBinding::JsonrpcHttp,
                protocol_version: Some("1.0".into()),
            }],
            capabilities: AgentCapabilities {
                streaming: true,
                ..Default::default()
            },
            security_schemes: vec![],
            default_input_modes: vec![ContentType::text()],
            default_output_modes: vec![ContentType::text()],
            skills: vec![],
        }
    }

    /// Validate that the card has the fields required to be served.
    pub fn validate(&self) -> Result<(), CardValidationError> {
        if self.name.is_empty() {
            return Err(CardValidationError("name is required".into()));
        }
        if self.description.is_empty() {
            return Err(CardValidationError("description is required".into()));
        }
        if self.supported_interfaces.is_empty() {
            return Err(CardValidationError(
                "at least one supported interface is required".into(),
            ));
        }
        Ok(())
    }

    pub fn supports_streaming(&self) -> bool {
        self.capabilities.streaming
    }

    pub fn find_skill(&self, skill_id: &str) -> Option<&AgentSkill> {
        self.skills.iter().find(|s| s.id == skill_id)
    }
}

/// The agent card is missing a field required for it to be served.
#[derive(Debug, Error)]
#[error("invalid agent card: {0}")]
pub struct CardValidationError(pub String);

/// Information about the agent's provider/creator.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentProvider {
    pub organization: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<Url>,
}

/// A supported interface (endpoint + protocol binding).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentInterface {
    pub url: Url,
    pub protocol_binding: ProtocolBinding,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol_version: Option<String>,
}

/// Protocol binding for an A2A interface.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum ProtocolBinding {
    JsonrpcHttp,
    Grpc,
    HttpJson,
    #[serde(untagged)]
    Custom(String),
}

/// Capabilities declared by the agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentCapabilities {
    /// Whether the agent supports SSE streaming (`message/stream`).
    #[serde(default)]
    pub streaming: bool,

    /// Always false: push notifications are out of scope for this
    /// server. Kept on the wire shape for client compatibility.
    #[serde(default)]
    pub push_notifications: bool,

    /// Declared extensions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<AgentExtension>,
}

/// An extension declared by the agent.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentExtension {
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
}

/// A specific skill/ability of the agent.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentSkill {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

/// Content type descriptor.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentType {
    pub media_type: String,
}

impl ContentType {
    pub fn text() -> Self {
        Self {
            media_type: "text/plain".into(),
        }
    }
    pub fn json() -> Self {
        Self {
            media_type: "application/json".into(),
        }
    }
}

/// A security scheme (parity with OpenAPI security schemes).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum SecurityScheme {
    #[serde(rename = "apiKey")]
    ApiKey {
        name: String,
        #[serde(rename = "in")]
        location: ApiKeyLocation,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Http {
        scheme: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        bearer_format: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

/// Location for API key security scheme.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    Header,
    Query,
    Cookie,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_card_is_valid_and_streams() {
        let card = AgentCard::minimal("echo-agent", Url::parse("https://agent.example.com/a2a").unwrap());
        assert!(card.validate().is_ok());
        assert!(card.supports_streaming());
    }

    #[test]
    fn validate_rejects_missing_fields() {
        let mut card = AgentCard::minimal("", Url::parse("https://example.com").unwrap());
        assert!(card.validate().is_err());
        card.name = "test-agent".into();
        card.supported_interfaces.clear();
        assert!(card.validate().is_err());
    }

    #[test]
    fn serialize_round_trip_preserves_skills() {
        let mut card = AgentCard::minimal("summarizer", Url::parse("https://agent.example.com/a2a").unwrap());
        card.skills.push(AgentSkill {
            id: "summarize".into(),
            name: "Document Summarization".into(),
            description: "Summarizes long documents".into(),
            tags: vec!["nlp".into()],
            examples: vec!["Summarize this report".into()],
        });
        let json = serde_json::to_string(&card).unwrap();
        let parsed: AgentCard = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.skills.len(), 1);
        assert_eq!(parsed.skills[0].id, "summarize");
    }
}
