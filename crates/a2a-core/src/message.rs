//! Message — communication units exchanged with an agent, and Part, the
//! wire-level content unit they carry.
//!
//! A [`Part`] is a bag of optional fields rather than a tagged enum: the
//! populated field *is* the tag. Exactly one of `text`, `url`, `data`, or
//! `raw` should be set; [`crate::part_codec`] is responsible for enforcing
//! that and rejecting anything else.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A message exchanged between a client and an agent.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique identifier for this message. Server-generated if omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,

    /// Role of the sender.
    pub role: MessageRole,

    /// Context this message belongs to. Generated by the server on the
    /// first message of a conversation if omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,

    /// Content parts of the message.
    pub parts: Vec<Part>,

    /// Optional metadata, propagated verbatim into the Conversation
    /// invocation (e.g. trace identifiers set by the caller).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Message {
    /// Build an agent-authored message with a single text part — the
    /// shape used for status messages (`failed`, `input_required`, ...).
    pub fn agent_text(context_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            message_id: Some(Uuid::new_v4().to_string()),
            role: MessageRole::Agent,
            context_id: Some(context_id.into()),
            parts: vec![Part::text(text)],
            metadata: None,
        }
    }
}

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Agent,
}

/// A wire-level content unit.
///
/// Exactly one of `text`, `url`, `data`, or `raw` must be set. `data` must
/// be a base64-encoded JSON string; a structured JSON value there is
/// rejected by the codec. `filename` and `metadata` are accepted for
/// compatibility but dropped during translation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Vec<u8>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn url(url: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            media_type: Some(media_type.into()),
            ..Default::default()
        }
    }

    /// A part whose `data` is a base64-encoded string.
    pub fn base64_data(data: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            data: Some(serde_json::Value::String(data.into())),
            media_type: Some(media_type.into()),
            ..Default::default()
        }
    }

    pub fn raw(raw: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self {
            raw: Some(raw),
            media_type: Some(media_type.into()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_round_trips_with_single_text_part() {
        let msg = Message {
            message_id: Some("m-1".into()),
            role: MessageRole::User,
            context_id: Some("ctx-1".into()),
            parts: vec![Part::text("hello")],
            metadata: None,
        };
        let json = serde_json::to_string(&msg).unwrap();
        let parsed: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.parts.len(), 1);
        assert_eq!(parsed.parts[0].text.as_deref(), Some("hello"));
    }

    #[test]
    fn part_variants_serialize_only_the_populated_field() {
        let url_part = Part::url("https://example.com/a.pdf", "application/pdf");
        let json = serde_json::to_value(&url_part).unwrap();
        assert!(json.get("text").is_none());
        assert!(json.get("url").is_some());
    }
}
