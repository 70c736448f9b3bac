//! Artifact — a deliverable produced by one agent turn.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::message::Part;

/// An artifact produced by a task. Artifacts are appended to a task's
/// artifact list in production order and never rewritten.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Server-generated unique identifier.
    pub artifact_id: String,

    /// The wire-form content parts of this artifact.
    pub parts: Vec<Part>,
}

impl Artifact {
    pub fn new(parts: Vec<Part>) -> Self {
        Self {
            artifact_id: Uuid::new_v4().to_string(),
            parts,
        }
    }
}
