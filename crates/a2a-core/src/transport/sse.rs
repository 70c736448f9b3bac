//! SSE (Server-Sent Events) wire event — the envelope emitted for
//! `message/stream`.
//!
//! The streaming handler in `a2a-server` frames one of these per SSE
//! event; sharing the type here keeps the streaming and blocking result
//! shapes consistent (per the JSON-RPC `result` type reuse noted in the
//! design notes).

use serde::{Deserialize, Serialize};

use crate::task::{TaskArtifactUpdateEvent, TaskStatusUpdateEvent};

/// One event in a `message/stream` SSE response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum StreamEvent {
    StatusUpdate(TaskStatusUpdateEvent),
    ArtifactUpdate(TaskArtifactUpdateEvent),
}

impl StreamEvent {
    /// The SSE `event:` field name for this event.
    pub fn event_name(&self) -> &'static str {
        match self {
            StreamEvent::StatusUpdate(_) => "status-update",
            StreamEvent::ArtifactUpdate(_) => "artifact-update",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{TaskState, TaskStatus};
    use chrono::Utc;

    #[test]
    fn status_update_event_names_and_serializes() {
        let event = StreamEvent::StatusUpdate(TaskStatusUpdateEvent {
            task_id: "t-1".into(),
            status: TaskStatus {
                state: TaskState::Completed,
                timestamp: Utc::now(),
                message: None,
            },
            r#final: true,
        });
        assert_eq!(event.event_name(), "status-update");
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"final\":true"));
    }
}
