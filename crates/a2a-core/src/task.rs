//! Task — the stateful unit of work exposed by an A2A server.
//!
//! A Task represents one agent-turn invocation. It moves through a small
//! state machine with a fixed set of legal edges; every other `from -> to`
//! pair is rejected by [`Task::transition`].
//!
//! ```text
//! SUBMITTED ──────> WORKING ──────> COMPLETED   (terminal)
//!     │                │    ╲─────> FAILED      (terminal)
//!     │                │    ╲─────> REJECTED    (terminal)
//!     │                │    ╲─────> INPUT_REQUIRED ─┐
//!     │                │    ╲─────> AUTH_REQUIRED ──┤
//!     └────────────────┴───────────> CANCELED (terminal, from any non-terminal state)
//!                       <──────────────────────────┘ (back to WORKING)
//! ```

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::artifact::Artifact;
use crate::message::Message;

/// A Task — the fundamental unit of work in A2A.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier for this task, server-generated.
    pub id: String,

    /// Context grouping related tasks for conversation reuse.
    pub context_id: String,

    /// Current status (state, timestamp, and an optional status message).
    pub status: TaskStatus,

    /// Artifacts produced by the task so far. Append-only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<Artifact>,

    /// Retained message trail. Accepted but not enforced or trimmed by
    /// the core (history trimming by length is out of scope).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<Message>,

    /// Optional metadata attached to the task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// The task's current state plus the timestamp it was set and an optional
/// status-carrying message (e.g. the error text on `failed`).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    pub state: TaskState,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
}

impl TaskStatus {
    fn new(state: TaskState) -> Self {
        Self {
            state,
            timestamp: Utc::now(),
            message: None,
        }
    }
}

impl Task {
    /// Create a new task in `submitted` state for the given context.
    pub fn new(context_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            context_id: context_id.into(),
            status: TaskStatus::new(TaskState::Submitted),
            artifacts: Vec::new(),
            history: Vec::new(),
            metadata: None,
        }
    }

    /// Check if the task is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.state.is_terminal()
    }

    /// Attempt to move the task to `new_state`, validating the edge
    /// against the legal transition graph. On success, sets an optional
    /// status message and refreshes the timestamp.
    pub fn transition(
        &mut self,
        new_state: TaskState,
        message: Option<Message>,
    ) -> Result<(), InvalidTransition> {
        if !self.status.state.can_transition_to(&new_state) {
            return Err(InvalidTransition {
                from: self.status.state.clone(),
                to: new_state,
            });
        }
        self.status = TaskStatus {
            state: new_state,
            timestamp: Utc::now(),
            message,
        };
        Ok(())
    }

    /// Append artifacts produced by the current turn. Callers must not
    /// call this once the task is terminal; the store enforces this.
    pub fn add_artifacts(&mut self, artifacts: impl IntoIterator<Item = Artifact>) {
        self.artifacts.extend(artifacts);
    }
}

/// The state of a task in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Submitted,
    Working,
    Completed,
    Failed,
    Canceled,
    Rejected,
    InputRequired,
    AuthRequired,
}

impl TaskState {
    /// Whether this state is terminal: no further transitions are legal.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Failed | TaskState::Canceled | TaskState::Rejected
        )
    }

    /// Whether `self -> to` is a legal edge in the transition graph.
    ///
    /// This checks the exact edge, not just "not terminal" — e.g.
    /// `Submitted -> Completed` is illegal even though `Submitted` is
    /// non-terminal, because only `working` and `canceled` are reachable
    /// directly from `submitted`.
    pub fn can_transition_to(&self, to: &TaskState) -> bool {
        use TaskState::*;
        matches!(
            (self, to),
            (Submitted, Working)
                | (Submitted, Canceled)
                | (Working, Completed)
                | (Working, Failed)
                | (Working, Canceled)
                | (Working, InputRequired)
                | (Working, AuthRequired)
                | (Working, Rejected)
                | (InputRequired, Working)
                | (InputRequired, Canceled)
                | (AuthRequired, Working)
                | (AuthRequired, Canceled)
        )
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskState::Submitted => "submitted",
            TaskState::Working => "working",
            TaskState::Completed => "completed",
            TaskState::Failed => "failed",
            TaskState::Canceled => "canceled",
            TaskState::Rejected => "rejected",
            TaskState::InputRequired => "input_required",
            TaskState::AuthRequired => "auth_required",
        };
        write!(f, "{s}")
    }
}

/// Error for an illegal task state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: TaskState,
    pub to: TaskState,
}

impl std::fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot transition from {} to {}", self.from, self.to)
    }
}

impl std::error::Error for InvalidTransition {}

/// Parameters for `tasks/list`.
///
/// `status` is accepted for wire compatibility but not applied by the
/// reference store (filtering by status is out of scope).
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub offset: u32,
}

/// An SSE event announcing a task status change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusUpdateEvent {
    pub task_id: String,
    pub status: TaskStatus,
    pub r#final: bool,
}

/// An SSE event announcing a new artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskArtifactUpdateEvent {
    pub task_id: String,
    pub artifact: Artifact,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legal_transitions_from_submitted() {
        assert!(TaskState::Submitted.can_transition_to(&TaskState::Working));
        assert!(TaskState::Submitted.can_transition_to(&TaskState::Canceled));
        assert!(!TaskState::Submitted.can_transition_to(&TaskState::Completed));
        assert!(!TaskState::Submitted.can_transition_to(&TaskState::Failed));
        assert!(!TaskState::Submitted.can_transition_to(&TaskState::InputRequired));
    }

    #[test]
    fn legal_transitions_from_working() {
        for to in [
            TaskState::Completed,
            TaskState::Failed,
            TaskState::Canceled,
            TaskState::InputRequired,
            TaskState::AuthRequired,
            TaskState::Rejected,
        ] {
            assert!(TaskState::Working.can_transition_to(&to), "{to}");
        }
        assert!(!TaskState::Working.can_transition_to(&TaskState::Submitted));
    }

    #[test]
    fn interrupted_states_resume_or_cancel_only() {
        for from in [TaskState::InputRequired, TaskState::AuthRequired] {
            assert!(from.can_transition_to(&TaskState::Working));
            assert!(from.can_transition_to(&TaskState::Canceled));
            assert!(!from.can_transition_to(&TaskState::Completed));
            assert!(!from.can_transition_to(&TaskState::Failed));
        }
    }

    #[test]
    fn terminal_states_have_no_outgoing_edges() {
        for from in [
            TaskState::Completed,
            TaskState::Failed,
            TaskState::Canceled,
            TaskState::Rejected,
        ] {
            for to in [
                TaskState::Submitted,
                TaskState::Working,
                TaskState::Completed,
                TaskState::Failed,
                TaskState::Canceled,
                TaskState::Rejected,
                TaskState::InputRequired,
                TaskState::AuthRequired,
            ] {
                assert!(!from.can_transition_to(&to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn task_transition_rejects_illegal_edge() {
        let mut task = Task::new("ctx-1");
        assert_eq!(task.status.state, TaskState::Submitted);
        let err = task.transition(TaskState::Completed, None).unwrap_err();
        assert_eq!(err.from, TaskState::Submitted);
        assert_eq!(err.to, TaskState::Completed);
    }

    #[test]
    fn task_transition_accepts_legal_edge_and_is_terminal() {
        let mut task = Task::new("ctx-1");
        task.transition(TaskState::Working, None).unwrap();
        task.transition(TaskState::Completed, None).unwrap();
        assert!(task.is_terminal());
        assert!(task.transition(TaskState::Working, None).is_err());
    }

    #[test]
    fn task_serialization_uses_snake_case_states() {
        let task = Task::new("ctx-1");
        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"submitted\""));
        let parsed: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.status.state, TaskState::Submitted);
    }
}
