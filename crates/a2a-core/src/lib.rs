//! # a2a-core
//!
//! Wire and domain types for the Agent-to-Agent (A2A) protocol: the
//! JSON-RPC envelope, the Task lifecycle state machine, messages and
//! their content parts, and the codec that translates between them.
//!
//! This crate has no server logic — it is the vocabulary `a2a-server`
//! builds on. See that crate for the dispatcher, task runner,
//! conversation cache, and HTTP surface.

pub mod agent_card;
pub mod artifact;
pub mod content;
pub mod error;
pub mod message;
pub mod part_codec;
pub mod task;
pub mod transport;

pub use agent_card::{
    AgentCapabilities, AgentCard, AgentInterface, AgentProvider, AgentSkill, ContentType,
    ProtocolBinding, SecurityScheme,
};
pub use artifact::Artifact;
pub use content::{ContentPart, Media, MediaKind};
pub use error::{A2AError, A2AResult};
pub use message::{Message, MessageRole, Part};
pub use task::{
    InvalidTransition, Task, TaskArtifactUpdateEvent, TaskListParams, TaskState, TaskStatus,
    TaskStatusUpdateEvent,
};
pub use transport::jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId};
pub use transport::sse::StreamEvent;
