//! A2A protocol error types.

use thiserror::Error;

/// Errors that can occur while parsing, validating, or routing an A2A
/// JSON-RPC request.
///
/// Every variant here has a fixed JSON-RPC error code (see
/// [`A2AError::rpc_code`]); the dispatcher is the only place that turns
/// one of these into a wire error response.
#[derive(Debug, Error)]
pub enum A2AError {
    /// The request body was not valid JSON, or exceeded the configured
    /// size limit.
    #[error("parse error: {0}")]
    ParseError(String),

    /// The requested method name is not one this server implements.
    #[error("method not found: {0}")]
    MethodNotFound(String),

    /// The method's params failed to decode, or a decoded value violates
    /// a semantic constraint (an empty part, a structured `data` field,
    /// a missing required field).
    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// No task exists with the given id.
    #[error("task not found: {0}")]
    TaskNotFound(String),

    /// A store-level transition was rejected because `from -> to` is not
    /// a legal edge in the state machine.
    #[error("invalid task transition: {0}")]
    InvalidTransition(#[from] crate::task::InvalidTransition),

    /// A store-level mutation (state change, artifact append, cancel) was
    /// rejected because the task has already reached a terminal state.
    /// Same wire code as `InvalidTransition`: both describe an illegal
    /// mutation against the task lifecycle.
    #[error("task is terminal: {0}")]
    TaskTerminal(String),

    /// The conversation opener, or some other pre-task-creation step,
    /// failed. Surfaces as a generic internal JSON-RPC error; once a task
    /// exists, failures are encoded as task state instead, never as a
    /// JSON-RPC error.
    #[error("internal error: {0}")]
    Internal(String),

    /// JSON (de)serialization failure outside of the top-level envelope
    /// parse (e.g. encoding a result value).
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl A2AError {
    /// The JSON-RPC error code this error maps to on the wire.
    pub fn rpc_code(&self) -> i64 {
        match self {
            A2AError::ParseError(_) => -32700,
            A2AError::MethodNotFound(_) => -32601,
            A2AError::InvalidParams(_) => -32602,
            A2AError::TaskNotFound(_) => -32001,
            A2AError::InvalidTransition(_) => -32001,
            A2AError::TaskTerminal(_) => -32001,
            A2AError::Internal(_) => -32000,
            A2AError::Serialization(_) => -32700,
        }
    }
}

/// A2A result type alias.
pub type A2AResult<T> = Result<T, A2AError>;
