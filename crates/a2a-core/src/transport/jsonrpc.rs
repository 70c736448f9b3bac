//! JSON-RPC 2.0 envelope — the wire protocol this server speaks.
//!
//! All five A2A operations (`message/send`, `message/stream`, `tasks/get`,
//! `tasks/cancel`, `tasks/list`) are JSON-RPC 2.0 requests over HTTP.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC 2.0 protocol version.
pub const JSONRPC_VERSION: &str = "2.0";

/// Media type for the A2A JSON-RPC envelope.
pub const A2A_MEDIA_TYPE: &str = "application/a2a+json";

/// The five JSON-RPC method names this server implements.
pub mod methods {
    pub const SEND_MESSAGE: &str = "message/send";
    pub const SEND_STREAMING_MESSAGE: &str = "message/stream";
    pub const GET_TASK: &str = "tasks/get";
    pub const CANCEL_TASK: &str = "tasks/cancel";
    pub const LIST_TASKS: &str = "tasks/list";
}

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    pub id: RequestId,
}

impl JsonRpcRequest {
    pub fn new(method: impl Into<String>, id: RequestId, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            method: method.into(),
            params,
            id,
        }
    }
}

/// A JSON-RPC 2.0 response: exactly one of `result` or `error` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: RequestId,
}

impl JsonRpcResponse {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(id: RequestId, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            result: None,
            error: Some(error),
            id,
        }
    }
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// Build the wire error object for an [`crate::error::A2AError`],
    /// using its fixed `rpc_code` and the standard JSON-RPC message text
    /// for that code family.
    pub fn from_a2a_error(err: &crate::error::A2AError) -> Self {
        let code = err.rpc_code();
        let message = match code {
            -32700 => "Parse error",
            -32601 => "Method not found",
            -32602 => "Invalid params",
            -32001 => "Task not found",
            _ => "Internal error",
        };
        Self {
            code,
            message: message.into(),
            data: Some(Value::String(err.to_string())),
        }
    }
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JSON-RPC error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for JsonRpcError {}

/// JSON-RPC request identifier (a number or a string).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
    Null,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::A2AError;

    #[test]
    fn request_round_trips() {
        let req = JsonRpcRequest::new(
            methods::SEND_MESSAGE,
            RequestId::Number(1),
            Some(serde_json::json!({"message": {"role": "user", "parts": []}})),
        );
        let json = serde_json::to_string(&req).unwrap();
        let parsed: JsonRpcRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.method, "message/send");
    }

    #[test]
    fn response_success_has_no_error() {
        let resp = JsonRpcResponse::success(RequestId::Number(1), serde_json::json!({"id": "t1"}));
        assert!(resp.error.is_none());
        assert!(resp.result.is_some());
    }

    #[test]
    fn error_codes_match_the_spec_taxonomy() {
        assert_eq!(
            JsonRpcError::from_a2a_error(&A2AError::ParseError("x".into())).code,
            -32700
        );
        assert_eq!(
            JsonRpcError::from_a2a_error(&A2AError::MethodNotFound("x".into())).code,
            -32601
        );
        assert_eq!(
            JsonRpcError::from_a2a_error(&A2AError::InvalidParams("x".into())).code,
            -32602
        );
        assert_eq!(
            JsonRpcError::from_a2a_error(&A2AError::TaskNotFound("x".into())).code,
            -32001
        );
        assert_eq!(
            JsonRpcError::from_a2a_error(&A2AError::Internal("x".into())).code,
            -32000
        );
    }
}
