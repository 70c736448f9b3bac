//! JSON-RPC dispatcher — parses envelopes, routes the five A2A methods,
//! and maps failures to the exact wire error codes.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use a2a_core::{
    transport::jsonrpc::methods, A2AError, AgentCard, JsonRpcError, JsonRpcRequest,
    JsonRpcResponse, Message, Task, TaskListParams,
};

use crate::conversation::{Conversation, ConversationCache, ConversationOpener};
use crate::runner::TaskRunner;
use crate::store::{StoreError, TaskStore};
use crate::trace_context::TraceContext;

impl From<StoreError> for A2AError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => A2AError::TaskNotFound(id),
            StoreError::InvalidTransition(e) => A2AError::InvalidTransition(e),
            StoreError::Terminal(id) => A2AError::TaskTerminal(id),
            StoreError::AlreadyExists(_) => A2AError::Internal(err.to_string()),
        }
    }
}

/// Shared server state: everything a dispatched request needs.
pub struct AppState {
    pub store: Arc<dyn TaskStore>,
    pub cache: Arc<ConversationCache>,
    pub opener: Arc<dyn ConversationOpener>,
    pub runner: Arc<TaskRunner>,
    pub agent_card: AgentCard,
    pub max_body_size: usize,
    pub root_cancel: CancellationToken,
    task_cancels: Mutex<HashMap<String, CancellationToken>>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn TaskStore>,
        opener: Arc<dyn ConversationOpener>,
        agent_card: AgentCard,
    ) -> Self {
        Self {
            runner: Arc::new(TaskRunner::new(store.clone())),
            store,
            cache: Arc::new(ConversationCache::new()),
            opener,
            agent_card,
            max_body_size: crate::config::DEFAULT_MAX_BODY_SIZE,
            root_cancel: CancellationToken::new(),
            task_cancels: Mutex::new(HashMap::new()),
        }
    }

    /// Build state from a fully-assembled [`crate::config::ServerConfig`].
    pub fn from_config(config: &crate::config::ServerConfig) -> Self {
        Self {
            runner: Arc::new(TaskRunner::new(config.task_store.clone())),
            store: config.task_store.clone(),
            cache: Arc::new(ConversationCache::new()),
            opener: config.opener.clone(),
            agent_card: config.agent_card.clone(),
            max_body_size: config.max_body_size,
            root_cancel: CancellationToken::new(),
            task_cancels: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }

    async fn register_cancel_token(&self, task_id: &str) -> CancellationToken {
        let token = self.root_cancel.child_token();
        self.task_cancels
            .lock()
            .await
            .insert(task_id.to_string(), token.clone());
        token
    }

    async fn cancel_token_for(&self, task_id: &str) -> Option<CancellationToken> {
        self.task_cancels.lock().await.get(task_id).cloned()
    }

    /// Close every cached conversation, aggregating (but not failing on)
    /// individual close errors. Called during graceful shutdown.
    pub async fn close_all_conversations(&self) {
        for conv in self.cache.snapshot().await {
            if let Err(err) = conv.close().await {
                tracing::warn!(error = %err, "conversation close failed during shutdown");
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct SendParams {
    message: Message,
    #[serde(default)]
    configuration: Option<SendConfiguration>,
}

#[derive(Debug, Default, Deserialize)]
struct SendConfiguration {
    #[serde(default)]
    blocking: bool,
}

#[derive(Debug, Deserialize)]
struct TaskIdParams {
    id: String,
}

/// Dispatch one JSON-RPC request and produce its response envelope.
/// `message/stream` is not handled here — the HTTP layer routes it to
/// the streaming handler instead, since its result isn't a single JSON
/// value.
pub async fn dispatch(
    state: &AppState,
    request: JsonRpcRequest,
    trace: Option<TraceContext>,
) -> JsonRpcResponse {
    let id = request.id.clone();
    let result = route(state, &request, trace).await;
    match result {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(err) => {
            tracing::warn!(method = %request.method, error = %err, "request failed");
            JsonRpcResponse::error(id, JsonRpcError::from_a2a_error(&err))
        }
    }
}

async fn route(
    state: &AppState,
    request: &JsonRpcRequest,
    trace: Option<TraceContext>,
) -> Result<Value, A2AError> {
    match request.method.as_str() {
        methods::SEND_MESSAGE => handle_send(state, request, trace).await,
        methods::GET_TASK => handle_get(state, request).await,
        methods::CANCEL_TASK => handle_cancel(state, request).await,
        methods::LIST_TASKS => handle_list(state, request).await,
        methods::SEND_STREAMING_MESSAGE => Err(A2AError::MethodNotFound(
            "message/stream must be requested with an Accept: text/event-stream header".into(),
        )),
        other => Err(A2AError::MethodNotFound(other.to_string())),
    }
}

fn params<T: for<'de> Deserialize<'de>>(request: &JsonRpcRequest) -> Result<T, A2AError> {
    let raw = request
        .params
        .clone()
        .ok_or_else(|| A2AError::InvalidParams("missing params".into()))?;
    serde_json::from_value(raw).map_err(|e| A2AError::InvalidParams(e.to_string()))
}

/// Shared setup for both blocking sends and streaming: resolve the
/// contextID, create the task, validate inbound parts, and acquire the
/// conversation. Returns everything the caller needs to either run the
/// turn synchronously or hand it to the streaming handler.
pub async fn begin_send(
    state: &AppState,
    send: &SendParamsPublic,
) -> Result<SendSetup, A2AError> {
    let context_id = send
        .message
        .context_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let content_parts = crate::runner::TaskRunner::validate_parts(&send.message.parts)?;

    let task = state.store.create(&context_id).await?;
    let cancel = state.register_cancel_token(&task.id).await;

    let conv = state
        .cache
        .acquire(&context_id, state.opener.as_ref())
        .await
        .map_err(|e| A2AError::Internal(e.to_string()))?;

    Ok(SendSetup {
        task,
        context_id,
        content_parts,
        metadata: send.message.metadata.clone(),
        conv,
        cancel,
    })
}

/// Public mirror of [`SendParams`], exposed so `streaming` can share
/// `begin_send` without re-parsing JSON itself.
pub struct SendParamsPublic {
    pub message: Message,
    pub blocking: bool,
}

pub struct SendSetup {
    pub task: Task,
    pub context_id: String,
    pub content_parts: Vec<a2a_core::ContentPart>,
    pub metadata: Option<Value>,
    pub conv: Arc<dyn Conversation>,
    pub cancel: CancellationToken,
}

pub fn parse_send_params(request: &JsonRpcRequest) -> Result<SendParamsPublic, A2AError> {
    let parsed: SendParams = params(request)?;
    Ok(SendParamsPublic {
        message: parsed.message,
        blocking: parsed.configuration.unwrap_or_default().blocking,
    })
}

async fn handle_send(
    state: &AppState,
    request: &JsonRpcRequest,
    trace: Option<TraceContext>,
) -> Result<Value, A2AError> {
    let send = parse_send_params(request)?;
    let setup = begin_send(state, &send).await?;

    if send.blocking {
        let task = state
            .runner
            .run(
                &setup.task,
                setup.conv,
                setup.content_parts,
                setup.metadata,
                trace,
                setup.cancel,
            )
            .await?;
        Ok(serde_json::to_value(task)?)
    } else {
        let runner = state.runner.clone();
        let task = setup.task.clone();
        tokio::spawn(async move {
            if let Err(err) = runner
                .run(
                    &task,
                    setup.conv,
                    setup.content_parts,
                    setup.metadata,
                    trace,
                    setup.cancel,
                )
                .await
            {
                tracing::error!(task_id = %task.id, error = %err, "background run failed");
            }
        });
        Ok(serde_json::to_value(setup.task)?)
    }
}

async fn handle_get(state: &AppState, request: &JsonRpcRequest) -> Result<Value, A2AError> {
    let p: TaskIdParams = params(request)?;
    let task = state.store.get(&p.id).await?;
    Ok(serde_json::to_value(task)?)
}

async fn handle_cancel(state: &AppState, request: &JsonRpcRequest) -> Result<Value, A2AError> {
    let p: TaskIdParams = params(request)?;
    if let Some(token) = state.cancel_token_for(&p.id).await {
        token.cancel();
    }
    let task = state.store.cancel(&p.id).await?;
    Ok(serde_json::to_value(task)?)
}

async fn handle_list(state: &AppState, request: &JsonRpcRequest) -> Result<Value, A2AError> {
    let p: TaskListParams = request
        .params
        .clone()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e: serde_json::Error| A2AError::InvalidParams(e.to_string()))?
        .unwrap_or_default();
    let tasks = state.store.list(&p).await?;
    Ok(serde_json::json!({ "tasks": tasks }))
}
