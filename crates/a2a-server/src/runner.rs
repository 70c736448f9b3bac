//! Task Runner — executes one agent turn against a `Conversation` and
//! translates the outcome into task-store mutations.
//!
//! Error-to-state mapping lives here and nowhere else: a cancelled run
//! context always lands the task in `canceled`, everything else in
//! `failed`.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex as AsyncMutex;
use tokio_util::sync::CancellationToken;

use a2a_core::{part_codec, A2AError, Artifact, ContentPart, Message, Part, Task, TaskState};

use crate::conversation::{Conversation, ConversationError, ContentMessage};
use crate::store::TaskStore;
use crate::trace_context::TraceContext;

/// Runs agent turns against conversations, serializing sends per
/// contextID so at most one `Conversation::send` is in flight per
/// context at any time.
pub struct TaskRunner {
    store: Arc<dyn TaskStore>,
    context_locks: AsyncMutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl TaskRunner {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self {
            store,
            context_locks: AsyncMutex::new(HashMap::new()),
        }
    }

    async fn context_lock(&self, context_id: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.context_locks.lock().await;
        locks
            .entry(context_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Validate the inbound wire parts before any state change, so an
    /// invalid part never produces a `working` task visible to the
    /// client.
    pub fn validate_parts(parts: &[Part]) -> Result<Vec<ContentPart>, A2AError> {
        part_codec::decode_parts(parts)
    }

    /// Run one turn: `submitted -> working`, invoke the conversation,
    /// translate the result into a terminal state (or `input_required`).
    pub async fn run(
        &self,
        task: &Task,
        conv: Arc<dyn Conversation>,
        content_parts: Vec<ContentPart>,
        metadata: Option<serde_json::Value>,
        trace: Option<TraceContext>,
        cancel: CancellationToken,
    ) -> Result<Task, A2AError> {
        let task_id = task.id.clone();
        let context_id = task.context_id.clone();

        self.store
            .set_state(&task_id, TaskState::Working, None)
            .await
            .map_err(|e| A2AError::Internal(e.to_string()))?;

        let lock = self.context_lock(&context_id).await;
        let _guard = lock.lock().await;

        let message = ContentMessage {
            context_id: context_id.clone(),
            parts: content_parts,
            metadata,
            trace,
        };

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ConversationError::Cancelled),
            result = conv.send(message, cancel.clone()) => result,
        };

        match outcome {
            Err(ConversationError::Cancelled) => {
                tracing::info!(task_id, "run cancelled, marking task canceled");
                self.store
                    .cancel(&task_id)
                    .await
                    .map_err(|e| A2AError::Internal(e.to_string()))
            }
            Err(err) => {
                tracing::warn!(task_id, error = %err, "conversation send failed");
                let status_message = Message::agent_text(context_id, err.to_string());
                self.store
                    .set_state(&task_id, TaskState::Failed, Some(status_message))
                    .await
                    .map_err(|e| A2AError::Internal(e.to_string()))
            }
            Ok(response) => {
                if !response.pending_tools.is_empty() {
                    tracing::debug!(task_id, count = response.pending_tools.len(), "task requires input");
                    return self
                        .store
                        .set_state(&task_id, TaskState::InputRequired, None)
                        .await
                        .map_err(|e| A2AError::Internal(e.to_string()));
                }

                let wire_parts = part_codec::encode_parts(&response.message_parts)?;
                let artifact = Artifact::new(wire_parts);
                self.store
                    .add_artifacts(&task_id, vec![artifact])
                    .await
                    .map_err(|e| A2AError::Internal(e.to_string()))?;
                tracing::info!(task_id, "task completed");
                self.store
                    .set_state(&task_id, TaskState::Completed, None)
                    .await
                    .map_err(|e| A2AError::Internal(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::ConversationResponse;
    use crate::store::InMemoryTaskStore;
    use std::time::Duration;

    struct TextConversation(&'static str);

    #[async_trait::async_trait]
    impl Conversation for TextConversation {
        async fn send(
            &self,
            _message: ContentMessage,
            _cancel: CancellationToken,
        ) -> Result<ConversationResponse, ConversationError> {
            Ok(ConversationResponse {
                message_parts: vec![ContentPart::Text {
                    text: self.0.to_string(),
                }],
                pending_tools: Vec::new(),
            })
        }

        async fn close(&self) -> Result<(), ConversationError> {
            Ok(())
        }
    }

    struct FailingConversation;

    #[async_trait::async_trait]
    impl Conversation for FailingConversation {
        async fn send(
            &self,
            _message: ContentMessage,
            _cancel: CancellationToken,
        ) -> Result<ConversationResponse, ConversationError> {
            Err(ConversationError::SendFailed("provider error".into()))
        }

        async fn close(&self) -> Result<(), ConversationError> {
            Ok(())
        }
    }

    struct PendingToolsConversation;

    #[async_trait::async_trait]
    impl Conversation for PendingToolsConversation {
        async fn send(
            &self,
            _message: ContentMessage,
            _cancel: CancellationToken,
        ) -> Result<ConversationResponse, ConversationError> {
            Ok(ConversationResponse {
                message_parts: vec![],
                pending_tools: vec![crate::conversation::PendingTool {
                    id: "tool-1".into(),
                    name: "lookup".into(),
                }],
            })
        }

        async fn close(&self) -> Result<(), ConversationError> {
            Ok(())
        }
    }

    struct BlockingConversation;

    #[async_trait::async_trait]
    impl Conversation for BlockingConversation {
        async fn send(
            &self,
            _message: ContentMessage,
            cancel: CancellationToken,
        ) -> Result<ConversationResponse, ConversationError> {
            cancel.cancelled().await;
            Err(ConversationError::Cancelled)
        }

        async fn close(&self) -> Result<(), ConversationError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn blocking_text_completion() {
        let store = Arc::new(InMemoryTaskStore::new());
        let task = store.create("ctx-1").await.unwrap();
        let runner = TaskRunner::new(store.clone());
        let conv: Arc<dyn Conversation> = Arc::new(TextConversation("ok"));
        let result = runner
            .run(
                &task,
                conv,
                vec![ContentPart::Text { text: "Hello".into() }],
                None,
                None,
                CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(result.status.state, TaskState::Completed);
        assert_eq!(result.artifacts.len(), 1);
        assert_eq!(result.artifacts[0].parts[0].text.as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn send_failure_marks_task_failed_not_error() {
        let store = Arc::new(InMemoryTaskStore::new());
        let task = store.create("ctx-1").await.unwrap();
        let runner = TaskRunner::new(store.clone());
        let conv: Arc<dyn Conversation> = Arc::new(FailingConversation);
        let result = runner
            .run(&task, conv, vec![], None, None, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result.status.state, TaskState::Failed);
        assert_eq!(
            result.status.message.unwrap().parts[0].text.as_deref(),
            Some("conversation send failed: provider error")
        );
    }

    #[tokio::test]
    async fn pending_tools_move_task_to_input_required() {
        let store = Arc::new(InMemoryTaskStore::new());
        let task = store.create("ctx-1").await.unwrap();
        let runner = TaskRunner::new(store.clone());
        let conv: Arc<dyn Conversation> = Arc::new(PendingToolsConversation);
        let result = runner
            .run(&task, conv, vec![], None, None, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result.status.state, TaskState::InputRequired);
        assert!(result.artifacts.is_empty());
    }

    #[tokio::test]
    async fn cancellation_maps_to_canceled_not_failed() {
        let store = Arc::new(InMemoryTaskStore::new());
        let task = store.create("ctx-1").await.unwrap();
        let runner = Arc::new(TaskRunner::new(store.clone()));
        let conv: Arc<dyn Conversation> = Arc::new(BlockingConversation);
        let cancel = CancellationToken::new();

        let run_cancel = cancel.clone();
        let task_clone = task.clone();
        let runner_clone = runner.clone();
        let handle = tokio::spawn(async move {
            runner_clone
                .run(&task_clone, conv, vec![], None, None, run_cancel)
                .await
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        cancel.cancel();
        let result = handle.await.unwrap().unwrap();
        assert_eq!(result.status.state, TaskState::Canceled);
    }
}
