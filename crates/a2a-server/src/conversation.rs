//! Conversation capability traits and the per-contextID single-flight
//! cache that owns them.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;

use futures::Stream;
use tokio::sync::{Mutex, OnceCell};

use a2a_core::ContentPart;

use crate::trace_context::TraceContext;

/// A message handed to a `Conversation`, after Part -> ContentPart
/// translation, plus any caller-supplied metadata and trace context.
#[derive(Debug, Clone)]
pub struct ContentMessage {
    pub context_id: String,
    pub parts: Vec<ContentPart>,
    pub metadata: Option<serde_json::Value>,
    pub trace: Option<TraceContext>,
}

/// A tool call the agent wants the client to resolve before continuing.
#[derive(Debug, Clone)]
pub struct PendingTool {
    pub id: String,
    pub name: String,
}

/// The result of one `Conversation::send` call.
#[derive(Debug, Clone, Default)]
pub struct ConversationResponse {
    pub message_parts: Vec<ContentPart>,
    pub pending_tools: Vec<PendingTool>,
}

/// One chunk of a streamed `Conversation::send_stream` response.
#[derive(Debug, Clone)]
pub struct StreamChunk {
    pub part: Option<ContentPart>,
    pub done: bool,
}

pub type BoxStream<T> = Pin<Box<dyn Stream<Item = T> + Send>>;

/// Errors a `Conversation` or its opener can raise.
#[derive(Debug, thiserror::Error)]
pub enum ConversationError {
    #[error("conversation open failed: {0}")]
    OpenFailed(String),

    #[error("conversation send failed: {0}")]
    SendFailed(String),

    #[error("conversation close failed: {0}")]
    CloseFailed(String),

    #[error("cancelled")]
    Cancelled,
}

/// An open agent session. At most one `send` call is in flight per
/// conversation at any time — the runner is responsible for enforcing
/// this, not the conversation itself.
#[async_trait::async_trait]
pub trait Conversation: Send + Sync {
    async fn send(
        &self,
        message: ContentMessage,
        cancel: tokio_util::sync::CancellationToken,
    ) -> Result<ConversationResponse, ConversationError>;

    async fn close(&self) -> Result<(), ConversationError>;

    /// Type-test for the optional streaming capability. Implementors
    /// that support `send_stream` override this to return themselves;
    /// the default (no streaming support) returns `None`.
    fn as_stream(self: Arc<Self>) -> Option<Arc<dyn ConversationStream>> {
        None
    }
}

/// Optional capability: a `Conversation` that can also stream its
/// response chunk-by-chunk. The streaming handler type-tests for this
/// via `Conversation::as_stream()` rather than downcasting the trait
/// object directly.
#[async_trait::async_trait]
pub trait ConversationStream: Conversation {
    async fn send_stream(
        &self,
        message: ContentMessage,
        cancel: tokio_util::sync::CancellationToken,
    ) -> Result<BoxStream<StreamChunk>, ConversationError>;
}

/// Opens a new `Conversation` for a contextID. Called at most once per
/// contextID over the cache's lifetime.
#[async_trait::async_trait]
pub trait ConversationOpener: Send + Sync {
    async fn open(&self, context_id: &str) -> Result<Arc<dyn Conversation>, ConversationError>;
}

/// contextID -> live Conversation, with single-flight opener semantics:
/// concurrent `acquire` calls for the same contextID make exactly one
/// opener call, and losers await the winner's result.
#[derive(Default)]
pub struct ConversationCache {
    entries: Mutex<HashMap<String, Arc<OnceCell<Arc<dyn Conversation>>>>>,
}

impl ConversationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached conversation for `context_id`, opening one via
    /// `opener` if this is the first request for that context.
    pub async fn acquire(
        &self,
        context_id: &str,
        opener: &dyn ConversationOpener,
    ) -> Result<Arc<dyn Conversation>, ConversationError> {
        let cell = {
            let mut entries = self.entries.lock().await;
            entries
                .entry(context_id.to_string())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        let conv = cell
            .get_or_try_init(|| async {
                tracing::info!(context_id, "opening conversation");
                opener.open(context_id).await
            })
            .await?;
        Ok(conv.clone())
    }

    /// All conversations opened so far, for shutdown to close.
    pub async fn snapshot(&self) -> Vec<Arc<dyn Conversation>> {
        let entries = self.entries.lock().await;
        entries
            .values()
            .filter_map(|cell| cell.get().cloned())
            .collect()
    }
}

/// A trivial in-process conversation that echoes the caller's text back,
/// prefixed, so the server binary is runnable out of the box. Not a
/// model integration.
pub struct EchoConversation;

#[async_trait::async_trait]
impl Conversation for EchoConversation {
    async fn send(
        &self,
        message: ContentMessage,
        _cancel: tokio_util::sync::CancellationToken,
    ) -> Result<ConversationResponse, ConversationError> {
        let text = message
            .parts
            .iter()
            .find_map(|p| match p {
                ContentPart::Text { text } => Some(text.clone()),
                _ => None,
            })
            .unwrap_or_default();
        Ok(ConversationResponse {
            message_parts: vec![ContentPart::Text {
                text: format!("echo: {text}"),
            }],
            pending_tools: Vec::new(),
        })
    }

    async fn close(&self) -> Result<(), ConversationError> {
        Ok(())
    }

    fn as_stream(self: Arc<Self>) -> Option<Arc<dyn ConversationStream>> {
        let stream: Arc<dyn ConversationStream> = self;
        Some(stream)
    }
}

#[async_trait::async_trait]
impl ConversationStream for EchoConversation {
    async fn send_stream(
        &self,
        message: ContentMessage,
        _cancel: tokio_util::sync::CancellationToken,
    ) -> Result<BoxStream<StreamChunk>, ConversationError> {
        let text = message
            .parts
            .iter()
            .find_map(|p| match p {
                ContentPart::Text { text } => Some(text.clone()),
                _ => None,
            })
            .unwrap_or_default();
        let reply = format!("echo: {text}");
        let mut items: Vec<StreamChunk> = reply
            .split_inclusive(' ')
            .map(|word| StreamChunk {
                part: Some(ContentPart::Text {
                    text: word.to_string(),
                }),
                done: false,
            })
            .collect();
        items.push(StreamChunk {
            part: None,
            done: true,
        });
        Ok(Box::pin(futures::stream::iter(items)))
    }
}

/// Opens an [`EchoConversation`] for every contextID.
pub struct EchoOpener;

#[async_trait::async_trait]
impl ConversationOpener for EchoOpener {
    async fn open(&self, _context_id: &str) -> Result<Arc<dyn Conversation>, ConversationError> {
        Ok(Arc::new(EchoConversation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingOpener {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl ConversationOpener for CountingOpener {
        async fn open(
            &self,
            _context_id: &str,
        ) -> Result<Arc<dyn Conversation>, ConversationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(EchoConversation))
        }
    }

    #[tokio::test]
    async fn acquire_is_single_flight_per_context() {
        let opener = CountingOpener {
            calls: AtomicUsize::new(0),
        };
        let cache = ConversationCache::new();

        let mut handles = Vec::new();
        for _ in 0..10 {
            let cache = &cache;
            let opener = &opener;
            handles.push(async move { cache.acquire("ctx-shared", opener).await.unwrap() });
        }
        futures::future::join_all(handles).await;
        assert_eq!(opener.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn distinct_contexts_each_get_their_own_open_call() {
        let opener = CountingOpener {
            calls: AtomicUsize::new(0),
        };
        let cache = ConversationCache::new();
        for i in 0..5 {
            cache
                .acquire(&format!("ctx-{i}"), &opener)
                .await
                .unwrap();
        }
        assert_eq!(opener.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn snapshot_returns_all_opened_conversations() {
        let cache = ConversationCache::new();
        let opener = EchoOpener;
        cache.acquire("ctx-a", &opener).await.unwrap();
        cache.acquire("ctx-b", &opener).await.unwrap();
        assert_eq!(cache.snapshot().await.len(), 2);
    }

    #[tokio::test]
    async fn echo_conversation_echoes_text() {
        let conv = EchoConversation;
        let response = conv
            .send(
                ContentMessage {
                    context_id: "ctx-1".into(),
                    parts: vec![ContentPart::Text { text: "hi".into() }],
                    metadata: None,
                    trace: None,
                },
                tokio_util::sync::CancellationToken::new(),
            )
            .await
            .unwrap();
        match &response.message_parts[0] {
            ContentPart::Text { text } => assert_eq!(text, "echo: hi"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
