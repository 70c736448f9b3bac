//! In-memory Task Store — TaskID -> Task with transition-validated
//! mutations, concurrent access, and contextID-filtered listing.

use std::collections::HashMap;

use tokio::sync::RwLock;

use a2a_core::{Artifact, InvalidTransition, Message, Task, TaskListParams, TaskState};

/// Errors a `TaskStore` implementation can return.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("task not found: {0}")]
    NotFound(String),

    #[error("task already exists: {0}")]
    AlreadyExists(String),

    #[error("task {0} is already in a terminal state")]
    Terminal(String),

    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
}

/// The Task Store contract: create, fetch, mutate, and list tasks.
///
/// Implementations must serialize mutating operations per task and hand
/// back snapshots from reads, so no observer ever sees a partially
/// updated task.
#[async_trait::async_trait]
pub trait TaskStore: Send + Sync {
    async fn create(&self, context_id: &str) -> Result<Task, StoreError>;
    async fn get(&self, task_id: &str) -> Result<Task, StoreError>;
    async fn set_state(
        &self,
        task_id: &str,
        new_state: TaskState,
        status_message: Option<Message>,
    ) -> Result<Task, StoreError>;
    async fn add_artifacts(
        &self,
        task_id: &str,
        artifacts: Vec<Artifact>,
    ) -> Result<Task, StoreError>;
    async fn cancel(&self, task_id: &str) -> Result<Task, StoreError>;
    async fn list(&self, params: &TaskListParams) -> Result<Vec<Task>, StoreError>;
}

/// The reference in-memory store: a single `RwLock` over a `HashMap`
/// plus an insertion-order index for stable `list` ordering.
#[derive(Default)]
pub struct InMemoryTaskStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    tasks: HashMap<String, Task>,
    order: Vec<String>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn create(&self, context_id: &str) -> Result<Task, StoreError> {
        let task = Task::new(context_id);
        let mut inner = self.inner.write().await;
        if inner.tasks.contains_key(&task.id) {
            return Err(StoreError::AlreadyExists(task.id));
        }
        inner.order.push(task.id.clone());
        inner.tasks.insert(task.id.clone(), task.clone());
        tracing::debug!(task_id = %task.id, context_id, "task created");
        Ok(task)
    }

    async fn get(&self, task_id: &str) -> Result<Task, StoreError> {
        let inner = self.inner.read().await;
        inner
            .tasks
            .get(task_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(task_id.to_string()))
    }

    async fn set_state(
        &self,
        task_id: &str,
        new_state: TaskState,
        status_message: Option<Message>,
    ) -> Result<Task, StoreError> {
        let mut inner = self.inner.write().await;
        let task = inner
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| StoreError::NotFound(task_id.to_string()))?;
        if task.is_terminal() {
            return Err(StoreError::Terminal(task_id.to_string()));
        }
        task.transition(new_state, status_message)?;
        tracing::info!(task_id, state = %task.status.state, "task state transition");
        Ok(task.clone())
    }

    async fn add_artifacts(
        &self,
        task_id: &str,
        artifacts: Vec<Artifact>,
    ) -> Result<Task, StoreError> {
        let mut inner = self.inner.write().await;
        let task = inner
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| StoreError::NotFound(task_id.to_string()))?;
        if task.is_terminal() {
            return Err(StoreError::Terminal(task_id.to_string()));
        }
        task.add_artifacts(artifacts);
        Ok(task.clone())
    }

    async fn cancel(&self, task_id: &str) -> Result<Task, StoreError> {
        let mut inner = self.inner.write().await;
        let task = inner
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| StoreError::NotFound(task_id.to_string()))?;
        if task.is_terminal() {
            return Err(StoreError::Terminal(task_id.to_string()));
        }
        task.transition(TaskState::Canceled, None)?;
        tracing::info!(task_id, "task canceled");
        Ok(task.clone())
    }

    async fn list(&self, params: &TaskListParams) -> Result<Vec<Task>, StoreError> {
        let inner = self.inner.read().await;
        let mut tasks: Vec<Task> = inner
            .order
            .iter()
            .filter_map(|id| inner.tasks.get(id))
            .filter(|t| match &params.context_id {
                Some(ctx) => &t.context_id == ctx,
                None => true,
            })
            .cloned()
            .collect();

        let offset = params.offset as usize;
        if offset >= tasks.len() {
            return Ok(Vec::new());
        }
        tasks.drain(..offset);
        if let Some(page_size) = params.page_size {
            tasks.truncate(page_size as usize);
        }
        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn create_and_get_round_trips() {
        let store = InMemoryTaskStore::new();
        let task = store.create("ctx-1").await.unwrap();
        let fetched = store.get(&task.id).await.unwrap();
        assert_eq!(fetched.id, task.id);
        assert_eq!(fetched.status.state, TaskState::Submitted);
    }

    #[tokio::test]
    async fn get_missing_task_errors() {
        let store = InMemoryTaskStore::new();
        let err = store.get("missing").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn set_state_rejects_illegal_transition() {
        let store = InMemoryTaskStore::new();
        let task = store.create("ctx-1").await.unwrap();
        let err = store
            .set_state(&task.id, TaskState::Completed, None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn set_state_rejects_mutation_after_terminal() {
        let store = InMemoryTaskStore::new();
        let task = store.create("ctx-1").await.unwrap();
        store
            .set_state(&task.id, TaskState::Working, None)
            .await
            .unwrap();
        store
            .set_state(&task.id, TaskState::Completed, None)
            .await
            .unwrap();
        let err = store
            .set_state(&task.id, TaskState::Working, None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Terminal(_)));
    }

    #[tokio::test]
    async fn cancel_moves_non_terminal_task_to_canceled() {
        let store = InMemoryTaskStore::new();
        let task = store.create("ctx-1").await.unwrap();
        let canceled = store.cancel(&task.id).await.unwrap();
        assert_eq!(canceled.status.state, TaskState::Canceled);
    }

    #[tokio::test]
    async fn list_filters_by_context_and_paginates() {
        let store = InMemoryTaskStore::new();
        for _ in 0..3 {
            store.create("ctx-a").await.unwrap();
        }
        store.create("ctx-b").await.unwrap();

        let all_a = store
            .list(&TaskListParams {
                context_id: Some("ctx-a".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(all_a.len(), 3);

        let paged = store
            .list(&TaskListParams {
                context_id: Some("ctx-a".into()),
                page_size: Some(1),
                offset: 1,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(paged.len(), 1);
    }
}
