//! SSE framing for `message/stream`: one `TaskStatusUpdateEvent` per
//! state transition and one `TaskArtifactUpdateEvent` per artifact
//! produced, terminating with `final: true`.

use std::convert::Infallible;
use std::time::Duration;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use a2a_core::{
    part_codec, A2AError, Artifact, JsonRpcRequest, StreamEvent, TaskArtifactUpdateEvent,
    TaskState, TaskStatus, TaskStatusUpdateEvent,
};

use crate::conversation::ContentMessage;
use crate::dispatcher::{begin_send, parse_send_params, AppState};
use crate::trace_context::TraceContext;

/// Build the SSE response for a `message/stream` request: validate and
/// set up the send exactly like a blocking send, then drive the
/// conversation's streaming capability, framing each chunk as an SSE
/// event.
pub async fn handle_stream(
    state: &AppState,
    request: JsonRpcRequest,
    trace: Option<TraceContext>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, A2AError> {
    let send = parse_send_params(&request)?;
    let setup = begin_send(state, &send).await?;

    let streamer = setup
        .conv
        .clone()
        .as_stream()
        .ok_or_else(|| A2AError::Internal("conversation does not support streaming".into()))?;

    state
        .store
        .set_state(&setup.task.id, TaskState::Working, None)
        .await
        .map_err(|e| A2AError::Internal(e.to_string()))?;

    let (tx, rx) = mpsc::channel::<Event>(16);
    let store = state.store.clone();
    let task_id = setup.task.id.clone();
    let context_id = setup.context_id.clone();
    let cancel = setup.cancel.clone();

    let message = ContentMessage {
        context_id: setup.context_id.clone(),
        parts: setup.content_parts,
        metadata: setup.metadata,
        trace,
    };

    tokio::spawn(async move {
        let mut chunks = match streamer.send_stream(message, cancel.clone()).await {
            Ok(chunks) => chunks,
            Err(err) => {
                tracing::warn!(task_id, error = %err, "stream send failed");
                let status_message = a2a_core::Message::agent_text(context_id, err.to_string());
                if let Ok(task) = store
                    .set_state(&task_id, TaskState::Failed, Some(status_message))
                    .await
                {
                    let _ = tx.send(status_event(&task_id, &task.status, true)).await;
                }
                return;
            }
        };

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    if let Ok(task) = store.cancel(&task_id).await {
                        let _ = tx.send(status_event(&task_id, &task.status, true)).await;
                    }
                    return;
                }
                chunk = chunks.next() => {
                    let Some(chunk) = chunk else { break };
                    if chunk.done {
                        break;
                    }
                    if let Some(part) = chunk.part {
                        let wire_part = match part_codec::encode_part(&part) {
                            Ok(p) => p,
                            Err(err) => {
                                tracing::warn!(task_id, error = %err, "failed to encode stream chunk");
                                continue;
                            }
                        };
                        let artifact = Artifact::new(vec![wire_part]);
                        if let Ok(task) = store.add_artifacts(&task_id, vec![artifact.clone()]).await {
                            let _ = tx
                                .send(artifact_event(&task_id, artifact))
                                .await;
                            let _ = tx
                                .send(status_event(&task_id, &task.status, false))
                                .await;
                        }
                    }
                }
            }
        }

        if let Ok(task) = store.set_state(&task_id, TaskState::Completed, None).await {
            let _ = tx.send(status_event(&task_id, &task.status, true)).await;
        }
    });

    let stream = ReceiverStream::new(rx).map(Ok);
    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    ))
}

fn status_event(task_id: &str, status: &TaskStatus, is_final: bool) -> Event {
    let event = StreamEvent::StatusUpdate(TaskStatusUpdateEvent {
        task_id: task_id.to_string(),
        status: status.clone(),
        r#final: is_final,
    });
    to_event(&event)
}

fn artifact_event(task_id: &str, artifact: Artifact) -> Event {
    let event = StreamEvent::ArtifactUpdate(TaskArtifactUpdateEvent {
        task_id: task_id.to_string(),
        artifact,
    });
    to_event(&event)
}

fn to_event(event: &StreamEvent) -> Event {
    Event::default()
        .event(event.event_name())
        .json_data(event)
        .unwrap_or_else(|_| Event::default().event("error"))
}
