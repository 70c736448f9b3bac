//! HTTP surface: endpoint mux, body/time limits, and graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use a2a_core::{transport::jsonrpc::methods, A2AError, JsonRpcError, JsonRpcRequest, JsonRpcResponse};

use crate::config::ServerConfig;
use crate::dispatcher::{dispatch, AppState};
use crate::streaming::handle_stream;
use crate::trace_context::TraceContext;

/// Build the server's axum `Router` from a fully-formed `AppState`.
pub fn router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    Router::new()
        .route("/a2a", post(handle_a2a))
        .route("/.well-known/agent.json", get(handle_agent_card))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(TimeoutLayer::new(config.write_timeout)),
        )
}

async fn handle_agent_card(State(state): State<Arc<AppState>>) -> Json<a2a_core::AgentCard> {
    Json(state.agent_card.clone())
}

async fn handle_a2a(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Response {
    let trace = TraceContext::from_headers(&headers);

    if body.len() > state.max_body_size {
        return Json(JsonRpcResponse::error(
            a2a_core::transport::jsonrpc::RequestId::Null,
            JsonRpcError::from_a2a_error(&A2AError::ParseError(format!(
                "request body of {} bytes exceeds the {}-byte limit",
                body.len(),
                state.max_body_size
            ))),
        ))
        .into_response();
    }

    let request: JsonRpcRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            return Json(JsonRpcResponse::error(
                a2a_core::transport::jsonrpc::RequestId::Null,
                JsonRpcError::from_a2a_error(&A2AError::ParseError(e.to_string())),
            ))
            .into_response();
        }
    };

    let wants_stream = request.method == methods::SEND_STREAMING_MESSAGE
        || headers
            .get(axum::http::header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("text/event-stream"))
            .unwrap_or(false);

    if wants_stream && request.method == methods::SEND_STREAMING_MESSAGE {
        return match handle_stream(&state, request, trace).await {
            Ok(sse) => sse.into_response(),
            Err(err) => (
                StatusCode::OK,
                Json(JsonRpcResponse::error(
                    a2a_core::transport::jsonrpc::RequestId::Null,
                    JsonRpcError::from_a2a_error(&err),
                )),
            )
                .into_response(),
        };
    }

    Json(dispatch(&state, request, trace).await).into_response()
}

/// Run the HTTP server on `config.port`, returning once a graceful
/// shutdown completes: stop accepting new connections, let in-flight
/// handlers finish, then close every cached conversation.
pub async fn serve(config: ServerConfig, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state.clone(), &config);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "a2a-server listening");

    let shutdown_state = state.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_state))
        .await?;

    Ok(())
}

async fn shutdown_signal(state: Arc<AppState>) {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl-C handler");
    tracing::info!("shutdown signal received, draining in-flight requests");
    state.root_cancel.cancel();
    state.close_all_conversations().await;
    tracing::info!("shutdown complete");
}
