//! Inbound message router (legacy SSE transport).
//!
//! `POST /messages?sessionId=<id>` carries one discrete request correlated
//! to a streaming connection. The response body is an acknowledgement; the
//! actual result is pushed onto the session's stream, unless the server is
//! configured with `sync_messages`, in which case the JSON-RPC response is
//! returned inline.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, warn};
use wayfare_types::{ErrorResponse, MessageAck};

use crate::mcp::handler::{JsonRpcRequest, McpHandler};
use crate::mcp::session::SessionFrame;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
}

/// Either a full JSON-RPC frame or the bare tool-call form.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum InboundMessage {
    Rpc(JsonRpcRequest),
    ToolCall(DirectToolCall),
}

/// Shorthand body: `{"toolName": ..., "arguments": {...}}`.
#[derive(Debug, Deserialize)]
pub struct DirectToolCall {
    #[serde(rename = "toolName")]
    pub tool_name: String,
    #[serde(default)]
    pub arguments: Option<Value>,
}

/// Route one inbound message to its session.
pub async fn post_message(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
    Json(message): Json<InboundMessage>,
) -> Response {
    let session_id = match query.session_id {
        Some(id) if !id.is_empty() => id,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("sessionId query parameter is required")),
            )
                .into_response();
        }
    };

    // A missing session is the normal "message after disconnect" case. Log
    // the attempted id only; never enumerate the registry.
    if !state.sessions().contains(&session_id) {
        warn!("Message for unknown session: {}", session_id);
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Session not found")),
        )
            .into_response();
    }

    let request = match message {
        InboundMessage::Rpc(request) => request,
        InboundMessage::ToolCall(call) => JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: None,
            method: "tools/call".to_string(),
            params: Some(serde_json::json!({
                "name": call.tool_name,
                "arguments": call.arguments.unwrap_or_else(|| serde_json::json!({})),
            })),
        },
    };

    let response = match McpHandler::handle_request(&state, request).await {
        Some(response) => response,
        // Notification: nothing to deliver.
        None => {
            return (
                StatusCode::ACCEPTED,
                Json(MessageAck {
                    accepted: true,
                    session_id,
                }),
            )
                .into_response();
        }
    };

    let payload = match serde_json::to_string(&response) {
        Ok(payload) => payload,
        Err(e) => {
            error!("Failed to serialize response for session {}: {}", session_id, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("failed to serialize response")),
            )
                .into_response();
        }
    };

    if state.settings().sync_messages {
        return (
            StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            payload,
        )
            .into_response();
    }

    // The client may have disconnected while the tool call ran; the
    // completed result is discarded in that case.
    if state.sessions().push(&session_id, SessionFrame::Message(payload)).is_err() {
        debug!(
            "Session {} closed mid-dispatch, discarding result",
            session_id
        );
    }

    (
        StatusCode::ACCEPTED,
        Json(MessageAck {
            accepted: true,
            session_id,
        }),
    )
        .into_response()
}
