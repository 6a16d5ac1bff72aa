//! MCP Streamable HTTP endpoint handlers.
//!
//! Implements the MCP 2025-03-26 Streamable HTTP transport:
//!
//! - `POST /mcp` - Send JSON-RPC requests (session assigned on initialize)
//! - `GET /mcp` - Open SSE stream for server-initiated messages
//! - `DELETE /mcp` - Terminate a session
//!
//! Unlike the legacy `/sse` transport, a client here may drop and reopen its
//! GET stream without losing the session; only DELETE (or the stale sweep)
//! removes it. At most one stream may be open per session at a time; a
//! second concurrent GET for the same id is refused with 409.

use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

use crate::error::SessionError;
use crate::mcp::handler::{JsonRpcRequest, McpHandler};
use crate::mcp::session::SessionFrame;
use crate::state::AppState;

/// Header name for the MCP session ID.
const MCP_SESSION_ID_HEADER: &str = "mcp-session-id";

/// Validate the Origin header for DNS rebinding protection.
///
/// Browser requests must come from localhost; non-browser clients typically
/// send no Origin and are accepted.
fn validate_origin(headers: &HeaderMap) -> bool {
    if let Some(origin) = headers.get(header::ORIGIN) {
        if let Ok(origin_str) = origin.to_str() {
            if origin_str.starts_with("http://localhost")
                || origin_str.starts_with("https://localhost")
                || origin_str.starts_with("http://127.0.0.1")
                || origin_str.starts_with("https://127.0.0.1")
            {
                return true;
            }
            warn!("Rejecting MCP request from origin: {}", origin_str);
            return false;
        }
    }
    true
}

/// Extract the session ID from headers.
fn get_session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(MCP_SESSION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

/// POST /mcp - Handle JSON-RPC requests.
///
/// The `Mcp-Session-Id` header is assigned on initialize and identifies the
/// session on subsequent requests.
pub async fn mcp_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<JsonRpcRequest>,
) -> Response {
    if !validate_origin(&headers) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"error": "Invalid origin"})),
        )
            .into_response();
    }

    let session_id = get_session_id(&headers);
    debug!(
        "MCP POST: method={}, session={:?}",
        request.method, session_id
    );

    // Initialize mints the session.
    if request.method == "initialize" {
        let handle = match state.sessions().create() {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Refusing initialize: {}", e);
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };
        info!("New session initialized: {}", handle.id);

        if let Some(response) = McpHandler::handle_request(&state, request).await {
            return json_response(response, Some(&handle.id));
        }
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    // Other methods must reference a live session if they carry an id at
    // all. We do not require one so that stateless clients keep working.
    if let Some(ref sid) = session_id {
        if !state.sessions().contains(sid) {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"error": "Session not found"})),
            )
                .into_response();
        }
    }

    match McpHandler::handle_request(&state, request).await {
        Some(response) => json_response(response, session_id.as_deref()),
        // Notification - no response needed.
        None => StatusCode::ACCEPTED.into_response(),
    }
}

fn json_response(response: crate::mcp::handler::JsonRpcResponse, session_id: Option<&str>) -> Response {
    let body = match serde_json::to_string(&response) {
        Ok(body) => body,
        Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };
    let mut resp = (StatusCode::OK, body).into_response();
    resp.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    if let Some(sid) = session_id {
        if let Ok(hv) = HeaderValue::from_str(sid) {
            resp.headers_mut()
                .insert(HeaderName::from_static(MCP_SESSION_ID_HEADER), hv);
        }
    }
    resp
}

/// GET /mcp - Open an SSE stream for server-initiated messages.
pub async fn mcp_get(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !validate_origin(&headers) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"error": "Invalid origin"})),
        )
            .into_response();
    }

    let session_id = match get_session_id(&headers) {
        Some(id) => id,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Mcp-Session-Id header required for SSE stream"})),
            )
                .into_response();
        }
    };

    let frames = match state.sessions().subscribe_exclusive(&session_id) {
        Ok(rx) => rx,
        Err(SessionError::StreamActive(_)) => {
            warn!("Refusing second stream for session: {}", session_id);
            return (
                StatusCode::CONFLICT,
                Json(json!({"error": "Session already has an active stream"})),
            )
                .into_response();
        }
        Err(_) => {
            warn!("SSE stream requested for unknown session: {}", session_id);
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"error": "Session not found"})),
            )
                .into_response();
        }
    };
    state.sessions().mark_active(&session_id);
    info!("SSE stream opened for session {}", session_id);

    let stream = BroadcastStream::new(frames).filter_map(|result| match result {
        Ok(SessionFrame::Message(json)) => {
            Some(Ok::<_, Infallible>(Event::default().data(json)))
        }
        // Lagged or closed.
        Err(_) => None,
    });

    Sse::new(stream)
        .keep_alive(
            KeepAlive::new()
                .interval(state.settings().keepalive)
                .text("keep-alive"),
        )
        .into_response()
}

/// DELETE /mcp - Terminate the session named by the `Mcp-Session-Id` header.
pub async fn mcp_delete(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !validate_origin(&headers) {
        return StatusCode::FORBIDDEN.into_response();
    }

    let session_id = match get_session_id(&headers) {
        Some(id) => id,
        None => return StatusCode::BAD_REQUEST.into_response(),
    };

    if state.sessions().remove(&session_id) {
        info!("Session terminated: {}", session_id);
        StatusCode::NO_CONTENT.into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}
