//! Streaming connection endpoint (legacy SSE transport).
//!
//! `GET /sse` opens a long-lived server-push connection. The session is
//! minted and registered synchronously, before the response (and with it the
//! handshake frame) exists, so a message that arrives immediately after the
//! handshake can never miss the registry entry.
//!
//! The first frame is an `endpoint` event telling the client where to POST
//! its messages; afterwards the stream carries `message` frames pushed by
//! the message router, interleaved with keepalive comments emitted by axum
//! at the configured interval. Dropping the stream (client disconnect, write
//! failure, shutdown) drops the guard and removes the session.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::stream::{self, StreamExt};
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{error, info};
use wayfare_types::ErrorResponse;

use crate::mcp::session::{SessionFrame, SessionGuard};
use crate::state::AppState;

/// Open a streaming connection and mint a session for it.
pub async fn sse_stream(State(state): State<AppState>) -> Response {
    // Register before handshake; no await between mint and insert.
    let handle = match state.sessions().create() {
        Ok(handle) => handle,
        Err(e) => {
            error!("Refusing connection: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("failed to establish session")),
            )
                .into_response();
        }
    };
    let session_id = handle.id;
    info!("SSE stream opened for session {}", session_id);

    let guard = SessionGuard::new(session_id.clone(), state.sessions().clone());

    // Readiness signal: the client learns its session id from the message
    // endpoint URL.
    let registry = state.sessions().clone();
    let handshake_id = session_id.clone();
    let handshake = stream::once(async move {
        registry.mark_active(&handshake_id);
        Ok::<_, Infallible>(
            Event::default()
                .event("endpoint")
                .data(format!("/messages?sessionId={}", handshake_id)),
        )
    });

    let frames = BroadcastStream::new(handle.frames).filter_map(move |result| {
        // The guard lives inside this closure; it drops with the stream.
        let _owned = &guard;
        let event = match result {
            Ok(SessionFrame::Message(json)) => Some(Ok(Event::default().event("message").data(json))),
            // Lagged receiver: the client fell too far behind the buffer.
            // Skip the gap rather than killing the connection.
            Err(_) => None,
        };
        async move { event }
    });

    Sse::new(handshake.chain(frames))
        .keep_alive(
            KeepAlive::new()
                .interval(state.settings().keepalive)
                .text("keep-alive"),
        )
        .into_response()
}
