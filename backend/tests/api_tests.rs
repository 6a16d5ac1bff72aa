//! Integration tests for the Wayfare gateway API.

use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use wayfare::config::Config;
use wayfare::state::AppState;
use wayfare::{create_app, create_app_with_state};

/// Helper to create a test app instance.
async fn create_test_app() -> Router {
    create_app().await
}

/// Read the next SSE chunk from a response body, with a timeout so a broken
/// stream fails the test instead of hanging it.
async fn next_chunk(body: &mut Body) -> String {
    let frame = tokio::time::timeout(Duration::from_secs(5), body.frame())
        .await
        .expect("timed out waiting for SSE frame")
        .expect("stream ended unexpectedly")
        .expect("stream errored");
    String::from_utf8(frame.into_data().unwrap().to_vec()).unwrap()
}

/// Open the streaming endpoint and return the session id plus the live body.
async fn open_stream(app: &Router) -> (String, Body) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/sse").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/event-stream"
    );

    let mut body = response.into_body();
    let handshake = next_chunk(&mut body).await;
    assert!(handshake.contains("event: endpoint"), "got: {}", handshake);

    let session_id = handshake
        .split("sessionId=")
        .nth(1)
        .expect("handshake carries a session id")
        .trim()
        .to_string();
    assert!(!session_id.is_empty());
    (session_id, body)
}

/// Extract the `data:` payload of an SSE message chunk as JSON.
fn parse_message(chunk: &str) -> Value {
    let data = chunk
        .lines()
        .find_map(|line| line.strip_prefix("data: "))
        .expect("chunk has a data line");
    serde_json::from_str(data).unwrap()
}

/// Unwrap the inner tool result from a JSON-RPC response pushed on the stream.
fn tool_result(message: &Value) -> Value {
    let text = message["result"]["content"][0]["text"].as_str().unwrap();
    serde_json::from_str(text).unwrap()
}

async fn post_message(app: &Router, session_id: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/messages?sessionId={}", session_id))
                .method("POST")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_tool_catalog() {
    let app = create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/tools")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let catalog: Value = serde_json::from_slice(&body).unwrap();
    let tools = catalog["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 6);

    let budget = tools
        .iter()
        .find(|t| t["name"] == "calculate_trip_budget")
        .unwrap();
    assert_eq!(
        budget["inputSchema"]["properties"]["budgetLevel"]["default"],
        json!("mid-range")
    );
}

#[tokio::test]
async fn test_streamable_http_session_lifecycle() {
    let app = create_test_app().await;

    // initialize mints a session returned in the header.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/mcp")
                .method("POST")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({"jsonrpc": "2.0", "id": 1, "method": "initialize"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let session_id = response.headers()["mcp-session-id"]
        .to_str()
        .unwrap()
        .to_string();

    // tools/list against the live session.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/mcp")
                .method("POST")
                .header("content-type", "application/json")
                .header("mcp-session-id", &session_id)
                .body(Body::from(
                    json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let listing: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(listing["result"]["tools"].as_array().unwrap().len(), 6);

    // DELETE terminates; a second DELETE finds nothing.
    let delete = |id: String| {
        let app = app.clone();
        async move {
            app.oneshot(
                Request::builder()
                    .uri("/mcp")
                    .method("DELETE")
                    .header("mcp-session-id", id)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
            .status()
        }
    };
    assert_eq!(delete(session_id.clone()).await, StatusCode::NO_CONTENT);
    assert_eq!(delete(session_id).await, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_streamable_http_unknown_session_is_404() {
    let app = create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/mcp")
                .method("POST")
                .header("content-type", "application/json")
                .header("mcp-session-id", "no-such-session")
                .body(Body::from(
                    json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_message_without_session_id_is_400() {
    let app = create_test_app().await;

    for uri in ["/messages", "/messages?sessionId="] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .method("POST")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({"toolName": "get_weather", "arguments": {"destination": "Oslo"}})
                            .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri: {}", uri);
    }
}

#[tokio::test]
async fn test_message_for_unknown_session_is_404() {
    let app = create_test_app().await;

    let (status, body) = post_message(
        &app,
        "ghost-session",
        json!({"toolName": "get_weather", "arguments": {"destination": "Oslo"}}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("Session not found"));
}

#[tokio::test]
async fn test_budget_scenario_end_to_end() {
    let app = create_test_app().await;
    let (session_id, mut body) = open_stream(&app).await;

    let (status, ack) = post_message(
        &app,
        &session_id,
        json!({
            "toolName": "calculate_trip_budget",
            "arguments": {"duration": 7, "travelers": 2, "budgetLevel": "mid-range"}
        }),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(ack["accepted"], json!(true));

    let chunk = next_chunk(&mut body).await;
    assert!(chunk.contains("event: message"), "got: {}", chunk);
    let budget = tool_result(&parse_message(&chunk));

    // flightRate*travelers + nightlyRate*duration + dailyRate*duration*travelers
    assert_eq!(budget["total_usd"], json!(800.0 * 2.0 + 150.0 * 7.0 + 80.0 * 7.0 * 2.0));
}

#[tokio::test]
async fn test_responses_preserve_message_order() {
    let app = create_test_app().await;
    let (session_id, mut body) = open_stream(&app).await;

    for duration in [1, 2] {
        let (status, _) = post_message(
            &app,
            &session_id,
            json!({"toolName": "calculate_trip_budget", "arguments": {"duration": duration}}),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
    }

    let first = tool_result(&parse_message(&next_chunk(&mut body).await));
    let second = tool_result(&parse_message(&next_chunk(&mut body).await));
    assert_eq!(first["duration_days"], json!(1));
    assert_eq!(second["duration_days"], json!(2));
}

#[tokio::test]
async fn test_unknown_tool_keeps_the_session_usable() {
    let app = create_test_app().await;
    let (session_id, mut body) = open_stream(&app).await;

    let (status, _) = post_message(
        &app,
        &session_id,
        json!({"toolName": "charter_yacht", "arguments": {}}),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let message = parse_message(&next_chunk(&mut body).await);
    assert_eq!(message["result"]["isError"], json!(true));

    // The connection stays open for subsequent calls.
    let (status, _) = post_message(
        &app,
        &session_id,
        json!({"toolName": "get_weather", "arguments": {"destination": "Bergen"}}),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let message = parse_message(&next_chunk(&mut body).await);
    let weather = tool_result(&message);
    assert_eq!(weather["weather"]["destination"], json!("Bergen"));
}

#[tokio::test]
async fn test_two_sessions_are_independent() {
    let app = create_test_app().await;
    let (session_a, body_a) = open_stream(&app).await;
    let (session_b, mut body_b) = open_stream(&app).await;
    assert_ne!(session_a, session_b);

    // Closing A's connection tears its session down...
    drop(body_a);
    let (status, _) = post_message(
        &app,
        &session_a,
        json!({"toolName": "get_weather", "arguments": {"destination": "Oslo"}}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // ...while B stays fully operable.
    let (status, _) = post_message(
        &app,
        &session_b,
        json!({"toolName": "get_weather", "arguments": {"destination": "Oslo"}}),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let chunk = next_chunk(&mut body_b).await;
    assert!(chunk.contains("event: message"));
}

#[tokio::test]
async fn test_keepalive_frames_flow_on_an_idle_stream() {
    let mut config = Config::default();
    config.keepalive_secs = 1;
    let app = create_app_with_state(AppState::new(&config)).await;

    let (_session_id, mut body) = open_stream(&app).await;

    // No messages are sent; the stream must still produce traffic.
    let chunk = next_chunk(&mut body).await;
    assert!(chunk.contains("keep-alive"), "got: {}", chunk);
}

#[tokio::test]
async fn test_sync_messages_returns_the_result_inline() {
    let mut config = Config::default();
    config.sync_messages = true;
    let app = create_app_with_state(AppState::new(&config)).await;

    let (session_id, _body) = open_stream(&app).await;
    let (status, response) = post_message(
        &app,
        &session_id,
        json!({
            "toolName": "convert_currency",
            "arguments": {"amount": 10.0, "fromCurrency": "USD", "toCurrency": "USD"}
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let conversion: Value =
        serde_json::from_str(response["result"]["content"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(conversion["conversion"]["converted"], json!(10.0));
}

#[tokio::test]
async fn test_sweep_spares_live_connections() {
    let state = AppState::new(&Config::default());
    let app = create_app_with_state(state.clone()).await;
    let (session_id, mut body) = open_stream(&app).await;

    // The stream is still consuming the session: even an age limit of zero
    // must not sever it.
    assert_eq!(state.sessions().cleanup_stale(0), 0);

    let (status, _) = post_message(
        &app,
        &session_id,
        json!({"toolName": "get_weather", "arguments": {"destination": "Oslo"}}),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let chunk = next_chunk(&mut body).await;
    assert!(chunk.contains("event: message"));
}

#[tokio::test]
async fn test_sweep_collects_sessions_with_no_stream() {
    let state = AppState::new(&Config::default());
    let app = create_app_with_state(state.clone()).await;

    // Initialize-only client: a session exists but nothing consumes it.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/mcp")
                .method("POST")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({"jsonrpc": "2.0", "id": 1, "method": "initialize"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(state.sessions().cleanup_stale(0), 1);
    assert!(state.sessions().is_empty());
}

#[tokio::test]
async fn test_second_stream_for_a_session_is_refused() {
    let app = create_test_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/mcp")
                .method("POST")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({"jsonrpc": "2.0", "id": 1, "method": "initialize"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    let session_id = response.headers()["mcp-session-id"]
        .to_str()
        .unwrap()
        .to_string();

    let open = |id: String| {
        let app = app.clone();
        async move {
            app.oneshot(
                Request::builder()
                    .uri("/mcp")
                    .method("GET")
                    .header("mcp-session-id", id)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
        }
    };

    let first = open(session_id.clone()).await;
    assert_eq!(first.status(), StatusCode::OK);

    // One stream handle per session: a concurrent second open is refused.
    let second = open(session_id.clone()).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);

    // Drop-and-reopen stays supported.
    drop(first);
    let third = open(session_id).await;
    assert_eq!(third.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_json_rpc_body_on_the_message_endpoint() {
    let app = create_test_app().await;
    let (session_id, mut body) = open_stream(&app).await;

    let (status, _) = post_message(
        &app,
        &session_id,
        json!({"jsonrpc": "2.0", "id": 7, "method": "tools/list"}),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let message = parse_message(&next_chunk(&mut body).await);
    assert_eq!(message["id"], json!(7));
    assert_eq!(message["result"]["tools"].as_array().unwrap().len(), 6);
}
