//! Wayfare backend library.
//!
//! Exposes the application builder for the server binary and for
//! integration tests.

use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod api;
pub mod config;
pub mod error;
pub mod mcp;
pub mod openapi;
pub mod state;
pub mod tools;

use state::AppState;

/// Create the Axum application router with default state.
pub async fn create_app() -> Router {
    create_app_with_state(AppState::default()).await
}

/// Create the Axum application router with a given state.
pub async fn create_app_with_state(state: AppState) -> Router {
    create_app_with_config(state, Vec::new()).await
}

/// Create the Axum application router with a given state and CORS origins.
///
/// If `cors_allowed_origins` is empty, any origin is allowed.
pub async fn create_app_with_config(state: AppState, cors_allowed_origins: Vec<String>) -> Router {
    let api_router = Router::new().route("/tools", get(api::tools::list_tools));

    Router::new()
        .route("/health", get(health))
        // Legacy SSE transport: session id travels as a query parameter.
        .route("/sse", get(api::sse::sse_stream))
        .route("/messages", post(api::messages::post_message))
        // Streamable HTTP transport: session id travels in a header.
        .route("/mcp", post(api::mcp::mcp_post))
        .route("/mcp", get(api::mcp::mcp_get))
        .route("/mcp", delete(api::mcp::mcp_delete))
        .nest("/api", api_router)
        .merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
        // A panicking handler becomes a 500 for that request; the process
        // and every other session keep running.
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer({
            let cors = CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
                .allow_headers([
                    header::CONTENT_TYPE,
                    header::ACCEPT,
                    HeaderName::from_static("mcp-session-id"),
                ])
                .expose_headers([HeaderName::from_static("mcp-session-id")]);

            if cors_allowed_origins.is_empty() {
                cors.allow_origin(Any)
            } else {
                let origins: Vec<HeaderValue> = cors_allowed_origins
                    .iter()
                    .filter_map(|o| o.parse::<HeaderValue>().ok())
                    .collect();
                cors.allow_origin(origins)
            }
        })
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "OK"
}
