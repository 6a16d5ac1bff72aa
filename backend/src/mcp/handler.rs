//! MCP JSON-RPC request handler.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::state::AppState;
use crate::tools;

/// MCP protocol version we support.
pub const PROTOCOL_VERSION: &str = "2025-03-26";

/// JSON-RPC 2.0 Request.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC 2.0 Response.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// JSON-RPC 2.0 Error.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

/// Tool call parameters from MCP.
#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct InitializeParams {
    #[serde(rename = "protocolVersion")]
    protocol_version: Option<String>,
}

/// MCP request handler.
pub struct McpHandler;

impl McpHandler {
    /// Handle a JSON-RPC request. Returns `None` for notifications, which
    /// need no response.
    pub async fn handle_request(state: &AppState, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let id = request.id.clone();
        debug!("Handling method: {}", request.method);

        match request.method.as_str() {
            "initialize" => Some(Self::handle_initialize(id, request.params)),
            "initialized" | "notifications/initialized" => None,
            "ping" => Some(JsonRpcResponse::success(id, json!({}))),
            "tools/list" => Some(Self::handle_list_tools(id)),
            "tools/call" => Some(Self::handle_call_tool(state, id, request.params).await),
            "notifications/cancelled" => None,
            _ => Some(JsonRpcResponse::error(
                id,
                -32601,
                format!("Method not found: {}", request.method),
            )),
        }
    }

    fn handle_initialize(id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        // Echo the client's protocol version if it sent one.
        let version = params
            .and_then(|p| serde_json::from_value::<InitializeParams>(p).ok())
            .and_then(|p| p.protocol_version)
            .unwrap_or_else(|| PROTOCOL_VERSION.to_string());

        JsonRpcResponse::success(
            id,
            json!({
                "protocolVersion": version,
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": "wayfare",
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        )
    }

    fn handle_list_tools(id: Option<Value>) -> JsonRpcResponse {
        JsonRpcResponse::success(id, json!({ "tools": tools::catalog() }))
    }

    async fn handle_call_tool(
        state: &AppState,
        id: Option<Value>,
        params: Option<Value>,
    ) -> JsonRpcResponse {
        let params: ToolCallParams =
            match serde_json::from_value(params.unwrap_or_else(|| json!({}))) {
                Ok(p) => p,
                Err(e) => {
                    return JsonRpcResponse::error(id, -32602, format!("Invalid params: {}", e))
                }
            };

        // Dispatcher faults come back as data; the protocol never sees them.
        let envelope = state
            .dispatcher()
            .invoke(&params.name, params.arguments.unwrap_or_else(|| json!({})))
            .await;
        JsonRpcResponse::success(id, envelope)
    }
}
