//! OpenAPI documentation configuration.

use utoipa::OpenApi;
use wayfare_types::api::{ErrorResponse, MessageAck, ToolCatalogResponse, ToolDescriptor};

use crate::mcp::handler::JsonRpcRequest;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::tools::list_tools,
    ),
    components(
        schemas(
            ToolCatalogResponse,
            ToolDescriptor,
            MessageAck,
            ErrorResponse,
            JsonRpcRequest,
        )
    ),
    tags(
        (name = "tools", description = "Tool catalog endpoints")
    ),
    info(
        title = "Wayfare Travel Gateway API",
        description = "Session-oriented MCP gateway exposing travel planning tools",
        license(
            name = "MIT OR Apache-2.0"
        )
    )
)]
pub struct ApiDoc;
