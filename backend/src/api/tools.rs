//! Tool catalog endpoint.

use axum::Json;
use wayfare_types::ToolCatalogResponse;

use crate::tools;

/// List all tools with their input schemas.
#[utoipa::path(
    get,
    path = "/api/tools",
    responses(
        (status = 200, description = "Tool catalog", body = ToolCatalogResponse)
    ),
    tag = "tools"
)]
pub async fn list_tools() -> Json<ToolCatalogResponse> {
    Json(ToolCatalogResponse {
        tools: tools::catalog(),
    })
}
