//! MCP protocol support.
//!
//! Two transports are wired on top of this module:
//!
//! - the legacy SSE transport (`GET /sse` + `POST /messages?sessionId=`),
//!   where the session id travels as a query parameter, and
//! - the Streamable HTTP transport (`POST`/`GET`/`DELETE /mcp`), where it
//!   travels in the `Mcp-Session-Id` header.
//!
//! Both share the same session registry and JSON-RPC handler.

pub mod handler;
pub mod session;

pub use handler::McpHandler;
pub use session::{SessionGuard, SessionRegistry};
