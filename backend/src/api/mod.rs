//! HTTP endpoint handlers.

pub mod mcp;
pub mod messages;
pub mod sse;
pub mod tools;
