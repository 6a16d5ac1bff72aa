//! Gateway error taxonomy.
//!
//! Tool-level failures are converted to data (error envelopes) at the
//! dispatcher boundary and never propagate as faults past it.

use thiserror::Error;

/// Errors raised while dispatching a tool call.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The request named a tool absent from the registry.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The arguments did not match the tool's contract.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The external collaborator failed and no fallback was defined.
    #[error("Tool '{tool}' failed: {message}")]
    Dispatch { tool: String, message: String },
}

/// Errors raised by the session registry.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The id is not registered. Expected outcome for messages that arrive
    /// after the owning connection disconnected.
    #[error("Session not found: {0}")]
    NotFound(String),

    /// A freshly minted id collided with a live session. Should not occur
    /// with UUID v4 ids; the connection is refused rather than entering
    /// Active with a shared stream.
    #[error("Duplicate session id: {0}")]
    DuplicateId(String),

    /// The session already has a live stream consuming its frames. A second
    /// concurrent stream for the same id is refused; the id can be
    /// re-subscribed once the first stream drops.
    #[error("Session {0} already has an active stream")]
    StreamActive(String),
}
