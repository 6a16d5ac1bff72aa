//! Session management for streaming connections.
//!
//! Every long-lived client connection owns exactly one [`Session`], keyed by
//! a UUID v4 id. The session's broadcast sender is the only way to write to
//! the connection's outbound stream; the single SSE consumer on the other
//! end serializes all writes, so message responses and keepalive frames can
//! never interleave partially.
//!
//! Registry mutations are synchronous (parking_lot), never awaiting. A
//! connection handler can therefore mint and register a session before its
//! first suspension point, which closes the window where a fast-following
//! inbound message could race session creation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::SessionError;

/// Frames that can be pushed onto a session's outbound stream.
#[derive(Clone, Debug)]
pub enum SessionFrame {
    /// A serialized JSON-RPC message for the client.
    Message(String),
}

/// Lifecycle of a streaming connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Registered, handshake not yet written.
    Connecting,
    /// Handshake delivered, stream live.
    Active,
    /// Teardown started (disconnect, write failure, or explicit terminate).
    Closing,
    /// Removed from the registry.
    Closed,
}

/// One client's streaming connection.
#[derive(Debug)]
pub struct Session {
    pub id: String,
    pub created_at: Instant,
    pub state: SessionState,
    frame_tx: broadcast::Sender<SessionFrame>,
}

impl Session {
    fn new() -> Self {
        let (frame_tx, _) = broadcast::channel(100);
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Instant::now(),
            state: SessionState::Connecting,
            frame_tx,
        }
    }

    /// Session age in seconds.
    pub fn age_secs(&self) -> u64 {
        self.created_at.elapsed().as_secs()
    }
}

/// Handle returned to the connection that owns a session.
///
/// The receiver is subscribed at registration time, so frames pushed between
/// registration and the first poll of the stream are not lost.
pub struct SessionHandle {
    pub id: String,
    pub frames: broadcast::Receiver<SessionFrame>,
}

/// Process-wide registry of live sessions.
///
/// Owned by the top-level server state and passed to connection handlers;
/// tests construct independent instances.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint and register a new session, returning its handle.
    ///
    /// Synchronous: the session is visible to the message router before the
    /// caller can await anything.
    pub fn create(&self) -> Result<SessionHandle, SessionError> {
        let session = Session::new();
        let id = session.id.clone();
        let frames = session.frame_tx.subscribe();

        let mut sessions = self.sessions.write();
        if sessions.contains_key(&id) {
            return Err(SessionError::DuplicateId(id));
        }
        sessions.insert(id.clone(), session);
        drop(sessions);

        info!("Created session: {}", id);
        Ok(SessionHandle { id, frames })
    }

    /// Transition a session to Active once its handshake has been written.
    pub fn mark_active(&self, id: &str) -> bool {
        let mut sessions = self.sessions.write();
        match sessions.get_mut(id) {
            Some(session) => {
                session.state = SessionState::Active;
                true
            }
            None => false,
        }
    }

    /// Whether a session is currently registered.
    pub fn contains(&self, id: &str) -> bool {
        self.sessions.read().contains_key(id)
    }

    /// Subscribe to a session's outbound frames, refusing the subscription
    /// if another stream is already consuming them.
    ///
    /// Checked and subscribed under one write lock, so two racing opens
    /// cannot both succeed: a session id owns at most one stream handle at
    /// a time. Once that stream drops its receiver the session can be
    /// re-subscribed.
    pub fn subscribe_exclusive(
        &self,
        id: &str,
    ) -> Result<broadcast::Receiver<SessionFrame>, SessionError> {
        let sessions = self.sessions.write();
        let session = sessions
            .get(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        if session.frame_tx.receiver_count() > 0 {
            return Err(SessionError::StreamActive(id.to_string()));
        }
        Ok(session.frame_tx.subscribe())
    }

    /// Push a frame onto a session's stream.
    ///
    /// `NotFound` is the normal outcome for a message whose client has
    /// already disconnected; the completed result is simply discarded.
    pub fn push(&self, id: &str, frame: SessionFrame) -> Result<(), SessionError> {
        let sessions = self.sessions.read();
        let session = sessions
            .get(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        if session.frame_tx.send(frame).is_err() {
            // No live receiver: the stream consumer is gone but teardown has
            // not run yet. Treated the same as a missing session.
            debug!("Dropping frame for session {} with no receiver", id);
        }
        Ok(())
    }

    /// Remove a session. Idempotent: removing an already-removed id is a
    /// no-op, so concurrent close triggers (transport error plus client
    /// close) cannot double-free.
    pub fn remove(&self, id: &str) -> bool {
        let mut sessions = self.sessions.write();
        if let Some(mut session) = sessions.remove(id) {
            session.state = SessionState::Closed;
            info!("Removed session: {}", id);
            true
        } else {
            false
        }
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Backstop sweep for sessions whose teardown never ran (e.g. a
    /// streamable-HTTP client that initialized but never opened a stream and
    /// never sent DELETE). A session with a live receiver still has a stream
    /// consuming it and is never swept, regardless of age. Returns the
    /// number of sessions removed.
    pub fn cleanup_stale(&self, max_age_secs: u64) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|id, session| {
            let keep = session.frame_tx.receiver_count() > 0
                || session.age_secs() < max_age_secs;
            if !keep {
                warn!("Sweeping stale session {} (age: {}s)", id, session.age_secs());
            }
            keep
        });
        before - sessions.len()
    }
}

/// Removes a session when dropped.
///
/// Owned by the streaming connection's SSE stream; whichever close trigger
/// fires first (client disconnect, write failure, server shutdown) drops the
/// stream, which drops the guard, which removes the session. The keepalive
/// dies with the same stream, so no timer can write to a closed session.
pub struct SessionGuard {
    id: String,
    registry: SessionRegistry,
}

impl SessionGuard {
    pub fn new(id: String, registry: SessionRegistry) -> Self {
        Self { id, registry }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.registry.remove(&self.id);
    }
}
