//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::mcp::session::SessionRegistry;
use crate::tools::ToolDispatcher;

/// State shared by all request handlers.
///
/// The session registry is the only shared mutable resource; it is owned
/// here and injected into the handlers rather than living in a module-level
/// singleton, so tests can spin up independent instances.
#[derive(Clone)]
pub struct AppState {
    sessions: SessionRegistry,
    dispatcher: Arc<ToolDispatcher>,
    settings: Arc<Settings>,
}

/// Runtime settings derived from [`Config`].
pub struct Settings {
    pub keepalive: Duration,
    pub sync_messages: bool,
    pub session_max_age_secs: u64,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            sessions: SessionRegistry::new(),
            dispatcher: Arc::new(ToolDispatcher::new(config.providers.clone())),
            settings: Arc::new(Settings {
                keepalive: Duration::from_secs(config.keepalive_secs),
                sync_messages: config.sync_messages,
                session_max_age_secs: config.session_max_age_secs,
            }),
        }
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn dispatcher(&self) -> &ToolDispatcher {
        &self.dispatcher
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}
