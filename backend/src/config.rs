//! Configuration management.
//!
//! Priority chain: CLI args > `WAYFARE_*` env vars > `.wayfare.toml` in the
//! current directory > `config.toml` in the user config directory > defaults.
//! Env vars use `__` as the section separator, e.g. `WAYFARE_SERVER__PORT`.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Default heartbeat interval for streaming connections, seconds.
///
/// Keepalive frames at this cadence defeat intermediary idle timeouts
/// (typically 60 s). Tunable via `server.keepalive_secs`.
pub const DEFAULT_KEEPALIVE_SECS: u64 = 10;

/// Default backstop age for the stale-session sweep, seconds.
pub const DEFAULT_SESSION_MAX_AGE_SECS: u64 = 3600;

/// Configuration structure that matches the TOML file format.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    server: ServerConfig,
    #[serde(default)]
    providers: ProviderConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ServerConfig {
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_keepalive")]
    keepalive_secs: u64,
    /// When true, the message endpoint returns the JSON-RPC response inline
    /// (200) instead of pushing it onto the session stream (202).
    #[serde(default)]
    sync_messages: bool,
    #[serde(default = "default_session_max_age")]
    session_max_age_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            keepalive_secs: default_keepalive(),
            sync_messages: false,
            session_max_age_secs: default_session_max_age(),
        }
    }
}

/// Credentials for the external travel APIs. Every key is optional; a tool
/// with no credential serves its deterministic mock data instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub flight_api_key: Option<String>,
    pub weather_api_key: Option<String>,
    pub exchange_api_key: Option<String>,
    pub places_api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). Falls back to the
    /// RUST_LOG environment variable, then "info".
    log_level: Option<String>,
}

fn default_port() -> u16 {
    wayfare_types::DEFAULT_PORT
}

fn default_keepalive() -> u64 {
    DEFAULT_KEEPALIVE_SECS
}

fn default_session_max_age() -> u64 {
    DEFAULT_SESSION_MAX_AGE_SECS
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub keepalive_secs: u64,
    pub sync_messages: bool,
    pub session_max_age_secs: u64,
    pub providers: ProviderConfig,
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration with the full priority chain.
    pub fn from_figment(
        port: Option<u16>,
        keepalive_secs: Option<u64>,
        sync_messages: Option<bool>,
    ) -> anyhow::Result<Self> {
        let local_config = std::env::current_dir().ok().map(|d| d.join(".wayfare.toml"));
        let user_config = directories::ProjectDirs::from("", "", "wayfare")
            .map(|dirs| dirs.config_dir().join("config.toml"));

        let mut figment = Figment::new().merge(Serialized::defaults(ConfigFile {
            server: ServerConfig::default(),
            providers: ProviderConfig::default(),
            logging: LoggingConfig::default(),
        }));

        if let Some(ref path) = user_config {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }
        if let Some(ref path) = local_config {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        figment = figment.merge(Env::prefixed("WAYFARE_").split("__"));

        if let Some(p) = port {
            figment = figment.merge(Serialized::default("server.port", p));
        }
        if let Some(k) = keepalive_secs {
            figment = figment.merge(Serialized::default("server.keepalive_secs", k));
        }
        if let Some(s) = sync_messages {
            figment = figment.merge(Serialized::default("server.sync_messages", s));
        }

        let config_file: ConfigFile = figment.extract()?;
        Ok(Self {
            port: config_file.server.port,
            keepalive_secs: config_file.server.keepalive_secs,
            sync_messages: config_file.server.sync_messages,
            session_max_age_secs: config_file.server.session_max_age_secs,
            providers: config_file.providers,
            log_level: config_file.logging.log_level,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: wayfare_types::DEFAULT_PORT,
            keepalive_secs: DEFAULT_KEEPALIVE_SECS,
            sync_messages: false,
            session_max_age_secs: DEFAULT_SESSION_MAX_AGE_SECS,
            providers: ProviderConfig::default(),
            log_level: None,
        }
    }
}
