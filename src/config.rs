//! Configuration management for the RPS room client
//!
//! Groups the settings per channel: the HTTP control-plane, the STOMP
//! broker, the player identity and the console surface. Values come from
//! an optional `config.toml` with `RPS_CLIENT_*` environment overrides.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// Candidate config file locations, tried in order.
const CONFIG_PATHS: [&str; 2] = [
    "rps-room-client/config", // Packaged layout: ./rps-room-client/config.toml
    "config",                 // Local development: ./config.toml
];

/// Complete client configuration
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ClientConfig {
    pub control: ControlConfig,
    pub broker: BrokerConfig,
    pub player: PlayerConfig,
    pub console: ConsoleConfig,
}

/// Request/response control-plane settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ControlConfig {
    /// Base URL of the game server, e.g. `http://localhost:8080`
    /// Environment: RPS_CLIENT_CONTROL__BASE_URL
    pub base_url: String,

    /// Per-request timeout
    pub request_timeout_secs: u64,
}

/// Publish/subscribe broker settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BrokerConfig {
    /// WebSocket URL of the STOMP endpoint
    /// Environment: RPS_CLIENT_BROKER__URL
    pub url: String,

    /// Value of the `host` header sent in CONNECT
    pub host: String,

    /// Time allowed for the WebSocket upgrade plus the CONNECTED reply
    pub connect_timeout_secs: u64,

    /// Heart-beat interval we offer to send, 0 disables
    pub heartbeat_send_ms: u64,

    /// Heart-beat interval we ask the broker to send, 0 disables
    pub heartbeat_recv_ms: u64,
}

/// Player identity settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PlayerConfig {
    /// Prefix of the generated identity (`Player` gives `Player417`)
    pub name_prefix: String,

    /// Fixed identity, overrides generation when set
    pub name: Option<String>,
}

/// Console surface settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ConsoleConfig {
    pub max_room_name_length: usize,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:8080/ws/websocket".to_string(),
            host: "localhost".to_string(),
            connect_timeout_secs: 10,
            heartbeat_send_ms: 0,
            heartbeat_recv_ms: 0,
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            name_prefix: "Player".to_string(),
            name: None,
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            max_room_name_length: 64,
        }
    }
}

impl ClientConfig {
    /// Load configuration from config.toml with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder();
        for path in CONFIG_PATHS {
            builder = builder.add_source(File::with_name(path).required(false));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("RPS_CLIENT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: ClientConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if !has_scheme(&self.control.base_url, &["http://", "https://"]) {
            return Err(config::ConfigError::Message(format!(
                "control.base_url must be an http(s) URL, got '{}'",
                self.control.base_url
            )));
        }

        if !has_scheme(&self.broker.url, &["ws://", "wss://"]) {
            return Err(config::ConfigError::Message(format!(
                "broker.url must be a ws(s) URL, got '{}'",
                self.broker.url
            )));
        }

        if self.control.request_timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "control.request_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.broker.connect_timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "broker.connect_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.console.max_room_name_length == 0 {
            return Err(config::ConfigError::Message(
                "console.max_room_name_length must be greater than 0".into(),
            ));
        }

        let fixed_name = self.player.name.as_deref().map(str::trim).unwrap_or("");
        if fixed_name.is_empty() && self.player.name_prefix.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "player.name_prefix cannot be empty when player.name is unset".into(),
            ));
        }

        Ok(())
    }
}

impl ControlConfig {
    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl BrokerConfig {
    /// Get connect timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// `heart-beat` header value for CONNECT
    pub fn heartbeat_header(&self) -> String {
        format!("{},{}", self.heartbeat_send_ms, self.heartbeat_recv_ms)
    }
}

fn has_scheme(url: &str, schemes: &[&str]) -> bool {
    let lower = url.to_ascii_lowercase();
    schemes
        .iter()
        .any(|scheme| lower.starts_with(scheme) && lower.len() > scheme.len())
}
