//! Connection configuration.

use std::env;
use std::time::Duration;

use uuid::Uuid;

use crate::protocol::BrowserConnectMessage;
use crate::types::{ViewKind, HEALTH_CHECK_MS, RECONNECT_BACKOFF_MS};

#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Viewer identity sent on every connect.
    pub uuid: String,
    pub view: ViewKind,
    /// A transport with no inbound line for this long is considered dead.
    pub idle_timeout: Duration,
    pub health_check: Duration,
    pub reconnect_backoff: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 29080,
            username: None,
            password: None,
            uuid: Uuid::new_v4().to_string(),
            view: ViewKind::default(),
            idle_timeout: Duration::from_secs(30),
            health_check: Duration::from_millis(HEALTH_CHECK_MS),
            reconnect_backoff: Duration::from_millis(RECONNECT_BACKOFF_MS),
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl ConnectionConfig {
    /// Create from `ROGUE_VIEW_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let host = non_empty("ROGUE_VIEW_HOST").unwrap_or(defaults.host);
        let port = non_empty("ROGUE_VIEW_PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);
        let view = non_empty("ROGUE_VIEW_VIEW")
            .and_then(|s| ViewKind::from_str(&s))
            .unwrap_or(defaults.view);
        let idle_timeout = non_empty("ROGUE_VIEW_IDLE_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.idle_timeout);

        Self {
            host,
            port,
            username: non_empty("ROGUE_VIEW_USERNAME"),
            password: non_empty("ROGUE_VIEW_PASSWORD"),
            uuid: non_empty("ROGUE_VIEW_UUID").unwrap_or(defaults.uuid),
            view,
            idle_timeout,
            ..defaults
        }
    }

    /// `host:port`, resolved at connect time.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connect_message(&self) -> BrowserConnectMessage {
        BrowserConnectMessage::new(
            self.uuid.clone(),
            self.username.clone(),
            self.password.clone(),
            self.view,
        )
    }
}
