//! Option structs for every component.
//!
//! Durations are expressed in milliseconds so the structs can be loaded
//! straight from JSON; the accessor methods hand out [`Duration`]s.

use crate::types::constants::*;
use crate::types::{MonitorError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Channel lifecycle options: endpoint, backoff and heartbeat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// WebSocket endpoint (`ws://` or `wss://`)
    pub endpoint: String,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub max_reconnect_attempts: u32,
    pub heartbeat_interval_ms: u64,
    pub heartbeat_timeout_ms: u64,
}

impl ChannelConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_millis(self.heartbeat_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.endpoint)?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(MonitorError::Config(format!(
                "endpoint must use ws:// or wss://, got '{}'",
                url.scheme()
            )));
        }
        if self.initial_backoff_ms == 0 {
            return Err(MonitorError::Config(
                "initial backoff must be non-zero".to_string(),
            ));
        }
        if self.max_backoff_ms < self.initial_backoff_ms {
            return Err(MonitorError::Config(
                "max backoff must not be below the initial backoff".to_string(),
            ));
        }
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 1.0 {
            return Err(MonitorError::Config(format!(
                "backoff multiplier must be >= 1.0, got {}",
                self.backoff_multiplier
            )));
        }
        if self.max_reconnect_attempts == 0 {
            return Err(MonitorError::Config(
                "max reconnect attempts must be at least 1".to_string(),
            ));
        }
        if self.heartbeat_interval_ms == 0 || self.heartbeat_timeout_ms == 0 {
            return Err(MonitorError::Config(
                "heartbeat interval and timeout must be non-zero".to_string(),
            ));
        }
        if self.heartbeat_timeout_ms >= self.heartbeat_interval_ms {
            return Err(MonitorError::Config(
                "heartbeat timeout must be shorter than the heartbeat interval".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            initial_backoff_ms: DEFAULT_INITIAL_BACKOFF_MS,
            max_backoff_ms: DEFAULT_MAX_BACKOFF_MS,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            heartbeat_interval_ms: DEFAULT_HEARTBEAT_INTERVAL_MS,
            heartbeat_timeout_ms: DEFAULT_HEARTBEAT_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Maximum number of notifications kept visible at once
    pub max_notifications: usize,
    /// How long each notification stays visible
    pub display_duration_ms: u64,
}

impl NotificationConfig {
    pub fn display_duration(&self) -> Duration {
        Duration::from_millis(self.display_duration_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_notifications == 0 {
            return Err(MonitorError::Config(
                "notification cap must be at least 1".to_string(),
            ));
        }
        if self.display_duration_ms == 0 {
            return Err(MonitorError::Config(
                "notification display duration must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            max_notifications: DEFAULT_MAX_NOTIFICATIONS,
            display_duration_ms: DEFAULT_NOTIFICATION_DURATION_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogPollerConfig {
    /// HTTP(S) URL of the log resource; polling is disabled when `None`
    pub url: Option<String>,
    pub poll_interval_ms: u64,
    /// Entry count requested from the server (`limit` query parameter)
    pub entry_cap: usize,
}

impl LogPollerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(url) = &self.url {
            let url = Url::parse(url)?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(MonitorError::Config(format!(
                    "log url must use http:// or https://, got '{}'",
                    url.scheme()
                )));
            }
        }
        if self.poll_interval_ms == 0 {
            return Err(MonitorError::Config(
                "log poll interval must be non-zero".to_string(),
            ));
        }
        if self.entry_cap == 0 {
            return Err(MonitorError::Config(
                "log entry cap must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for LogPollerConfig {
    fn default() -> Self {
        Self {
            url: None,
            poll_interval_ms: DEFAULT_LOG_POLL_INTERVAL_MS,
            entry_cap: DEFAULT_LOG_ENTRY_CAP,
        }
    }
}

/// Everything a [`SignalMonitor`](crate::SignalMonitor) needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorOptions {
    pub channel: ChannelConfig,
    pub notifications: NotificationConfig,
    pub logs: LogPollerConfig,
}

impl MonitorOptions {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            channel: ChannelConfig::new(endpoint),
            ..Default::default()
        }
    }

    /// Parses options from a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.channel.validate()?;
        self.notifications.validate()?;
        self.logs.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let options = MonitorOptions::new("ws://localhost:8080/signals");
        assert!(options.validate().is_ok());
        assert_eq!(options.channel.initial_backoff(), Duration::from_millis(1000));
        assert_eq!(options.channel.max_backoff(), Duration::from_millis(30000));
        assert_eq!(options.channel.backoff_multiplier, 1.5);
        assert_eq!(options.channel.max_reconnect_attempts, 10);
        assert_eq!(options.logs.poll_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_rejects_non_websocket_endpoint() {
        let options = MonitorOptions::new("http://localhost:8080/signals");
        assert!(matches!(options.validate(), Err(MonitorError::Config(_))));

        let options = MonitorOptions::new("not a url");
        assert!(matches!(options.validate(), Err(MonitorError::UrlParse(_))));
    }

    #[test]
    fn test_rejects_inconsistent_heartbeat() {
        let mut options = MonitorOptions::new("ws://localhost:8080/signals");
        options.channel.heartbeat_timeout_ms = options.channel.heartbeat_interval_ms;
        assert!(matches!(options.validate(), Err(MonitorError::Config(_))));
    }

    #[test]
    fn test_rejects_shrinking_multiplier() {
        let mut options = MonitorOptions::new("ws://localhost:8080/signals");
        options.channel.backoff_multiplier = 0.5;
        assert!(matches!(options.validate(), Err(MonitorError::Config(_))));
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let options = MonitorOptions::from_json(
            r#"{
                "channel": { "endpoint": "wss://plant.example/ws", "max_reconnect_attempts": 3 },
                "logs": { "url": "https://plant.example/api/logs", "entry_cap": 50 }
            }"#,
        )
        .unwrap();

        assert_eq!(options.channel.endpoint, "wss://plant.example/ws");
        assert_eq!(options.channel.max_reconnect_attempts, 3);
        assert_eq!(options.channel.heartbeat_timeout_ms, 5000);
        assert_eq!(options.logs.entry_cap, 50);
        assert_eq!(options.notifications, NotificationConfig::default());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_http_log_url() {
        let mut options = MonitorOptions::new("ws://localhost:8080/signals");
        options.logs.url = Some("ftp://localhost/logs".to_string());
        assert!(matches!(options.validate(), Err(MonitorError::Config(_))));
    }
}
