/// Heartbeat literals (text frames, not WebSocket control frames)
pub mod heartbeat {
    pub const PING: &str = "ping";
    pub const PONG: &str = "pong";
}

/// Default initial reconnect delay (milliseconds)
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 1000;

/// Default reconnect delay cap (milliseconds)
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 30000;

/// Default growth factor applied after each scheduled reconnect
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 1.5;

/// Default number of consecutive failures before giving up
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 10;

/// Default heartbeat interval (milliseconds)
pub const DEFAULT_HEARTBEAT_INTERVAL_MS: u64 = 30000;

/// Default heartbeat response timeout (milliseconds)
pub const DEFAULT_HEARTBEAT_TIMEOUT_MS: u64 = 5000;

/// Default maximum number of visible notifications
pub const DEFAULT_MAX_NOTIFICATIONS: usize = 5;

/// Default notification display duration (milliseconds)
pub const DEFAULT_NOTIFICATION_DURATION_MS: u64 = 5000;

/// Default log poll interval (milliseconds)
pub const DEFAULT_LOG_POLL_INTERVAL_MS: u64 = 60000;

/// Default number of log entries requested from the server
pub const DEFAULT_LOG_ENTRY_CAP: usize = 100;
