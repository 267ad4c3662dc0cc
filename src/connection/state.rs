use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of the signal channel.
///
/// `Failed` is terminal: only an explicit reset leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Idle,
    Connecting,
    Connected,
    Reconnecting,
    Failed,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Reconnecting => "reconnecting",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the link is going away; decides whether a reconnect is scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseIntent {
    /// The owner asked for the close; never reconnect
    UserRequested,
    /// Transport error, server close or heartbeat timeout; reconnect with backoff
    Unexpected,
}

/// Snapshot of the channel as shown to the operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
    pub state: ConnectionState,
    pub message: String,
    /// Failures in the current episode
    pub attempts: u32,
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self {
            state: ConnectionState::Idle,
            message: "Idle".to_string(),
            attempts: 0,
        }
    }
}

/// Everything the connection reports, in the order it happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// An application text frame (heartbeat replies are never delivered)
    Frame(String),
    /// A state transition with a human-readable description
    Status {
        state: ConnectionState,
        message: String,
    },
    /// Reconnect-attempt count, sent right after every `Status`
    Attempts(u32),
}
