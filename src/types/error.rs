use std::time::Duration;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Errors that can occur while monitoring the signal channel and log resource.
#[derive(Error, Debug)]
pub enum MonitorError {
    /// WebSocket protocol error (handshake failed, abrupt close, invalid frame, etc.)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// General connection error with descriptive message
    #[error("Connection error: {0}")]
    Connection(String),

    /// Inbound frame that is not a well-typed signal payload
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    /// Options rejected during validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP transport error while fetching the log resource
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Log resource answered with a non-success status
    #[error("HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// URL parsing error (malformed endpoint URL)
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// A request did not complete within its deadline
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// The component's background task is gone
    #[error("Component closed")]
    Closed,
}

/// Convenience type alias for `Result<T, MonitorError>`.
pub type Result<T> = std::result::Result<T, MonitorError>;
