use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification the server assigns to a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warning,
    Success,
    Info,
}

/// One row of the historical log window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub event: String,
    pub status: String,
    pub level: LogLevel,
}
