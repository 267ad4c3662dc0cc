use super::LogEntry;
use crate::types::Result;
use futures::future::BoxFuture;

/// Request/response access to the historical log window.
///
/// Implementations return the server's current window as-is; callers never
/// merge or trim it.
pub trait LogSource: Send + Sync + 'static {
    fn fetch(&self) -> BoxFuture<'_, Result<Vec<LogEntry>>>;
}
