pub mod entry;
pub mod poller;
pub mod source;

pub use entry::{LogEntry, LogLevel};
pub use poller::LogPoller;
pub use source::LogSource;
