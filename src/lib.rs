//! # Signal Monitor
//!
//! Resilient ingestion of industrial alarm signals over a WebSocket channel,
//! with self-expiring operator notifications and a periodically refreshed
//! historical log.
//!
//! ## Example
//!
//! ```no_run
//! use signal_monitor_rs::{MonitorOptions, SignalMonitor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut options = MonitorOptions::new("wss://plant.example/ws/signals");
//!     options.logs.url = Some("https://plant.example/api/logs".to_string());
//!
//!     let monitor = SignalMonitor::new(options)?;
//!     monitor.start()?;
//!
//!     let mut status = monitor.subscribe_status();
//!     while status.changed().await.is_ok() {
//!         println!("{}", status.borrow().message);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod connection;
pub mod infrastructure;
pub mod logs;
pub mod monitor;
pub mod notifications;
pub mod signals;
pub mod types;

pub use config::{ChannelConfig, LogPollerConfig, MonitorOptions, NotificationConfig};
pub use connection::{
    ConnectionEvent, ConnectionManager, ConnectionState, ConnectionStatus, Connector,
    WebSocketConnector,
};
pub use logs::{LogEntry, LogLevel, LogPoller, LogSource};
pub use monitor::{SignalMonitor, SignalMonitorBuilder};
pub use notifications::{Notification, NotificationKind, NotificationQueue};
pub use signals::{InboundFrame, SignalKey, SignalSet};
pub use types::{MonitorError, Result};
