use super::SignalMonitorBuilder;
use crate::config::MonitorOptions;
use crate::connection::{ConnectionManager, ConnectionState, ConnectionStatus};
use crate::infrastructure::TaskManager;
use crate::logs::{LogEntry, LogPoller};
use crate::notifications::{Notification, NotificationKind, NotificationQueue};
use crate::signals::SignalSet;
use crate::types::Result;
use tokio::sync::{mpsc, oneshot, watch};
use uuid::Uuid;

/// The main entry point: one signal channel, its derived state, the operator
/// notifications and the log window.
///
/// `SignalMonitor` manages the WebSocket connection to the controller (with
/// heartbeat and bounded exponential-backoff reconnection), keeps the
/// authoritative [`SignalSet`], raises notifications when signals become
/// active, and polls the historical log on a fixed cadence.
///
/// Every instance owns its own state; dropping it tears everything down.
///
/// # Example
///
/// ```no_run
/// use signal_monitor_rs::{MonitorOptions, SignalMonitor};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut options = MonitorOptions::new("wss://plant.example/ws/signals");
/// options.logs.url = Some("https://plant.example/api/logs".to_string());
///
/// let monitor = SignalMonitor::new(options)?;
/// monitor.start()?;
///
/// let mut signals = monitor.subscribe_signals();
/// while signals.changed().await.is_ok() {
///     println!("Active: {:?}", signals.borrow().active());
/// }
///
/// monitor.stop().await?;
/// # Ok(())
/// # }
/// ```
pub struct SignalMonitor {
    pub(crate) options: MonitorOptions,
    pub(crate) connection: ConnectionManager,
    pub(crate) notifications: NotificationQueue,
    pub(crate) logs: Option<LogPoller>,
    pub(crate) signals: watch::Receiver<SignalSet>,
    pub(crate) drains: mpsc::UnboundedSender<oneshot::Sender<()>>,
    pub(crate) _tasks: TaskManager<&'static str>,
}

impl SignalMonitor {
    /// Creates a monitor using the WebSocket transport and, if configured,
    /// the HTTP log resource. Nothing connects until [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Config`](crate::MonitorError::Config) or
    /// [`MonitorError::UrlParse`](crate::MonitorError::UrlParse) if the
    /// options do not validate.
    pub fn new(options: MonitorOptions) -> Result<Self> {
        SignalMonitorBuilder::new(options)?.build()
    }

    pub fn builder(options: MonitorOptions) -> Result<SignalMonitorBuilder> {
        SignalMonitorBuilder::new(options)
    }

    /// Opens the channel and starts log polling (immediate first fetch)
    pub fn start(&self) -> Result<()> {
        tracing::info!("Starting signal monitor for {}", self.options.channel.endpoint);
        self.connection.connect()?;
        if let Some(logs) = &self.logs {
            logs.start(self.options.logs.poll_interval())?;
        }
        Ok(())
    }

    /// Closes the channel for good, stops polling and clears notifications.
    /// The last signal state and log window stay readable.
    pub async fn stop(&self) -> Result<()> {
        tracing::info!("Stopping signal monitor");
        self.connection.disconnect().await?;
        if let Some(logs) = &self.logs {
            logs.stop();
        }
        // Frames received before the disconnect may still be queued
        self.drain_router().await;
        self.notifications.clear();
        Ok(())
    }

    async fn drain_router(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.drains.send(done_tx).is_err() || done_rx.await.is_err() {
            tracing::debug!("Frame router already finished");
        }
    }

    /// Manual restart of the channel after a terminal failure
    pub async fn reset(&self) -> Result<()> {
        self.connection.reset().await
    }

    pub fn status(&self) -> ConnectionStatus {
        self.connection.status()
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    pub fn has_failed(&self) -> bool {
        self.connection.state() == ConnectionState::Failed
    }

    pub fn subscribe_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.connection.subscribe()
    }

    pub fn signals(&self) -> SignalSet {
        *self.signals.borrow()
    }

    pub fn subscribe_signals(&self) -> watch::Receiver<SignalSet> {
        self.signals.clone()
    }

    /// Visible notifications, newest first
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.list()
    }

    pub fn subscribe_notifications(&self) -> watch::Receiver<Vec<Notification>> {
        self.notifications.subscribe()
    }

    /// Raise a notification on behalf of another component
    pub fn notify(&self, kind: NotificationKind, message: impl Into<String>) -> Uuid {
        self.notifications.push(kind, message)
    }

    pub fn dismiss(&self, id: Uuid) -> bool {
        self.notifications.dismiss(id)
    }

    /// Current log window (empty when polling is disabled)
    pub fn logs(&self) -> Vec<LogEntry> {
        self.logs
            .as_ref()
            .map(LogPoller::entries)
            .unwrap_or_default()
    }

    pub fn subscribe_logs(&self) -> Option<watch::Receiver<Vec<LogEntry>>> {
        self.logs.as_ref().map(LogPoller::subscribe)
    }

    pub fn options(&self) -> &MonitorOptions {
        &self.options
    }
}
