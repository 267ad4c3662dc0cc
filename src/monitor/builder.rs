use super::{FrameRouter, SignalMonitor};
use crate::config::MonitorOptions;
use crate::connection::{ConnectionManager, Connector, WebSocketConnector};
use crate::infrastructure::{HttpLogSource, TaskManager};
use crate::logs::{LogPoller, LogSource};
use crate::notifications::NotificationQueue;
use crate::signals::SignalSet;
use crate::types::Result;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Builder for [`SignalMonitor`] that validates options and wires the components
pub struct SignalMonitorBuilder {
    options: MonitorOptions,
    connector: Option<Arc<dyn Connector>>,
    log_source: Option<Arc<dyn LogSource>>,
}

impl SignalMonitorBuilder {
    /// Create a new builder; fails if the options do not validate
    pub fn new(options: MonitorOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            connector: None,
            log_source: None,
        })
    }

    /// Replace the WebSocket transport
    pub fn with_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Replace the HTTP log resource; enables polling even without a log URL
    pub fn with_log_source(mut self, source: Arc<dyn LogSource>) -> Self {
        self.log_source = Some(source);
        self
    }

    /// Build the monitor and spawn its background tasks (still `Idle` until
    /// [`SignalMonitor::start`]). Must be called inside a tokio runtime.
    pub fn build(self) -> Result<SignalMonitor> {
        let options = self.options;

        let log_source = match (self.log_source, &options.logs.url) {
            (Some(source), _) => Some(source),
            (None, Some(url)) => {
                // A request never outlives one polling period
                let source: Arc<dyn LogSource> = Arc::new(HttpLogSource::new(
                    url,
                    options.logs.entry_cap,
                    options.logs.poll_interval(),
                )?);
                Some(source)
            }
            (None, None) => None,
        };

        let connector = self
            .connector
            .unwrap_or_else(|| Arc::new(WebSocketConnector));

        let notifications = NotificationQueue::new(options.notifications.clone());
        let (connection, events) = ConnectionManager::spawn(options.channel.clone(), connector);

        let (signals_tx, signals_rx) = watch::channel(SignalSet::default());
        let router = FrameRouter::new(notifications.clone(), signals_tx);

        let (drains, drain_requests) = mpsc::unbounded_channel();
        let mut tasks = TaskManager::new();
        tasks.spawn("router", router.run(events, drain_requests));

        let logs = log_source.map(|source| LogPoller::new(source, notifications.clone()));
        if logs.is_none() {
            tracing::info!("No log resource configured, log polling disabled");
        }

        Ok(SignalMonitor {
            options,
            connection,
            notifications,
            logs,
            signals: signals_rx,
            drains,
            _tasks: tasks,
        })
    }
}
