use super::session::{Command, Session};
use super::state::{ConnectionEvent, ConnectionState, ConnectionStatus};
use super::transport::Connector;
use crate::config::ChannelConfig;
use crate::types::{MonitorError, Result};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};

/// Handle to one logical channel to the controller.
///
/// The channel itself lives in a background session task which owns the
/// socket, the heartbeat and the reconnect timer. Handles are cheap to clone;
/// when the last one is dropped the session closes the link the same way
/// [`disconnect`](Self::disconnect) does.
///
/// Everything the session observes is reported, in order, on the
/// [`ConnectionEvent`] receiver returned by [`spawn`](Self::spawn).
#[derive(Clone)]
pub struct ConnectionManager {
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<ConnectionStatus>,
}

impl ConnectionManager {
    /// Starts the session task in `Idle`. Must be called inside a tokio runtime.
    pub fn spawn(
        config: ChannelConfig,
        connector: Arc<dyn Connector>,
    ) -> (Self, mpsc::UnboundedReceiver<ConnectionEvent>) {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::default());

        let session = Session::new(config, connector, commands_rx, events_tx, status_tx);
        tokio::spawn(session.run());

        (
            Self {
                commands: commands_tx,
                status: status_rx,
            },
            events_rx,
        )
    }

    /// Opens the channel. No-op while connecting or connected; ignored once
    /// the manager has failed permanently (see [`reset`](Self::reset)).
    pub fn connect(&self) -> Result<()> {
        self.commands
            .send(Command::Connect)
            .map_err(|_| MonitorError::Closed)
    }

    /// Closes the channel for good: cancels every pending timer and never
    /// schedules a reconnect. Idempotent.
    ///
    /// Resolves once the session has processed the request, so no timer
    /// armed before the call can act afterwards.
    pub async fn disconnect(&self) -> Result<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.commands
            .send(Command::Disconnect(done_tx))
            .map_err(|_| MonitorError::Closed)?;
        done_rx.await.map_err(|_| MonitorError::Closed)
    }

    /// Manual restart: closes any link, clears the attempt counter and
    /// returns to `Idle`, including from `Failed`.
    pub async fn reset(&self) -> Result<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.commands
            .send(Command::Reset(done_tx))
            .map_err(|_| MonitorError::Closed)?;
        done_rx.await.map_err(|_| MonitorError::Closed)
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status.borrow().clone()
    }

    pub fn state(&self) -> ConnectionState {
        self.status.borrow().state
    }

    /// Failures in the current episode
    pub fn attempts(&self) -> u32 {
        self.status.borrow().attempts
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.clone()
    }
}
