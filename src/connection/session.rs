use super::state::{CloseIntent, ConnectionEvent, ConnectionState, ConnectionStatus};
use super::transport::{Connector, Link, LinkSink, LinkStream};
use crate::config::ChannelConfig;
use crate::infrastructure::{Backoff, Heartbeat, HeartbeatEvent};
use crate::types::Result;
use crate::types::constants::heartbeat;
use futures::future::BoxFuture;
use futures::{SinkExt, StreamExt};
use std::future::pending;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{self, Sleep};
use tokio_tungstenite::tungstenite::Message;

/// Requests from [`ConnectionManager`](super::ConnectionManager) handles
pub(crate) enum Command {
    Connect,
    Disconnect(oneshot::Sender<()>),
    Reset(oneshot::Sender<()>),
}

/// The connection state machine.
///
/// Runs as a single task: commands, link traffic and every timer are
/// multiplexed in one `select!`, so handlers never race each other. All
/// timers are owned fields; clearing a field cancels the timer.
pub(crate) struct Session {
    config: ChannelConfig,
    connector: Arc<dyn Connector>,
    commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<ConnectionEvent>,
    status: watch::Sender<ConnectionStatus>,

    state: ConnectionState,
    intent: CloseIntent,
    backoff: Backoff,
    heartbeat: Heartbeat,

    pending_open: Option<BoxFuture<'static, Result<Link>>>,
    reconnect_timer: Option<Pin<Box<Sleep>>>,
    sink: Option<LinkSink>,
    stream: Option<LinkStream>,
}

impl Session {
    pub(crate) fn new(
        config: ChannelConfig,
        connector: Arc<dyn Connector>,
        commands: mpsc::UnboundedReceiver<Command>,
        events: mpsc::UnboundedSender<ConnectionEvent>,
        status: watch::Sender<ConnectionStatus>,
    ) -> Self {
        Self {
            backoff: Backoff::from_config(&config),
            heartbeat: Heartbeat::new(config.heartbeat_interval(), config.heartbeat_timeout()),
            config,
            connector,
            commands,
            events,
            status,
            state: ConnectionState::Idle,
            intent: CloseIntent::UserRequested,
            pending_open: None,
            reconnect_timer: None,
            sink: None,
            stream: None,
        }
    }

    /// Drives the session until every handle is dropped.
    ///
    /// Branch order matters: commands beat timers (a disconnect queued in the
    /// same tick as a reconnect wins), and inbound traffic beats the heartbeat
    /// deadline (a pong that arrived in time is never reported as a timeout).
    pub(crate) async fn run(mut self) {
        loop {
            tokio::select! {
                biased;
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },
                opened = open_completion(&mut self.pending_open) => {
                    self.handle_opened(opened);
                }
                inbound = next_inbound(&mut self.stream) => {
                    self.handle_inbound(inbound);
                }
                event = self.heartbeat.next_event() => {
                    self.handle_heartbeat(event).await;
                }
                _ = expiry(&mut self.reconnect_timer) => {
                    self.handle_reconnect_due();
                }
            }
        }

        tracing::debug!("All connection handles dropped, shutting down session");
        self.shutdown().await;
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Connect => self.connect(),
            Command::Disconnect(done) => {
                self.shutdown().await;
                let _ = done.send(());
            }
            Command::Reset(done) => {
                self.reset().await;
                let _ = done.send(());
            }
        }
    }

    fn connect(&mut self) {
        match self.state {
            ConnectionState::Connecting | ConnectionState::Connected => {
                tracing::debug!("Already {}, ignoring connect", self.state);
            }
            ConnectionState::Failed => {
                tracing::warn!("Connection has failed permanently; reset it before connecting");
            }
            ConnectionState::Idle | ConnectionState::Reconnecting => {
                self.intent = CloseIntent::Unexpected;
                self.begin_connect();
            }
        }
    }

    /// User-requested close: cancels every timer and never schedules a reconnect
    async fn shutdown(&mut self) {
        self.intent = CloseIntent::UserRequested;
        self.cancel_timers();
        self.close_link().await;

        match self.state {
            ConnectionState::Idle | ConnectionState::Failed => {}
            _ => {
                self.backoff.reset();
                self.transition(ConnectionState::Idle, "Disconnected".to_string());
            }
        }
    }

    /// External intervention: back to `Idle` with a fresh backoff episode
    async fn reset(&mut self) {
        self.intent = CloseIntent::UserRequested;
        self.cancel_timers();
        self.close_link().await;
        self.backoff.reset();
        if self.state != ConnectionState::Idle {
            self.transition(ConnectionState::Idle, "Reset".to_string());
        }
    }

    fn begin_connect(&mut self) {
        self.reconnect_timer = None;
        self.transition(
            ConnectionState::Connecting,
            format!("Connecting to {}", self.config.endpoint),
        );
        self.pending_open = Some(self.connector.open(&self.config.endpoint));
    }

    fn handle_opened(&mut self, opened: Result<Link>) {
        match opened {
            Ok(link) => {
                self.sink = Some(link.sink);
                self.stream = Some(link.stream);
                self.backoff.reset();
                self.heartbeat.start();
                self.transition(ConnectionState::Connected, "Connected".to_string());
            }
            Err(e) => {
                tracing::error!("Connection attempt failed: {}", e);
                self.link_lost(format!("connect failed: {}", e));
            }
        }
    }

    fn handle_inbound(&mut self, inbound: Option<Result<Message>>) {
        match inbound {
            Some(Ok(Message::Text(text))) => {
                // Any frame proves the peer is alive
                self.heartbeat.acknowledge();
                if text.as_str() == heartbeat::PONG {
                    tracing::debug!("Received heartbeat reply");
                    return;
                }
                tracing::debug!("Received frame: {}", text.as_str());
                self.emit(ConnectionEvent::Frame(text.as_str().to_owned()));
            }
            Some(Ok(Message::Ping(data))) => {
                tracing::debug!("Received ping ({} bytes)", data.len());
                self.heartbeat.acknowledge();
            }
            Some(Ok(Message::Pong(data))) => {
                tracing::debug!("Received pong ({} bytes)", data.len());
                self.heartbeat.acknowledge();
            }
            Some(Ok(Message::Binary(data))) => {
                tracing::warn!("Dropping unexpected binary message ({} bytes)", data.len());
            }
            Some(Ok(Message::Frame(_))) => {
                tracing::debug!("Received raw frame (internal)");
            }
            Some(Ok(Message::Close(frame))) => {
                let reason = match frame {
                    Some(close_frame) => format!(
                        "server closed connection: code={}, reason='{}'",
                        close_frame.code, close_frame.reason
                    ),
                    None => "server closed connection".to_string(),
                };
                tracing::warn!("{}", reason);
                self.link_lost(reason);
            }
            Some(Err(e)) => {
                tracing::error!("WebSocket read error: {}", e);
                self.link_lost(format!("read error: {}", e));
            }
            None => {
                tracing::warn!("Connection stream ended");
                self.link_lost("stream ended".to_string());
            }
        }
    }

    async fn handle_heartbeat(&mut self, event: HeartbeatEvent) {
        match event {
            HeartbeatEvent::PingDue => {
                let Some(sink) = self.sink.as_mut() else {
                    return;
                };
                let sent = sink.send(Message::Text(heartbeat::PING.into())).await;
                match sent {
                    Ok(()) => {
                        self.heartbeat.arm();
                        tracing::debug!("Sent heartbeat");
                    }
                    Err(e) => {
                        tracing::error!("[Heartbeat] Failed to send: {}", e);
                        self.link_lost(format!("heartbeat send failed: {}", e));
                    }
                }
            }
            HeartbeatEvent::PongOverdue => {
                tracing::warn!("[Heartbeat] Timeout detected, closing connection");
                self.link_lost("heartbeat timeout".to_string());
            }
        }
    }

    fn handle_reconnect_due(&mut self) {
        if self.intent == CloseIntent::UserRequested || self.state != ConnectionState::Reconnecting
        {
            tracing::debug!("Reconnect timer fired after close, ignoring");
            return;
        }
        tracing::info!("Attempting to reconnect...");
        self.begin_connect();
    }

    /// The single place where reconnect decisions are made
    fn link_lost(&mut self, reason: String) {
        self.cancel_timers();
        // Dropping the halves releases the socket without a close handshake
        self.sink = None;
        self.stream = None;

        if self.intent == CloseIntent::UserRequested {
            tracing::debug!("Link closed after user request, not reconnecting");
            return;
        }

        let attempt = self.backoff.record_failure();
        let max_attempts = self.config.max_reconnect_attempts;
        if attempt >= max_attempts {
            tracing::error!("Giving up after {} attempts", attempt);
            self.transition(
                ConnectionState::Failed,
                format!(
                    "Connection failed after {} attempts ({}); restart required",
                    attempt, reason
                ),
            );
            return;
        }

        let delay = self.backoff.next_delay();
        self.reconnect_timer = Some(Box::pin(time::sleep(delay)));
        self.transition(
            ConnectionState::Reconnecting,
            format!(
                "Connection lost ({}); reconnecting in {} ms (attempt {}/{})",
                reason,
                delay.as_millis(),
                attempt,
                max_attempts
            ),
        );
    }

    fn cancel_timers(&mut self) {
        self.pending_open = None;
        self.reconnect_timer = None;
        self.heartbeat.stop();
    }

    async fn close_link(&mut self) {
        self.stream = None;
        if let Some(mut sink) = self.sink.take()
            && let Err(e) = sink.close().await
        {
            tracing::debug!("Error while closing link: {}", e);
        }
    }

    fn transition(&mut self, state: ConnectionState, message: String) {
        self.state = state;
        let attempts = self.backoff.attempts();
        tracing::info!("Connection {}: {}", state, message);

        self.status.send_replace(ConnectionStatus {
            state,
            message: message.clone(),
            attempts,
        });
        self.emit(ConnectionEvent::Status { state, message });
        self.emit(ConnectionEvent::Attempts(attempts));
    }

    fn emit(&self, event: ConnectionEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("Connection event receiver dropped");
        }
    }
}

async fn open_completion(open: &mut Option<BoxFuture<'static, Result<Link>>>) -> Result<Link> {
    let result = match open.as_mut() {
        Some(future) => future.await,
        None => pending().await,
    };
    *open = None;
    result
}

async fn next_inbound(stream: &mut Option<LinkStream>) -> Option<Result<Message>> {
    match stream.as_mut() {
        Some(stream) => stream.next().await,
        None => pending().await,
    }
}

async fn expiry(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer.as_mut() {
        Some(sleep) => sleep.as_mut().await,
        None => pending().await,
    }
    *timer = None;
}
