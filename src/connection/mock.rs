//! Scripted in-memory connector for exercising the connection lifecycle
//! under virtual time.

use super::transport::{Connector, Link};
use crate::types::{MonitorError, Result};
use futures::channel::mpsc as link_channel;
use futures::future::{self, BoxFuture};
use futures::{FutureExt, SinkExt, StreamExt};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;

/// What the next `open` call does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Accept,
    Refuse,
}

/// The server's side of an accepted link
pub(crate) struct ServerEnd {
    to_client: link_channel::UnboundedSender<Result<Message>>,
    from_client: link_channel::UnboundedReceiver<Message>,
}

impl ServerEnd {
    /// Returns false once the client has dropped its end
    pub(crate) fn send_text(&self, text: &str) -> bool {
        self.to_client
            .unbounded_send(Ok(Message::Text(text.into())))
            .is_ok()
    }

    pub(crate) fn send(&self, message: Message) -> bool {
        self.to_client.unbounded_send(Ok(message)).is_ok()
    }

    /// Next message the client wrote, `None` once it closed its sink
    pub(crate) async fn next_sent(&mut self) -> Option<Message> {
        self.from_client.next().await
    }
}

pub(crate) struct MockConnector {
    script: Mutex<VecDeque<Outcome>>,
    opened_at: Mutex<Vec<Instant>>,
    servers: mpsc::UnboundedSender<ServerEnd>,
}

impl MockConnector {
    /// Outcomes are consumed in order; once exhausted every attempt is refused
    pub(crate) fn new(script: Vec<Outcome>) -> (Arc<Self>, mpsc::UnboundedReceiver<ServerEnd>) {
        let (servers, accepted) = mpsc::unbounded_channel();
        let connector = Arc::new(Self {
            script: Mutex::new(script.into()),
            opened_at: Mutex::new(Vec::new()),
            servers,
        });
        (connector, accepted)
    }

    pub(crate) fn opens(&self) -> usize {
        self.opened_at.lock().unwrap().len()
    }

    /// Gaps between consecutive `open` calls, in milliseconds
    pub(crate) fn gaps_ms(&self) -> Vec<u64> {
        let opened_at = self.opened_at.lock().unwrap();
        opened_at
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).as_millis() as u64)
            .collect()
    }
}

impl Connector for MockConnector {
    fn open(&self, _endpoint: &str) -> BoxFuture<'static, Result<Link>> {
        self.opened_at.lock().unwrap().push(Instant::now());
        let outcome = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Outcome::Refuse);

        let result = match outcome {
            Outcome::Refuse => Err(MonitorError::Connection("connection refused".to_string())),
            Outcome::Accept => {
                let (client_tx, from_client) = link_channel::unbounded();
                let (to_client, client_rx) = link_channel::unbounded();
                let _ = self.servers.send(ServerEnd {
                    to_client,
                    from_client,
                });
                Ok(Link {
                    sink: Box::pin(
                        client_tx.sink_map_err(|e| MonitorError::Connection(e.to_string())),
                    ),
                    stream: client_rx.boxed(),
                })
            }
        };
        future::ready(result).boxed()
    }
}
