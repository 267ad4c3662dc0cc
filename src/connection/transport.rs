use crate::types::{MonitorError, Result};
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::{FutureExt, Sink, SinkExt, StreamExt};
use std::pin::Pin;
use tokio_tungstenite::tungstenite::Message;

pub type LinkSink = Pin<Box<dyn Sink<Message, Error = MonitorError> + Send>>;
pub type LinkStream = BoxStream<'static, Result<Message>>;

/// Both halves of an open channel
pub struct Link {
    pub sink: LinkSink,
    pub stream: LinkStream,
}

/// Opens links to the endpoint. The connection manager owns reconnect
/// policy; a connector only performs one attempt per call.
pub trait Connector: Send + Sync + 'static {
    fn open(&self, endpoint: &str) -> BoxFuture<'static, Result<Link>>;
}

/// Connector backed by `tokio-tungstenite`
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

impl Connector for WebSocketConnector {
    fn open(&self, endpoint: &str) -> BoxFuture<'static, Result<Link>> {
        let endpoint = endpoint.to_string();
        async move {
            tracing::debug!("Opening WebSocket connection to: {}", endpoint);
            let (ws_stream, response) = tokio_tungstenite::connect_async(endpoint.as_str()).await?;
            tracing::debug!("WebSocket handshake completed ({})", response.status());

            let (write_half, read_half) = ws_stream.split();
            Ok(Link {
                sink: Box::pin(write_half.sink_map_err(MonitorError::from)),
                stream: read_half.map(|msg| msg.map_err(MonitorError::from)).boxed(),
            })
        }
        .boxed()
    }
}
