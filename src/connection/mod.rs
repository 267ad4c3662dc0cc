// Module declarations
mod manager;
#[cfg(test)]
pub(crate) mod mock;
mod session;
mod state;
mod transport;

// Public API exports
pub use manager::ConnectionManager;
pub use state::{CloseIntent, ConnectionEvent, ConnectionState, ConnectionStatus};
pub use transport::{Connector, Link, LinkSink, LinkStream, WebSocketConnector};
