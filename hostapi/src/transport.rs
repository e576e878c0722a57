//! Message-oriented transport capability (websocket-like).
//!
//! The bridge never blocks on the transport. Operations return immediately;
//! lifecycle changes and inbound data arrive later as [`TransportSignal`]s,
//! collected by [`Transport::poll`].

use crate::error::HostError;

/// Host handle of one connection, outbound or accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

/// Host handle of one listening endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportSignal {
    /// An outbound connection finished its handshake.
    Opened(ConnectionId),
    /// A listener accepted a new inbound connection, already open.
    Accepted {
        listener: ListenerId,
        connection: ConnectionId,
    },
    /// One complete binary message.
    Message(ConnectionId, Vec<u8>),
    /// The connection is gone, from either side. Delivered at most once.
    Closed(ConnectionId),
}

pub trait Transport: Send {
    /// Begin connecting to `url`. The connection is not usable until an
    /// `Opened` signal arrives.
    fn connect(&mut self, url: &str) -> Result<ConnectionId, HostError>;

    /// Listen for inbound connections on `port`, over a secure channel if
    /// `secure` is set.
    fn listen(&mut self, port: u16, secure: bool) -> Result<ListenerId, HostError>;

    /// Send one binary message on an open connection.
    fn send(&mut self, connection: ConnectionId, payload: &[u8]) -> Result<(), HostError>;

    fn close(&mut self, connection: ConnectionId);

    /// Drain signals that arrived since the last poll, in arrival order.
    fn poll(&mut self) -> Vec<TransportSignal>;
}
