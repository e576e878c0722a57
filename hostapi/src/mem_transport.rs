//! In-memory transport for tests and loopback embedders.
//!
//! `MemTransport` is a cheap handle over shared state: keep one clone to
//! drive the "remote" side (open, deliver, close, accept) while the bridge
//! owns another.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::HostError;
use crate::transport::{ConnectionId, ListenerId, Transport, TransportSignal};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemConnection {
    /// Target URL for outbound connections; `None` for accepted ones.
    pub url: Option<String>,
    pub open: bool,
    pub closed: bool,
    pub sent: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemListener {
    pub port: u16,
    pub secure: bool,
}

#[derive(Debug, Default)]
struct MemTransportState {
    next_id: u64,
    connections: BTreeMap<ConnectionId, MemConnection>,
    listeners: BTreeMap<ListenerId, MemListener>,
    signals: VecDeque<TransportSignal>,
    refuse_secure: bool,
    refuse_connect: bool,
}

impl MemTransportState {
    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemTransport {
    state: Arc<Mutex<MemTransportState>>,
}

impl MemTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemTransportState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make every secure `listen` fail, as a host without certificates would.
    pub fn refuse_secure(&self, refuse: bool) {
        self.lock().refuse_secure = refuse;
    }

    /// Make every `connect` fail immediately.
    pub fn refuse_connect(&self, refuse: bool) {
        self.lock().refuse_connect = refuse;
    }

    // ── Remote side ──

    /// Complete the handshake of an outbound connection.
    pub fn open(&self, connection: ConnectionId) {
        let mut guard = self.lock();
        let state = &mut *guard;
        if let Some(conn) = state.connections.get_mut(&connection) {
            if conn.open || conn.closed {
                return;
            }
            conn.open = true;
            state.signals.push_back(TransportSignal::Opened(connection));
        }
    }

    /// Deliver one inbound message.
    pub fn deliver(&self, connection: ConnectionId, payload: &[u8]) {
        let mut state = self.lock();
        if state.connections.get(&connection).is_some_and(|c| !c.closed) {
            state
                .signals
                .push_back(TransportSignal::Message(connection, payload.to_vec()));
        }
    }

    /// Close a connection from the remote side.
    pub fn close_remote(&self, connection: ConnectionId) {
        let mut guard = self.lock();
        let state = &mut *guard;
        if let Some(conn) = state.connections.get_mut(&connection) {
            if conn.closed {
                return;
            }
            conn.closed = true;
            conn.open = false;
            state.signals.push_back(TransportSignal::Closed(connection));
        }
    }

    /// Accept a new inbound connection on `listener`.
    pub fn accept(&self, listener: ListenerId) -> Option<ConnectionId> {
        let mut state = self.lock();
        if !state.listeners.contains_key(&listener) {
            return None;
        }
        let connection = ConnectionId(state.next());
        state.connections.insert(
            connection,
            MemConnection {
                url: None,
                open: true,
                closed: false,
                sent: Vec::new(),
            },
        );
        state.signals.push_back(TransportSignal::Accepted {
            listener,
            connection,
        });
        Some(connection)
    }

    // ── Inspection ──

    pub fn connection(&self, connection: ConnectionId) -> Option<MemConnection> {
        self.lock().connections.get(&connection).cloned()
    }

    /// Most recent outbound connection to `url`.
    pub fn connection_to(&self, url: &str) -> Option<ConnectionId> {
        self.lock()
            .connections
            .iter()
            .rev()
            .find(|(_, c)| c.url.as_deref() == Some(url))
            .map(|(id, _)| *id)
    }

    pub fn sent(&self, connection: ConnectionId) -> Vec<Vec<u8>> {
        self.lock()
            .connections
            .get(&connection)
            .map(|c| c.sent.clone())
            .unwrap_or_default()
    }

    pub fn listeners(&self) -> Vec<(ListenerId, MemListener)> {
        self.lock()
            .listeners
            .iter()
            .map(|(id, l)| (*id, l.clone()))
            .collect()
    }
}

impl Transport for MemTransport {
    fn connect(&mut self, url: &str) -> Result<ConnectionId, HostError> {
        let mut state = self.lock();
        if state.refuse_connect {
            return Err(HostError::transport(format!("connection to {url} refused")));
        }
        let id = ConnectionId(state.next());
        state.connections.insert(
            id,
            MemConnection {
                url: Some(url.to_string()),
                open: false,
                closed: false,
                sent: Vec::new(),
            },
        );
        Ok(id)
    }

    fn listen(&mut self, port: u16, secure: bool) -> Result<ListenerId, HostError> {
        let mut state = self.lock();
        if secure && state.refuse_secure {
            return Err(HostError::transport("no certificate available"));
        }
        if state.listeners.values().any(|l| l.port == port) {
            return Err(HostError::transport(format!("port {port} already in use")));
        }
        let id = ListenerId(state.next());
        state.listeners.insert(id, MemListener { port, secure });
        Ok(id)
    }

    fn send(&mut self, connection: ConnectionId, payload: &[u8]) -> Result<(), HostError> {
        let mut state = self.lock();
        match state.connections.get_mut(&connection) {
            Some(conn) if conn.open => {
                conn.sent.push(payload.to_vec());
                Ok(())
            }
            Some(_) => Err(HostError::transport("connection not open")),
            None => Err(HostError::not_found(format!("connection {}", connection.0))),
        }
    }

    fn close(&mut self, connection: ConnectionId) {
        self.close_remote(connection);
    }

    fn poll(&mut self) -> Vec<TransportSignal> {
        self.lock().signals.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_open_send() {
        let remote = MemTransport::new();
        let mut local = remote.clone();
        let id = local.connect("ws://example").unwrap();
        assert!(local.send(id, b"early").is_err());

        remote.open(id);
        assert_eq!(local.poll(), vec![TransportSignal::Opened(id)]);
        local.send(id, b"hi").unwrap();
        assert_eq!(remote.sent(id), vec![b"hi".to_vec()]);
        assert_eq!(remote.connection_to("ws://example"), Some(id));
    }

    #[test]
    fn test_close_signalled_once() {
        let remote = MemTransport::new();
        let mut local = remote.clone();
        let id = local.connect("ws://x").unwrap();
        remote.open(id);
        remote.close_remote(id);
        remote.close_remote(id);
        local.close(id);
        let signals = local.poll();
        assert_eq!(
            signals,
            vec![TransportSignal::Opened(id), TransportSignal::Closed(id)]
        );
    }

    #[test]
    fn test_listen_and_accept() {
        let remote = MemTransport::new();
        let mut local = remote.clone();
        let listener = local.listen(8080, false).unwrap();
        assert!(local.listen(8080, false).is_err());
        let conn = remote.accept(listener).unwrap();
        remote.deliver(conn, b"ping");
        assert_eq!(
            local.poll(),
            vec![
                TransportSignal::Accepted {
                    listener,
                    connection: conn
                },
                TransportSignal::Message(conn, b"ping".to_vec()),
            ]
        );
    }

    #[test]
    fn test_refuse_secure() {
        let remote = MemTransport::new();
        let mut local = remote.clone();
        remote.refuse_secure(true);
        assert!(local.listen(443, true).is_err());
        assert!(local.listen(443, false).is_ok());
        assert_eq!(remote.listeners().len(), 1);
    }
}
