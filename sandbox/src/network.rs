//! Network service: integer socket ids over the host transport.
//!
//! Client sockets and accepted connections share one id counter; listening
//! sockets have their own. Ids start at 1 and are never reused. Transport
//! signals are only pumped when the guest polls (or the server loop ticks),
//! so every state change the guest sees happens inside one of its calls.
//!
//! Snapshot coalescing applies to sockets the guest opened itself. Messages
//! on accepted connections are always delivered in full: a server must see
//! every client's input.

use std::collections::{BTreeMap, HashMap, VecDeque};

use canopy_hostapi::transport::{ConnectionId, ListenerId, Transport, TransportSignal};
use canopy_primitives::NetworkEvent;

use crate::config::BridgeConfig;
use crate::event_queue::{snapshot_policy, EventQueue};

/// Socket state as reported to the guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Connecting = 0,
    Open = 1,
    Closing = 2,
    Closed = 3,
}

#[derive(Debug)]
struct Socket {
    connection: ConnectionId,
    state: ReadyState,
    /// Opened by the guest rather than accepted by one of its servers.
    outbound: bool,
    /// Sends issued while connecting, flushed in order on open.
    pending: VecDeque<Vec<u8>>,
}

pub struct NetworkService {
    transport: Box<dyn Transport>,
    next_socket_id: i32,
    next_server_id: i32,
    sockets: BTreeMap<i32, Socket>,
    by_connection: HashMap<ConnectionId, i32>,
    servers: BTreeMap<i32, ListenerId>,
    events: EventQueue<NetworkEvent>,
    max_pending_sends: usize,
    secure_listen: bool,
}

impl NetworkService {
    pub fn new(transport: Box<dyn Transport>, config: &BridgeConfig) -> Self {
        Self {
            transport,
            next_socket_id: 1,
            next_server_id: 1,
            sockets: BTreeMap::new(),
            by_connection: HashMap::new(),
            servers: BTreeMap::new(),
            events: EventQueue::new(snapshot_policy(config.coalescing)),
            max_pending_sends: config.max_pending_sends,
            secure_listen: config.secure_listen,
        }
    }

    fn allocate_socket_id(&mut self) -> i32 {
        let id = self.next_socket_id;
        self.next_socket_id += 1;
        id
    }

    fn register(&mut self, connection: ConnectionId, state: ReadyState, outbound: bool) -> i32 {
        let id = self.allocate_socket_id();
        self.sockets.insert(
            id,
            Socket {
                connection,
                state,
                outbound,
                pending: VecDeque::new(),
            },
        );
        self.by_connection.insert(connection, id);
        id
    }

    /// Start connecting to `url`. A connection the host refuses outright
    /// still gets an id; its only event is a close.
    pub fn create_websocket(&mut self, url: &str) -> i32 {
        match self.transport.connect(url) {
            Ok(connection) => {
                let id = self.register(connection, ReadyState::Connecting, true);
                log::debug!("socket #{id} connecting to {url}");
                id
            }
            Err(e) => {
                let id = self.allocate_socket_id();
                log::warn!("socket #{id} could not connect to {url}: {e}");
                self.events.push(NetworkEvent::close(id));
                id
            }
        }
    }

    /// Listen on `port`. Returns the server id even when the host could
    /// not listen; such a server simply never accepts anything.
    pub fn create_server(&mut self, port: i32) -> i32 {
        let id = self.next_server_id;
        self.next_server_id += 1;

        let Ok(port) = u16::try_from(port) else {
            log::warn!("server #{id}: invalid port {port}");
            return id;
        };
        match self.listen(port) {
            Some(listener) => {
                log::debug!("server #{id} listening on port {port}");
                self.servers.insert(id, listener);
            }
            None => log::warn!("server #{id} could not listen on port {port}"),
        }
        id
    }

    fn listen(&mut self, port: u16) -> Option<ListenerId> {
        if self.secure_listen {
            match self.transport.listen(port, true) {
                Ok(listener) => return Some(listener),
                Err(e) => log::warn!("secure listen on port {port} failed, falling back to plain: {e}"),
            }
        }
        match self.transport.listen(port, false) {
            Ok(listener) => Some(listener),
            Err(e) => {
                log::warn!("listen on port {port} failed: {e}");
                None
            }
        }
    }

    /// Fire-and-forget send. Buffered while connecting, dropped when the
    /// socket is closing, closed or unknown.
    pub fn send(&mut self, id: i32, payload: Vec<u8>) {
        let Some(socket) = self.sockets.get_mut(&id) else {
            log::debug!("send to unknown socket #{id} dropped");
            return;
        };
        match socket.state {
            ReadyState::Connecting => {
                if socket.pending.len() >= self.max_pending_sends {
                    log::warn!("socket #{id}: pending send limit reached, message dropped");
                } else {
                    socket.pending.push_back(payload);
                }
            }
            ReadyState::Open => {
                if let Err(e) = self.transport.send(socket.connection, &payload) {
                    log::debug!("send on socket #{id} failed: {e}");
                }
            }
            ReadyState::Closing | ReadyState::Closed => {
                log::debug!("send to closed socket #{id} dropped");
            }
        }
    }

    /// Ask the host to close socket `id`. The close event arrives once the
    /// transport confirms.
    pub fn close(&mut self, id: i32) {
        if let Some(socket) = self.sockets.get_mut(&id) {
            socket.state = ReadyState::Closing;
            socket.pending.clear();
            self.transport.close(socket.connection);
        }
    }

    pub fn ready_state(&self, id: i32) -> ReadyState {
        self.sockets.get(&id).map_or(ReadyState::Closed, |s| s.state)
    }

    pub fn server_ids(&self) -> Vec<i32> {
        self.servers.keys().copied().collect()
    }

    /// Apply every transport signal received since the last pump.
    pub fn pump(&mut self) {
        for signal in self.transport.poll() {
            match signal {
                TransportSignal::Opened(connection) => self.on_opened(connection),
                TransportSignal::Accepted {
                    listener,
                    connection,
                } => {
                    let id = self.register(connection, ReadyState::Open, false);
                    log::debug!("socket #{id} accepted on listener {}", listener.0);
                    self.events.push(NetworkEvent::open(id));
                }
                TransportSignal::Message(connection, payload) => self.on_message(connection, payload),
                TransportSignal::Closed(connection) => self.on_closed(connection),
            }
        }
    }

    fn on_opened(&mut self, connection: ConnectionId) {
        let Some(&id) = self.by_connection.get(&connection) else {
            return;
        };
        let Some(socket) = self.sockets.get_mut(&id) else {
            return;
        };
        if socket.state != ReadyState::Connecting {
            return;
        }
        socket.state = ReadyState::Open;
        log::debug!("socket #{id} open, flushing {} pending sends", socket.pending.len());
        for payload in socket.pending.drain(..) {
            if let Err(e) = self.transport.send(connection, &payload) {
                log::debug!("flush on socket #{id} failed: {e}");
            }
        }
        self.events.push(NetworkEvent::open(id));
    }

    fn on_message(&mut self, connection: ConnectionId, payload: Vec<u8>) {
        let Some(&id) = self.by_connection.get(&connection) else {
            return;
        };
        let event = NetworkEvent::message(id, payload);
        match self.sockets.get(&id) {
            Some(socket) if socket.outbound => self.events.push(event),
            _ => self.events.push_pinned(event),
        }
    }

    fn on_closed(&mut self, connection: ConnectionId) {
        let Some(id) = self.by_connection.remove(&connection) else {
            return;
        };
        if let Some(socket) = self.sockets.remove(&id) {
            if !socket.pending.is_empty() {
                log::warn!("socket #{id} closed with {} unsent messages", socket.pending.len());
            }
        }
        log::debug!("socket #{id} closed");
        self.events.push(NetworkEvent::close(id));
    }

    /// Pump the transport, then take every queued event.
    pub fn poll_events(&mut self) -> Vec<NetworkEvent> {
        self.pump();
        self.events.drain()
    }
}
