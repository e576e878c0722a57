//! Drain-on-poll event queue with a pluggable coalescing policy.

use std::collections::VecDeque;

use canopy_primitives::NetworkEvent;

use crate::config::CoalesceScope;

/// Decides whether an incoming event replaces one still queued.
pub trait CoalescePolicy<E>: Send {
    /// `true` if `incoming` makes `queued` obsolete.
    fn supersedes(&self, queued: &E, incoming: &E) -> bool;
}

/// Never coalesce.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCoalescing;

impl<E> CoalescePolicy<E> for NoCoalescing {
    fn supersedes(&self, _queued: &E, _incoming: &E) -> bool {
        false
    }
}

/// A state-sync snapshot supersedes an older snapshot from the same socket.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerSocketSnapshots;

impl CoalescePolicy<NetworkEvent> for PerSocketSnapshots {
    fn supersedes(&self, queued: &NetworkEvent, incoming: &NetworkEvent) -> bool {
        incoming.is_state_sync() && queued.is_state_sync() && queued.socket_id == incoming.socket_id
    }
}

/// A state-sync snapshot supersedes any older snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalSnapshots;

impl CoalescePolicy<NetworkEvent> for GlobalSnapshots {
    fn supersedes(&self, queued: &NetworkEvent, incoming: &NetworkEvent) -> bool {
        incoming.is_state_sync() && queued.is_state_sync()
    }
}

/// Policy object for a configured scope.
pub fn snapshot_policy(scope: CoalesceScope) -> Box<dyn CoalescePolicy<NetworkEvent>> {
    match scope {
        CoalesceScope::PerSocket => Box::new(PerSocketSnapshots),
        CoalesceScope::Global => Box::new(GlobalSnapshots),
        CoalesceScope::Disabled => Box::new(NoCoalescing),
    }
}

#[derive(Debug)]
struct Queued<E> {
    event: E,
    /// Exempt from the policy in both directions.
    pinned: bool,
}

/// FIFO queue drained as a whole by [`EventQueue::drain`].
pub struct EventQueue<E> {
    events: VecDeque<Queued<E>>,
    policy: Box<dyn CoalescePolicy<E>>,
}

impl<E: Send + 'static> EventQueue<E> {
    pub fn new(policy: Box<dyn CoalescePolicy<E>>) -> Self {
        Self {
            events: VecDeque::new(),
            policy,
        }
    }

    /// Queue without coalescing.
    pub fn plain() -> Self {
        Self::new(Box::new(NoCoalescing))
    }

    /// Append `event`, first removing the most recent queued event it
    /// supersedes. At most one entry is removed: the policy keeps at most
    /// one superseded candidate alive per scope.
    pub fn push(&mut self, event: E) {
        if let Some(i) = self
            .events
            .iter()
            .rposition(|queued| !queued.pinned && self.policy.supersedes(&queued.event, &event))
        {
            self.events.remove(i);
        }
        self.events.push_back(Queued { event, pinned: false });
    }

    /// Append `event` outside the policy: it neither replaces a queued
    /// event nor can be replaced later.
    pub fn push_pinned(&mut self, event: E) {
        self.events.push_back(Queued { event, pinned: true });
    }

    /// Take every queued event, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<E> {
        self.events.drain(..).map(|queued| queued.event).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(socket: i32, tag: u8) -> NetworkEvent {
        let mut payload = vec![0u8; 16];
        payload.push(tag);
        NetworkEvent::message(socket, payload)
    }

    fn incremental(socket: i32, tag: u8) -> NetworkEvent {
        NetworkEvent::message(socket, vec![1, 0, 0, 0, tag])
    }

    #[test]
    fn test_snapshot_supersedes_same_socket() {
        let mut queue = EventQueue::new(snapshot_policy(CoalesceScope::PerSocket));
        queue.push(snapshot(1, b'A'));
        queue.push(incremental(1, b'B'));
        queue.push(snapshot(1, b'C'));
        assert_eq!(queue.drain(), vec![incremental(1, b'B'), snapshot(1, b'C')]);
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_per_socket_keeps_other_sockets() {
        let mut queue = EventQueue::new(snapshot_policy(CoalesceScope::PerSocket));
        queue.push(snapshot(1, b'A'));
        queue.push(snapshot(2, b'B'));
        queue.push(snapshot(1, b'C'));
        assert_eq!(queue.drain(), vec![snapshot(2, b'B'), snapshot(1, b'C')]);
    }

    #[test]
    fn test_global_scope_crosses_sockets() {
        let mut queue = EventQueue::new(snapshot_policy(CoalesceScope::Global));
        queue.push(snapshot(1, b'A'));
        queue.push(NetworkEvent::open(2));
        queue.push(snapshot(2, b'B'));
        assert_eq!(queue.drain(), vec![NetworkEvent::open(2), snapshot(2, b'B')]);
    }

    #[test]
    fn test_disabled_keeps_everything() {
        let mut queue = EventQueue::new(snapshot_policy(CoalesceScope::Disabled));
        queue.push(snapshot(1, b'A'));
        queue.push(snapshot(1, b'B'));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_pinned_events_never_coalesce() {
        let mut queue = EventQueue::new(snapshot_policy(CoalesceScope::Global));
        queue.push_pinned(snapshot(1, b'A'));
        queue.push(snapshot(2, b'B'));
        queue.push_pinned(snapshot(1, b'C'));
        queue.push(snapshot(2, b'D'));
        assert_eq!(
            queue.drain(),
            vec![snapshot(1, b'A'), snapshot(1, b'C'), snapshot(2, b'D')]
        );
    }

    #[test]
    fn test_open_close_never_coalesce() {
        let mut queue = EventQueue::new(snapshot_policy(CoalesceScope::Global));
        queue.push(NetworkEvent::open(1));
        queue.push(NetworkEvent::close(1));
        queue.push(NetworkEvent::open(1));
        assert_eq!(queue.len(), 3);
    }
}
