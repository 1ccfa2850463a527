//! Spectator fan-out.
//!
//! Spectator channels carry the serialized event text and participate
//! in the ack barrier. The monitor channel is a second, out-of-band
//! feed of the same events for dashboards and tests; it is never
//! waited on and dropping behind on it only costs the laggard.

use std::collections::HashMap;

use log::{debug, error, warn};
use tokio::sync::{broadcast, mpsc};

use crate::events::TableEvent;

/// Stable handle for one attached spectator.
pub type SpectatorId = u64;

const MONITOR_BUFFER: usize = 256;

pub struct SpectatorHub {
    spectators: HashMap<SpectatorId, mpsc::Sender<String>>,
    next_id: SpectatorId,
    monitor: broadcast::Sender<TableEvent>,
}

impl SpectatorHub {
    pub fn new() -> Self {
        let (monitor, _) = broadcast::channel(MONITOR_BUFFER);
        Self {
            spectators: HashMap::new(),
            next_id: 0,
            monitor,
        }
    }

    pub fn attach(&mut self, sender: mpsc::Sender<String>) -> SpectatorId {
        let id = self.next_id;
        self.next_id += 1;
        self.spectators.insert(id, sender);
        id
    }

    pub fn detach(&mut self, id: SpectatorId) {
        self.spectators.remove(&id);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.spectators.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spectators.is_empty()
    }

    /// Ids of everyone attached right now; the barrier snapshots this.
    #[must_use]
    pub fn ids(&self) -> Vec<SpectatorId> {
        self.spectators.keys().copied().collect()
    }

    pub fn subscribe_monitor(&self) -> broadcast::Receiver<TableEvent> {
        self.monitor.subscribe()
    }

    /// Serialize once, send to every spectator, and drop whoever has
    /// hung up. Never blocks: a spectator whose feed is full misses
    /// this event and the ack barrier deals with it from there.
    pub fn broadcast(&mut self, event: &TableEvent) {
        // A monitor with no listeners is normal.
        let _ = self.monitor.send(event.clone());
        let message = match serde_json::to_string(event) {
            Ok(message) => message,
            Err(e) => {
                error!("dropping unserializable event: {e}");
                return;
            }
        };
        self.spectators
            .retain(|id, sender| match sender.try_send(message.clone()) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!("spectator {id} feed full, dropping event");
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    debug!("spectator {id} hung up, detaching");
                    false
                }
            });
    }
}

impl Default for SpectatorHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_broadcast_reaches_every_spectator() {
        let mut hub = SpectatorHub::new();
        let (tx_a, mut rx_a) = mpsc::channel(8);
        let (tx_b, mut rx_b) = mpsc::channel(8);
        hub.attach(tx_a);
        hub.attach(tx_b);
        hub.broadcast(&TableEvent::Ping { checkpoint: 1 });
        let line = rx_a.recv().await.unwrap();
        assert!(line.contains("PING"));
        assert_eq!(rx_b.recv().await.unwrap(), line);
    }

    #[tokio::test]
    async fn test_closed_spectators_are_pruned() {
        let mut hub = SpectatorHub::new();
        let (tx, rx) = mpsc::channel(8);
        hub.attach(tx);
        drop(rx);
        assert_eq!(hub.len(), 1);
        hub.broadcast(&TableEvent::Shutdown);
        assert!(hub.is_empty());
    }

    #[tokio::test]
    async fn test_full_feed_drops_the_event_but_keeps_the_spectator() {
        let mut hub = SpectatorHub::new();
        let (tx, mut rx) = mpsc::channel(1);
        hub.attach(tx);
        hub.broadcast(&TableEvent::Ping { checkpoint: 1 });
        hub.broadcast(&TableEvent::Ping { checkpoint: 2 });
        // The second ping was dropped, not queued behind a blocked send.
        assert_eq!(hub.len(), 1);
        let line = rx.recv().await.unwrap();
        assert!(line.contains("\"checkpoint\":1"));
        hub.broadcast(&TableEvent::Ping { checkpoint: 3 });
        assert!(rx.recv().await.unwrap().contains("\"checkpoint\":3"));
    }

    #[tokio::test]
    async fn test_detach_is_idempotent() {
        let mut hub = SpectatorHub::new();
        let (tx, _rx) = mpsc::channel(8);
        let id = hub.attach(tx);
        hub.detach(id);
        hub.detach(id);
        assert!(hub.is_empty());
    }

    #[tokio::test]
    async fn test_monitor_sees_events_without_acking() {
        let mut hub = SpectatorHub::new();
        let mut monitor = hub.subscribe_monitor();
        hub.broadcast(&TableEvent::Ping { checkpoint: 3 });
        match monitor.recv().await.unwrap() {
            TableEvent::Ping { checkpoint } => assert_eq!(checkpoint, 3),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
