//! Contains the [`PeerRegistry`].

use crate::Peer;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use std::{collections::HashMap, sync::Arc};

type PeerMap = HashMap<String, Arc<Mutex<Peer>>>;

/// The shared map of peer id to [`Peer`].
///
/// Every peer sits behind its own lock, so two callers never mutate the same
/// peer at once while different peers can be mutated concurrently. The outer
/// map lock is only held long enough to look up or insert an entry.
///
/// Cloning the registry yields another handle to the same peers.
#[derive(Debug, Default, Clone)]
pub struct PeerRegistry {
    peers: Arc<RwLock<PeerMap>>,
}

impl PeerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for `peer_id`, creating a zero-valued [`Peer`] if absent.
    pub fn get_or_create(&self, peer_id: &str) -> Arc<Mutex<Peer>> {
        if let Some(peer) = self.peers.read().get(peer_id) {
            return Arc::clone(peer);
        }

        let mut peers = self.peers.write();
        let peer = peers.entry(peer_id.to_string()).or_insert_with(|| {
            trace!(target: "peers::registry", peer_id, "Tracking new peer");
            Arc::new(Mutex::new(Peer::new(peer_id)))
        });
        Arc::clone(peer)
    }

    /// Runs `f` with exclusive access to the peer, creating it if absent.
    pub fn with_peer<R>(&self, peer_id: &str, f: impl FnOnce(&mut Peer) -> R) -> R {
        let peer = self.get_or_create(peer_id);
        let mut guard = peer.lock();
        f(&mut guard)
    }

    /// Returns a copy of the peer, if tracked.
    pub fn get(&self, peer_id: &str) -> Option<Peer> {
        let peer = self.peers.read().get(peer_id).cloned()?;
        let peer = peer.lock().clone();
        Some(peer)
    }

    /// Stops tracking the peer, returning its last state.
    pub fn remove(&self, peer_id: &str) -> Option<Peer> {
        let peer = self.peers.write().remove(peer_id)?;
        let peer = peer.lock().clone();
        Some(peer)
    }

    /// Returns whether the peer is tracked.
    pub fn contains(&self, peer_id: &str) -> bool {
        self.peers.read().contains_key(peer_id)
    }

    /// Returns the number of tracked peers.
    pub fn len(&self) -> usize {
        self.peers.read().len()
    }

    /// Returns whether no peer is tracked.
    pub fn is_empty(&self) -> bool {
        self.peers.read().is_empty()
    }

    /// Returns a copy of every tracked peer, ordered by peer id.
    ///
    /// Each peer is copied under its own lock, so the result is consistent per
    /// peer but not across peers.
    pub fn snapshot(&self) -> Vec<Peer> {
        let mut snapshot: Vec<Peer> = self.entries().iter().map(|peer| peer.lock().clone()).collect();
        snapshot.sort_by(|a, b| a.peer_id().cmp(b.peer_id()));
        snapshot
    }

    /// Closes the metrics window of every tracked peer.
    pub fn reset_window(&self) {
        for peer in self.entries() {
            peer.lock().reset_window();
        }
    }

    /// Copies every tracked peer and closes its metrics window, ordered by peer id.
    ///
    /// The copy and the reset happen under the same peer lock, so every count
    /// lands either in the returned window or in the next one.
    pub fn take_window(&self) -> Vec<Peer> {
        let mut window: Vec<Peer> = self
            .entries()
            .iter()
            .map(|peer| {
                let mut peer = peer.lock();
                let closed = peer.clone();
                peer.reset_window();
                closed
            })
            .collect();
        window.sort_by(|a, b| a.peer_id().cmp(b.peer_id()));
        window
    }

    /// Folds windows returned by [`PeerRegistry::take_window`] back into the
    /// tracked peers. Peers no longer tracked are skipped.
    pub fn restore_window(&self, closed: &[Peer]) {
        for closed in closed {
            let Some(peer) = self.peers.read().get(closed.peer_id()).cloned() else {
                continue;
            };
            peer.lock().restore_window(closed);
        }
    }

    /// Stamps the given peers as exported at `time`.
    pub fn mark_exported(&self, exported: &[Peer], time: DateTime<Utc>) {
        for exported in exported {
            if let Some(peer) = self.peers.read().get(exported.peer_id()).cloned() {
                peer.lock().last_export = Some(time);
            }
        }
    }

    /// Clones the entry handles so peer locks are never taken under the map lock.
    fn entries(&self) -> Vec<Arc<Mutex<Peer>>> {
        self.peers.read().values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Direction;
    use chrono::TimeZone;

    #[test]
    fn test_get_or_create_is_idempotent() {
        let registry = PeerRegistry::new();
        assert!(registry.is_empty());

        let a = registry.get_or_create("a");
        let b = registry.get_or_create("a");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("a"));
        assert!(!registry.contains("b"));
    }

    #[test]
    fn test_with_peer_mutates_shared_state() {
        let registry = PeerRegistry::new();
        let clone = registry.clone();

        registry.with_peer("a", |peer| peer.record_connection_attempt(false, "timeout"));
        let attempts = clone.with_peer("a", |peer| {
            peer.record_connection_attempt(true, "");
            peer.attempts()
        });

        assert_eq!(attempts, 2);
        assert_eq!(registry.get("a").unwrap().attempts(), 2);
        assert_eq!(registry.get("missing"), None);
    }

    #[test]
    fn test_snapshot_is_sorted_copy() {
        let registry = PeerRegistry::new();
        for id in ["c", "a", "b"] {
            registry.get_or_create(id);
        }

        let mut snapshot = registry.snapshot();
        let ids: Vec<_> = snapshot.iter().map(|peer| peer.peer_id().to_string()).collect();
        assert_eq!(ids, ["a", "b", "c"]);

        snapshot[0].count_message("beacon_block").unwrap();
        assert_eq!(registry.get("a").unwrap().all_messages_count(), 0);
    }

    #[test]
    fn test_take_window_resets_and_returns_counts() {
        let registry = PeerRegistry::new();
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        registry.with_peer("b", |peer| peer.count_message("beacon_block").unwrap());
        registry.with_peer("a", |peer| {
            peer.record_connection(Direction::Inbound, now);
            peer.record_connection_attempt(true, "");
            peer.count_message("voluntary_exit").unwrap();
        });

        let window = registry.take_window();
        let ids: Vec<_> = window.iter().map(Peer::peer_id).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(window[0].attempts(), 1);
        assert_eq!(window[0].all_messages_count(), 1);

        let peer = registry.get("a").unwrap();
        assert_eq!(peer.attempts(), 0);
        assert_eq!(peer.all_messages_count(), 0);
        assert_eq!(peer.connection_times(), &[now]);
        assert_eq!(peer.last_export, None);

        registry.mark_exported(&window, now);
        assert_eq!(registry.get("a").unwrap().last_export, Some(now));
    }

    #[test]
    fn test_restore_window_keeps_new_counts() {
        let registry = PeerRegistry::new();
        registry.with_peer("a", |peer| peer.count_message("beacon_block").unwrap());

        let window = registry.take_window();
        registry.with_peer("a", |peer| peer.count_message("beacon_block").unwrap());
        registry.restore_window(&window);

        assert_eq!(registry.get("a").unwrap().all_messages_count(), 2);

        registry.remove("a");
        registry.restore_window(&window);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove() {
        let registry = PeerRegistry::new();
        registry.with_peer("a", |peer| peer.node_id = "n".to_string());
        assert_eq!(registry.remove("a").unwrap().node_id, "n");
        assert!(registry.is_empty());
        assert_eq!(registry.remove("a"), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_mutation_is_exclusive() {
        let registry = PeerRegistry::new();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..250 {
                    registry.with_peer("a", |peer| peer.record_connection_attempt(false, "eof"));
                    registry.with_peer("b", |peer| peer.count_message("beacon_block").unwrap());
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(registry.get("a").unwrap().attempts(), 2_000);
        assert_eq!(registry.get("b").unwrap().all_messages_count(), 2_000);
    }
}
