//! The aggregator actors, applying host events to the [`PeerRegistry`].
//!
//! The two host queues are drained independently: a [`ConnectionAggregator`]
//! consumes [`TraceEvent`]s and an [`IdentificationAggregator`] consumes
//! [`IdentificationEvent`]s. Several copies of either may run against the same
//! queue, since every event is delivered to exactly one receiver.

use crate::{CancellableContext, CrawlerActor};
use async_channel::Receiver;
use async_trait::async_trait;
use ethcrawl_p2p::{
    ConnectionAttemptEvent, ConnectionEvent, DisconnectionEvent, IdentificationEvent,
    MessageEvent, TraceEvent, multiaddr_ip,
};
use ethcrawl_peers::{GossipTopic, IpLocator, PeerRegistry};
use std::sync::Arc;
use thiserror::Error;
use tokio::select;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// The start context of an aggregator: the queue it drains and its cancellation scope.
#[derive(Debug)]
pub struct AggregatorContext<E> {
    /// The receiving end of a host queue.
    pub events: Receiver<E>,
    /// The cancellation token, shared between all tasks.
    pub cancellation: CancellationToken,
}

impl<E: Send> CancellableContext for AggregatorContext<E> {
    fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.cancellation.cancelled()
    }
}

/// An error from an aggregator actor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregatorError {
    /// The host closed the queue while the crawler was still running.
    #[error("the {0} queue closed unexpectedly")]
    QueueClosed(&'static str),
}

/// Drains `context` until cancellation, handing each event to `apply`.
///
/// A queue closed outside of a shutdown cancels the whole crawler.
async fn drain<E, F, Fut>(
    queue: &'static str,
    context: AggregatorContext<E>,
    mut apply: F,
) -> Result<(), AggregatorError>
where
    E: Send,
    F: FnMut(E) -> Fut + Send,
    Fut: Future<Output = ()> + Send,
{
    loop {
        select! {
            biased;

            _ = context.cancelled() => {
                info!(target: "service::aggregator", queue, "Received shutdown signal. Exiting aggregator task.");
                return Ok(());
            }
            event = context.events.recv() => {
                let Ok(event) = event else {
                    if context.cancellation.is_cancelled() {
                        return Ok(());
                    }
                    error!(target: "service::aggregator", queue, "Host queue closed unexpectedly");
                    context.cancellation.cancel();
                    return Err(AggregatorError::QueueClosed(queue));
                };
                apply(event).await;
            }
        }
    }
}

/// Applies connection, disconnection, dial and message events to the [`PeerRegistry`].
#[derive(Debug, Clone)]
pub struct ConnectionAggregator {
    registry: PeerRegistry,
}

impl ConnectionAggregator {
    /// Creates a new [`ConnectionAggregator`] writing into `registry`.
    pub const fn new(registry: PeerRegistry) -> Self {
        Self { registry }
    }

    /// Applies a single [`TraceEvent`] to the addressed peer.
    pub fn apply(&self, event: TraceEvent) {
        let peer_id = event.peer_id().to_string();
        match event {
            TraceEvent::Connection(ConnectionEvent { direction, remote_addr, timestamp, .. }) => {
                self.registry.with_peer(&peer_id, |peer| {
                    peer.record_connection(direction, timestamp);
                    if peer.ip.is_empty() {
                        if let Some(ip) = multiaddr_ip(&remote_addr) {
                            peer.ip = ip.to_string();
                        }
                    }
                });
                debug!(target: "service::aggregator", %peer_id, %direction, "Peer connected");
            }
            TraceEvent::Disconnection(DisconnectionEvent { timestamp, .. }) => {
                self.registry.with_peer(&peer_id, |peer| peer.record_disconnection(timestamp));
                debug!(target: "service::aggregator", %peer_id, "Peer disconnected");
            }
            TraceEvent::ConnectionAttempt(ConnectionAttemptEvent { succeeded, error, .. }) => {
                self.registry
                    .with_peer(&peer_id, |peer| peer.record_connection_attempt(succeeded, &error));
                if !succeeded {
                    debug!(target: "service::aggregator", %peer_id, %error, "Connection attempt failed");
                }
            }
            TraceEvent::Message(MessageEvent { topic, .. }) => {
                let name = GossipTopic::name_from_full(&topic);
                if let Err(err) = self.registry.with_peer(&peer_id, |peer| peer.count_message(name)) {
                    debug!(target: "service::aggregator", %peer_id, %err, "Dropping message on untracked topic");
                }
            }
        }
    }
}

#[async_trait]
impl CrawlerActor for ConnectionAggregator {
    type Error = AggregatorError;
    type StartData = AggregatorContext<TraceEvent>;

    async fn start(self, context: Self::StartData) -> Result<(), Self::Error> {
        drain("connection", context, |event| {
            self.apply(event);
            std::future::ready(())
        })
        .await
    }
}

/// Applies identify results to the [`PeerRegistry`] and geolocates identified peers.
#[derive(Debug, Clone)]
pub struct IdentificationAggregator {
    registry: PeerRegistry,
    ip_locator: Arc<dyn IpLocator>,
}

impl IdentificationAggregator {
    /// Creates a new [`IdentificationAggregator`].
    pub fn new(registry: PeerRegistry, ip_locator: Arc<dyn IpLocator>) -> Self {
        Self { registry, ip_locator }
    }

    /// Applies a single [`IdentificationEvent`] to the addressed peer.
    pub async fn apply(&self, event: IdentificationEvent) {
        let peer_id = event.peer_id.to_string();
        let identification = match event.result {
            Ok(identification) => identification,
            Err(err) => {
                debug!(target: "service::aggregator", %peer_id, %err, "Identification failed");
                self.registry.with_peer(&peer_id, |peer| peer.record_metadata_request(false));
                return;
            }
        };

        let ip = identification.ip;
        let addrs = identification
            .listen_addrs
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        self.registry.with_peer(&peer_id, |peer| {
            peer.set_user_agent(identification.user_agent);
            peer.pubkey = identification.pubkey;
            peer.addrs = addrs;
            if let Some(ip) = ip {
                peer.ip = ip.to_string();
            }
            peer.latency = identification.latency.as_secs_f64();
            peer.record_metadata_request(true);
        });

        if let Some(ip) = ip {
            match self.ip_locator.locate(ip).await {
                Ok(location) => self.registry.with_peer(&peer_id, |peer| {
                    peer.country = location.country;
                    peer.city = location.city;
                }),
                Err(err) => debug!(target: "service::aggregator", %peer_id, %err, "Failed to locate peer"),
            }
        }

        self.registry.with_peer(&peer_id, |peer| peer.log_peer());
    }
}

#[async_trait]
impl CrawlerActor for IdentificationAggregator {
    type Error = AggregatorError;
    type StartData = AggregatorContext<IdentificationEvent>;

    async fn start(self, context: Self::StartData) -> Result<(), Self::Error> {
        drain("identification", context, |event| self.apply(event)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ethcrawl_p2p::Identification;
    use ethcrawl_peers::{Direction, ErrorKind, Location, LocatorError, NoopLocator};
    use libp2p::{Multiaddr, PeerId, gossipsub::MessageId};
    use std::{
        net::{IpAddr, Ipv4Addr},
        time::Duration,
    };

    #[derive(Debug)]
    struct FixedLocator;

    #[async_trait]
    impl IpLocator for FixedLocator {
        async fn locate(&self, _ip: IpAddr) -> Result<Location, LocatorError> {
            Ok(Location { country: "Germany".to_string(), city: "Berlin".to_string() })
        }
    }

    fn at(secs: i64) -> chrono::DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn addr() -> Multiaddr {
        "/ip4/10.0.0.1/tcp/9000".parse().unwrap()
    }

    fn message(peer_id: PeerId, topic: &str) -> TraceEvent {
        TraceEvent::Message(MessageEvent {
            peer_id,
            topic: topic.to_string(),
            message_id: MessageId::new(b"id"),
            timestamp: at(0),
        })
    }

    fn identified(peer_id: PeerId) -> IdentificationEvent {
        IdentificationEvent {
            peer_id,
            timestamp: at(1),
            result: Ok(Identification {
                user_agent: "Lighthouse/v5.1.3-3058b96/x86_64-linux".to_string(),
                protocol_version: "eth2/1.0.0".to_string(),
                pubkey: "02ab".to_string(),
                listen_addrs: vec![addr(), "/ip4/10.0.0.1/udp/9000/quic-v1".parse().unwrap()],
                protocols: vec!["/ipfs/ping/1.0.0".to_string()],
                ip: Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))),
                latency: Duration::from_millis(250),
            }),
        }
    }

    #[test]
    fn test_apply_connection_lifecycle() {
        let registry = PeerRegistry::new();
        let aggregator = ConnectionAggregator::new(registry.clone());
        let peer_id = PeerId::random();

        aggregator.apply(TraceEvent::ConnectionAttempt(ConnectionAttemptEvent {
            peer_id,
            succeeded: true,
            error: String::new(),
            timestamp: at(0),
        }));
        aggregator.apply(TraceEvent::Connection(ConnectionEvent {
            peer_id,
            direction: Direction::Outbound,
            remote_addr: addr(),
            timestamp: at(0),
        }));

        let peer = registry.get(&peer_id.to_string()).unwrap();
        assert!(peer.attempted());
        assert!(peer.succeeded);
        assert!(peer.is_connected);
        assert_eq!(peer.connected_direction, Some(Direction::Outbound));
        assert_eq!(peer.ip, "10.0.0.1");

        aggregator.apply(TraceEvent::Disconnection(DisconnectionEvent {
            peer_id,
            timestamp: at(60),
        }));

        let peer = registry.get(&peer_id.to_string()).unwrap();
        assert!(!peer.is_connected);
        assert_eq!(peer.connected_direction, None);
        assert_eq!(peer.connected_duration(), 1.0);
    }

    #[test]
    fn test_apply_failed_attempt() {
        let registry = PeerRegistry::new();
        let aggregator = ConnectionAggregator::new(registry.clone());
        let peer_id = PeerId::random();

        aggregator.apply(TraceEvent::ConnectionAttempt(ConnectionAttemptEvent {
            peer_id,
            succeeded: false,
            error: "dial tcp: i/o timeout".to_string(),
            timestamp: at(0),
        }));

        let peer = registry.get(&peer_id.to_string()).unwrap();
        assert_eq!(peer.attempts(), 1);
        assert!(!peer.succeeded);
        assert_eq!(peer.error, Some(ErrorKind::classify("dial tcp: i/o timeout")));
    }

    #[test]
    fn test_apply_messages() {
        let registry = PeerRegistry::new();
        let aggregator = ConnectionAggregator::new(registry.clone());
        let peer_id = PeerId::random();

        aggregator.apply(message(peer_id, "/eth2/6a95a1a9/beacon_block/ssz_snappy"));
        aggregator.apply(message(peer_id, "/eth2/6a95a1a9/beacon_block/ssz_snappy"));
        aggregator.apply(message(peer_id, "/eth2/6a95a1a9/voluntary_exit/ssz_snappy"));
        aggregator.apply(message(peer_id, "/eth2/6a95a1a9/sync_committee_0/ssz_snappy"));

        let peer = registry.get(&peer_id.to_string()).unwrap();
        assert_eq!(peer.message_metrics(GossipTopic::BeaconBlock).count(), 2);
        assert_eq!(peer.message_metrics(GossipTopic::VoluntaryExit).count(), 1);
        assert_eq!(peer.all_messages_count(), 3);
    }

    #[tokio::test]
    async fn test_apply_identification() {
        let registry = PeerRegistry::new();
        let aggregator = IdentificationAggregator::new(registry.clone(), Arc::new(FixedLocator));
        let peer_id = PeerId::random();

        aggregator.apply(identified(peer_id)).await;

        let peer = registry.get(&peer_id.to_string()).unwrap();
        assert_eq!(peer.user_agent, "Lighthouse/v5.1.3-3058b96/x86_64-linux");
        assert_eq!(peer.client.name.as_deref(), Some("Lighthouse"));
        assert_eq!(peer.pubkey, "02ab");
        assert_eq!(peer.addrs, "/ip4/10.0.0.1/tcp/9000 /ip4/10.0.0.1/udp/9000/quic-v1");
        assert_eq!(peer.ip, "10.0.0.1");
        assert_eq!(peer.latency, 0.25);
        assert_eq!(peer.country, "Germany");
        assert_eq!(peer.city, "Berlin");
        assert!(peer.metadata_requested);
        assert!(peer.metadata_succeeded);
    }

    #[tokio::test]
    async fn test_apply_failed_identification() {
        let registry = PeerRegistry::new();
        let aggregator = IdentificationAggregator::new(registry.clone(), Arc::new(NoopLocator));
        let peer_id = PeerId::random();

        aggregator
            .apply(IdentificationEvent {
                peer_id,
                timestamp: at(0),
                result: Err("stream closed".to_string()),
            })
            .await;

        let peer = registry.get(&peer_id.to_string()).unwrap();
        assert!(peer.metadata_requested);
        assert!(!peer.metadata_succeeded);
        assert!(peer.user_agent.is_empty());
    }

    #[tokio::test]
    async fn test_unlocated_identification_keeps_location_empty() {
        let registry = PeerRegistry::new();
        let aggregator = IdentificationAggregator::new(registry.clone(), Arc::new(NoopLocator));
        let peer_id = PeerId::random();

        aggregator.apply(identified(peer_id)).await;

        let peer = registry.get(&peer_id.to_string()).unwrap();
        assert_eq!(peer.ip, "10.0.0.1");
        assert!(peer.country.is_empty());
        assert!(peer.city.is_empty());
    }

    #[tokio::test]
    async fn test_start_drains_until_cancelled() {
        let registry = PeerRegistry::new();
        let (tx, rx) = async_channel::bounded(8);
        let cancellation = CancellationToken::new();
        let peer_id = PeerId::random();

        let task = tokio::spawn(ConnectionAggregator::new(registry.clone()).start(
            AggregatorContext { events: rx, cancellation: cancellation.clone() },
        ));

        tx.send(message(peer_id, "/eth2/6a95a1a9/beacon_block/ssz_snappy")).await.unwrap();
        tokio::time::timeout(Duration::from_secs(5), async {
            while registry.get(&peer_id.to_string()).map(|p| p.all_messages_count()) != Some(1) {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();

        cancellation.cancel();
        assert_eq!(task.await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn test_start_closed_queue_cancels() {
        let registry = PeerRegistry::new();
        let (tx, rx) = async_channel::bounded(8);
        let cancellation = CancellationToken::new();
        let peer_id = PeerId::random();

        tx.send(identified(peer_id)).await.unwrap();
        tx.close();

        let result = IdentificationAggregator::new(registry.clone(), Arc::new(NoopLocator))
            .start(AggregatorContext { events: rx, cancellation: cancellation.clone() })
            .await;

        assert_eq!(result, Err(AggregatorError::QueueClosed("identification")));
        assert!(cancellation.is_cancelled());
        assert!(registry.get(&peer_id.to_string()).unwrap().metadata_succeeded);
    }
}
