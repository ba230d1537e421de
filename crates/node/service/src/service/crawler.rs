//! Contains the [`Crawler`] service.

use crate::{
    AggregatorContext, ConnectionAggregator, CrawlerActor, CrawlerConfig, CsvPeerStore,
    ExporterActor, ExporterContext, IdentificationAggregator, service::spawn_and_wait,
};
use ethcrawl_p2p::{HostBuilder, HostBuilderError, HostHandle};
use ethcrawl_peers::{IpLocator, PeerRegistry, PeerStore};
use libp2p::Multiaddr;
use libp2p_identity::Keypair;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// An error from running the [`Crawler`].
#[derive(Debug, Error)]
pub enum CrawlerError {
    /// The host could not be built.
    #[error(transparent)]
    Host(#[from] HostBuilderError),
    /// One or more actors failed.
    #[error("crawler actors failed: {}", .0.join("; "))]
    Actors(Vec<String>),
}

/// The crawler service.
///
/// Runs one libp2p host, dials the configured bootnodes, drains both host
/// queues into a shared [`PeerRegistry`] and periodically exports it. All
/// tasks share one [`CancellationToken`]; cancelling it stops the crawler.
#[derive(Debug)]
pub struct Crawler {
    config: CrawlerConfig,
    keypair: Keypair,
    registry: PeerRegistry,
    ip_locator: Option<Arc<dyn IpLocator>>,
    peer_store: Option<Arc<dyn PeerStore>>,
    cancellation: CancellationToken,
}

impl Crawler {
    /// Creates a new [`Crawler`] identified by `keypair`.
    pub fn new(config: CrawlerConfig, keypair: Keypair) -> Self {
        Self {
            config,
            keypair,
            registry: PeerRegistry::new(),
            ip_locator: None,
            peer_store: None,
            cancellation: CancellationToken::new(),
        }
    }

    /// Sets the geolocation collaborator. Peers are not located by default.
    pub fn with_ip_locator(mut self, ip_locator: Arc<dyn IpLocator>) -> Self {
        self.ip_locator = Some(ip_locator);
        self
    }

    /// Sets the storage collaborator. Defaults to a [`CsvPeerStore`] at the configured path.
    pub fn with_peer_store(mut self, peer_store: Arc<dyn PeerStore>) -> Self {
        self.peer_store = Some(peer_store);
        self
    }

    /// Runs the crawler within an existing cancellation scope.
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Returns the configuration.
    pub const fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    /// Returns a handle on the shared peer registry.
    pub fn registry(&self) -> PeerRegistry {
        self.registry.clone()
    }

    /// Returns the token that stops the crawler when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Runs the crawler until its cancellation token is cancelled or an actor fails.
    pub async fn start(self) -> Result<(), CrawlerError> {
        let Self { config, keypair, registry, ip_locator, peer_store, cancellation } = self;

        let peer_store = peer_store
            .unwrap_or_else(|| Arc::new(CsvPeerStore::new(config.export.path.clone())));
        let mut builder = HostBuilder::new()
            .with_ip(config.ip.clone())
            .with_port(config.port)
            .with_keypair(keypair)
            .with_user_agent(config.user_agent.clone())
            .with_network(config.network)
            .with_fork_digest(config.fork_digest)
            .with_peer_store(peer_store)
            .with_cancellation(cancellation.clone());
        if let Some(ip_locator) = ip_locator {
            builder = builder.with_ip_locator(ip_locator);
        }
        let host = builder.build()?;

        info!(
            target: "service",
            peer_id = %host.peer_id(),
            addr = %host.full_multiaddr(),
            network = %host.network(),
            fork_digest = %host.fork_digest(),
            "Starting crawler"
        );

        let connection_events = host.connection_events();
        let identification_events = host.identification_events();
        let ip_locator = host.ip_locator();
        let peer_store = host.peer_store();
        let handle = host.start();

        let workers = config.aggregator_workers.max(1);
        let connection_aggregators: Vec<_> = (0..workers)
            .map(|_| {
                (
                    ConnectionAggregator::new(registry.clone()),
                    AggregatorContext {
                        events: connection_events.clone(),
                        cancellation: cancellation.clone(),
                    },
                )
            })
            .collect();
        let identification_aggregators: Vec<_> = (0..workers)
            .map(|_| {
                (
                    IdentificationAggregator::new(registry.clone(), Arc::clone(&ip_locator)),
                    AggregatorContext {
                        events: identification_events.clone(),
                        cancellation: cancellation.clone(),
                    },
                )
            })
            .collect();
        let exporter = ExporterActor::new(registry, peer_store, config.export.interval());

        // Dial while the actors run. Dial results fill the host queues.
        let actors = async {
            spawn_and_wait!(
                cancellation,
                actors = [
                    connection_aggregators,
                    identification_aggregators,
                    Some((exporter, ExporterContext { cancellation: cancellation.clone() })),
                ]
            )
        };
        let (failures, ()) = tokio::join!(actors, dial_bootnodes(&handle, &config.bootnodes));

        handle.shutdown().await;
        info!(target: "service", "Crawler stopped");

        if failures.is_empty() { Ok(()) } else { Err(CrawlerError::Actors(failures)) }
    }
}

/// Asks the host to dial every valid bootnode multiaddr.
async fn dial_bootnodes(handle: &HostHandle, bootnodes: &[String]) {
    for bootnode in bootnodes {
        let addr = match bootnode.parse::<Multiaddr>() {
            Ok(addr) => addr,
            Err(err) => {
                warn!(target: "service", %bootnode, %err, "Skipping invalid bootnode");
                continue;
            }
        };
        if handle.dial(addr).await.is_err() {
            warn!(target: "service", "Host stopped before all bootnodes were dialed");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethcrawl_p2p::NOTIFICATION_QUEUE_SIZE;
    use libp2p::PeerId;
    use std::time::Duration;

    fn config(port: u16) -> CrawlerConfig {
        CrawlerConfig { ip: "127.0.0.1".to_string(), port, ..Default::default() }
    }

    #[test]
    fn test_crawler_accessors() {
        let crawler = Crawler::new(config(19431), Keypair::generate_secp256k1());
        assert_eq!(crawler.config().port, 19431);
        assert!(crawler.registry().is_empty());
        assert!(!crawler.cancellation_token().is_cancelled());
    }

    #[tokio::test]
    async fn test_start_invalid_ip() {
        let crawler = Crawler::new(
            CrawlerConfig { ip: "invalid".to_string(), ..config(19432) },
            Keypair::generate_secp256k1(),
        );
        assert!(matches!(crawler.start().await, Err(CrawlerError::Host(_))));
    }

    #[tokio::test]
    async fn test_start_stops_on_cancellation() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(19433);
        config.export.path = dir.path().join("peers.csv");
        config.bootnodes = vec!["not-a-multiaddr".to_string()];

        let crawler = Crawler::new(config, Keypair::generate_secp256k1());
        let cancellation = crawler.cancellation_token();
        let task = tokio::spawn(crawler.start());

        tokio::time::sleep(Duration::from_millis(200)).await;
        cancellation.cancel();

        let result = tokio::time::timeout(Duration::from_secs(10), task).await.unwrap().unwrap();
        assert!(result.is_ok());
        // The exporter writes a final snapshot on shutdown.
        assert!(dir.path().join("peers.csv").exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_large_bootnode_list_does_not_stall_aggregators() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(19434);
        config.export.path = dir.path().join("peers.csv");
        // Each unreachable bootnode yields one failed connection attempt, far
        // more than the dial channel and the queue can buffer together.
        let count = 1024 + 2 * NOTIFICATION_QUEUE_SIZE;
        config.bootnodes =
            (0..count).map(|_| format!("/ip4/127.0.0.1/tcp/1/p2p/{}", PeerId::random())).collect();

        let crawler = Crawler::new(config, Keypair::generate_secp256k1());
        let registry = crawler.registry();
        let cancellation = crawler.cancellation_token();
        let task = tokio::spawn(crawler.start());

        tokio::time::timeout(Duration::from_secs(30), async {
            while registry.len() < count {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        })
        .await
        .unwrap();
        let attempted = registry.snapshot().iter().filter(|peer| peer.attempted()).count();
        assert_eq!(attempted, count);

        cancellation.cancel();
        let result = tokio::time::timeout(Duration::from_secs(10), task).await.unwrap().unwrap();
        assert!(result.is_ok());
    }
}
