//! A builder for the [`HostManager`].

use crate::{Behaviour, ForkDigest, HostBuilderError, HostManager, NetworkKind, default_config};
use ethcrawl_peers::{GossipTopic, IpLocator, NoopLocator, NoopPeerStore, PeerStore};
use libp2p::{
    Multiaddr, SwarmBuilder, multiaddr::Protocol, noise::Config as NoiseConfig,
    tcp::Config as TcpConfig, yamux::Config as YamuxConfig,
};
use libp2p_identity::Keypair;
use std::{sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;

/// The default idle connection timeout.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Returns the default user agent, `ethcrawl/<version>`.
pub fn default_user_agent() -> String {
    format!("ethcrawl/{}", env!("CARGO_PKG_VERSION"))
}

/// A builder for the [`HostManager`].
#[derive(Debug, Default)]
pub struct HostBuilder {
    /// The textual IPv4 address to listen on.
    ip: Option<String>,
    /// The TCP port to listen on.
    port: Option<u16>,
    /// The [`Keypair`] of the host.
    keypair: Option<Keypair>,
    /// The user agent announced over identify.
    user_agent: Option<String>,
    /// The network being crawled.
    network: Option<NetworkKind>,
    /// The fork digest scoping the gossip topics.
    fork_digest: Option<ForkDigest>,
    /// Geolocation collaborator.
    ip_locator: Option<Arc<dyn IpLocator>>,
    /// Storage collaborator.
    peer_store: Option<Arc<dyn PeerStore>>,
    /// The idle connection timeout.
    idle_timeout: Option<Duration>,
    /// The cancellation scope of the host.
    cancellation: Option<CancellationToken>,
}

impl HostBuilder {
    /// Creates a new [`HostBuilder`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the IPv4 address to listen on.
    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    /// Sets the TCP port to listen on.
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the [`Keypair`] for the host.
    pub fn with_keypair(mut self, keypair: Keypair) -> Self {
        self.keypair = Some(keypair);
        self
    }

    /// Sets the user agent. Defaults to [`default_user_agent`].
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Sets the network being crawled. Defaults to [`NetworkKind::Mainnet`].
    pub const fn with_network(mut self, network: NetworkKind) -> Self {
        self.network = Some(network);
        self
    }

    /// Sets the fork digest of the gossip topics. Defaults to [`ForkDigest::MAINNET_DENEB`].
    pub const fn with_fork_digest(mut self, fork_digest: ForkDigest) -> Self {
        self.fork_digest = Some(fork_digest);
        self
    }

    /// Sets the geolocation collaborator. Defaults to [`NoopLocator`].
    pub fn with_ip_locator(mut self, ip_locator: Arc<dyn IpLocator>) -> Self {
        self.ip_locator = Some(ip_locator);
        self
    }

    /// Sets the storage collaborator. Defaults to [`NoopPeerStore`].
    pub fn with_peer_store(mut self, peer_store: Arc<dyn PeerStore>) -> Self {
        self.peer_store = Some(peer_store);
        self
    }

    /// Sets the swarm's idle connection timeout.
    pub const fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    /// Binds the host to the given cancellation scope.
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = Some(cancellation);
        self
    }

    /// Builds the [`HostManager`].
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> Result<HostManager, HostBuilderError> {
        let ip = self.ip.ok_or(HostBuilderError::MissingIp)?;
        let port = self.port.ok_or(HostBuilderError::MissingPort)?;
        let keypair = self.keypair.ok_or(HostBuilderError::MissingKeypair)?;
        let user_agent = self.user_agent.unwrap_or_else(default_user_agent);
        let network = self.network.unwrap_or_default();
        let fork_digest = self.fork_digest.unwrap_or_default();
        let timeout = self.idle_timeout.unwrap_or(DEFAULT_IDLE_TIMEOUT);

        let addr = format!("/ip4/{ip}/tcp/{port}");
        let multiaddr: Multiaddr =
            addr.parse().map_err(|_| HostBuilderError::InvalidMultiaddr { addr: addr.clone() })?;
        debug!(target: "p2p::host", %multiaddr, "Setting multiaddress");

        // Construct the behaviour, subscribed to every tracked topic.
        let digest = fork_digest.to_string();
        let topics: Vec<String> =
            GossipTopic::ALL.iter().map(|topic| topic.full_topic(&digest)).collect();
        let behaviour = Behaviour::new(keypair.public(), &user_agent, default_config(), &topics)?;

        // Build the swarm.
        let swarm = SwarmBuilder::with_existing_identity(keypair)
            .with_tokio()
            .with_tcp(TcpConfig::default(), |i: &Keypair| NoiseConfig::new(i), YamuxConfig::default)
            .map_err(|_| HostBuilderError::TcpError)?
            .with_behaviour(|_| behaviour)
            .map_err(|_| HostBuilderError::WithBehaviourError)?
            .with_swarm_config(|c| c.with_idle_connection_timeout(timeout))
            .build();

        let peer_id = *swarm.local_peer_id();
        let full_multiaddr = multiaddr.clone().with(Protocol::P2p(peer_id));
        debug!(target: "p2p::host", %full_multiaddr, "Full multiaddress");

        Ok(HostManager::new(
            swarm,
            network,
            fork_digest,
            user_agent,
            multiaddr,
            full_multiaddr,
            self.ip_locator.unwrap_or_else(|| Arc::new(NoopLocator)),
            self.peer_store.unwrap_or_else(|| Arc::new(NoopPeerStore)),
            self.cancellation.unwrap_or_default(),
        ))
    }
}
