//! Contains the [`HostManager`].

use crate::{
    Behaviour, ConnectionAttemptEvent, ConnectionEvent, DisconnectionEvent, Event, ForkDigest,
    HostHandle, Identification, IdentificationEvent, MessageEvent, NetworkKind,
    NotificationQueue, TraceEvent, multiaddr_ip, multiaddr_peer_id,
};
use async_channel::Receiver;
use chrono::Utc;
use derive_more::Debug;
use ethcrawl_peers::{Direction, IpLocator, PeerStore};
use futures::StreamExt;
use libp2p::{Multiaddr, PeerId, Swarm, gossipsub, identify, swarm::SwarmEvent};
use libp2p_identity::PublicKey;
use std::{collections::HashMap, net::IpAddr, sync::Arc, time::Instant};
use tokio_util::sync::CancellationToken;

/// The capacity of the dial request channel of a started host.
const DIAL_REQUEST_BUFFER: usize = 1024;

/// Book-keeping for a peer with at least one open connection.
#[derive(Debug, Clone, Copy)]
struct ConnectedPeer {
    /// When the first connection was established.
    since: Instant,
    /// The remote IP of the first connection.
    ip: Option<IpAddr>,
}

/// The crawler's libp2p host.
///
/// Owns the swarm and translates every connection, identify and gossip
/// notification into a domain event on one of two bounded queues:
/// connection events ([`TraceEvent`]) and identification events
/// ([`IdentificationEvent`]). Consumers read them through
/// [`HostManager::connection_events`] and
/// [`HostManager::identification_events`].
#[derive(Debug)]
pub struct HostManager {
    /// The libp2p swarm.
    #[debug(skip)]
    swarm: Swarm<Behaviour>,
    /// The network being crawled.
    network: NetworkKind,
    /// The fork digest of the subscribed topics.
    fork_digest: ForkDigest,
    /// The announced user agent.
    user_agent: String,
    /// The host's peer id.
    peer_id: PeerId,
    /// The listen address, `/ip4/<ip>/tcp/<port>`.
    multiaddr: Multiaddr,
    /// The listen address followed by `/p2p/<peer id>`.
    full_multiaddr: Multiaddr,
    /// Geolocation collaborator.
    ip_locator: Arc<dyn IpLocator>,
    /// Storage collaborator.
    peer_store: Arc<dyn PeerStore>,
    /// Connection, disconnection, dial and message events.
    connection_events: NotificationQueue<TraceEvent>,
    /// Identify results.
    identification_events: NotificationQueue<IdentificationEvent>,
    /// Peers with at least one open connection.
    connected: HashMap<PeerId, ConnectedPeer>,
    /// The cancellation scope of the host.
    cancellation: CancellationToken,
}

impl HostManager {
    /// Creates a new [`HostManager`]. Use [`crate::HostBuilder`] to construct one.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        swarm: Swarm<Behaviour>,
        network: NetworkKind,
        fork_digest: ForkDigest,
        user_agent: String,
        multiaddr: Multiaddr,
        full_multiaddr: Multiaddr,
        ip_locator: Arc<dyn IpLocator>,
        peer_store: Arc<dyn PeerStore>,
        cancellation: CancellationToken,
    ) -> Self {
        let peer_id = *swarm.local_peer_id();
        Self {
            swarm,
            network,
            fork_digest,
            user_agent,
            peer_id,
            multiaddr,
            full_multiaddr,
            ip_locator,
            peer_store,
            connection_events: NotificationQueue::new(),
            identification_events: NotificationQueue::new(),
            connected: HashMap::new(),
            cancellation,
        }
    }

    /// Returns the host's peer id.
    pub const fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    /// Returns the listen address.
    pub const fn multiaddr(&self) -> &Multiaddr {
        &self.multiaddr
    }

    /// Returns the listen address including the `/p2p/` component.
    pub const fn full_multiaddr(&self) -> &Multiaddr {
        &self.full_multiaddr
    }

    /// Returns the network being crawled.
    pub const fn network(&self) -> NetworkKind {
        self.network
    }

    /// Returns the fork digest of the subscribed topics.
    pub const fn fork_digest(&self) -> ForkDigest {
        self.fork_digest
    }

    /// Returns the announced user agent.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Returns the geolocation collaborator.
    pub fn ip_locator(&self) -> Arc<dyn IpLocator> {
        Arc::clone(&self.ip_locator)
    }

    /// Returns the storage collaborator.
    pub fn peer_store(&self) -> Arc<dyn PeerStore> {
        Arc::clone(&self.peer_store)
    }

    /// Returns the cancellation scope of the host.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Returns the number of peers with an open connection.
    pub fn connected_peers(&self) -> usize {
        self.swarm.connected_peers().count()
    }

    /// Returns a read handle to the connection event queue.
    pub fn connection_events(&self) -> Receiver<TraceEvent> {
        self.connection_events.receiver()
    }

    /// Returns a read handle to the identification event queue.
    pub fn identification_events(&self) -> Receiver<IdentificationEvent> {
        self.identification_events.receiver()
    }

    /// Enqueues a connection event, waiting while the queue is full.
    ///
    /// The returned future does not borrow the host. The event is dropped if
    /// the host is cancelled while waiting.
    pub fn record_connection_event(
        &self,
        event: TraceEvent,
    ) -> impl Future<Output = ()> + Send + use<> {
        let queue = self.connection_events.clone();
        let cancellation = self.cancellation.clone();
        async move {
            let kind = event.kind();
            inc!(NOTIFICATIONS, "type" => kind);
            let sent = tokio::select! {
                sent = queue.send(event) => sent,
                _ = cancellation.cancelled() => false,
            };
            if sent {
                inc!(QUEUE_SENDS, "queue" => "connection");
            } else {
                debug!(target: "p2p::host", kind, "Dropping connection event, host is shutting down");
            }
        }
    }

    /// Enqueues an identification event, waiting while the queue is full.
    ///
    /// The returned future does not borrow the host. The event is dropped if
    /// the host is cancelled while waiting.
    pub fn record_identification_event(
        &self,
        event: IdentificationEvent,
    ) -> impl Future<Output = ()> + Send + use<> {
        let queue = self.identification_events.clone();
        let cancellation = self.cancellation.clone();
        async move {
            inc!(NOTIFICATIONS, "type" => "identify");
            let sent = tokio::select! {
                sent = queue.send(event) => sent,
                _ = cancellation.cancelled() => false,
            };
            if sent {
                inc!(QUEUE_SENDS, "queue" => "identification");
            } else {
                debug!(target: "p2p::host", "Dropping identification event, host is shutting down");
            }
        }
    }

    /// Starts listening and spawns the host task.
    ///
    /// A listen failure is logged and the host keeps running without inbound
    /// connections. The task runs until the cancellation scope is cancelled,
    /// after which both queues are closed.
    pub fn start(mut self) -> HostHandle {
        match self.swarm.listen_on(self.multiaddr.clone()) {
            Ok(_) => info!(target: "p2p::host", addr = %self.full_multiaddr, "libp2p host started"),
            Err(e) => error!(
                target: "p2p::host",
                ?e,
                "Failed to listen on {}, running without inbound connections",
                self.multiaddr
            ),
        }

        let (dial_sender, mut dial_receiver) = tokio::sync::mpsc::channel(DIAL_REQUEST_BUFFER);
        let connection_events = self.connection_events.receiver();
        let identification_events = self.identification_events.receiver();
        let cancellation = self.cancellation.clone();
        let peer_id = self.peer_id;
        let full_multiaddr = self.full_multiaddr.clone();

        let task = tokio::spawn(async move {
            let cancellation = self.cancellation.clone();
            loop {
                tokio::select! {
                    _ = cancellation.cancelled() => {
                        info!(target: "p2p::host", "Received shutdown signal. Exiting host task.");
                        break;
                    }
                    Some(addr) = dial_receiver.recv() => {
                        self.dial(addr).await;
                    }
                    event = self.swarm.select_next_some() => {
                        self.handle_event(event).await;
                    }
                }
            }
            self.connection_events.close();
            self.identification_events.close();
        });

        HostHandle::new(
            peer_id,
            full_multiaddr,
            dial_sender,
            connection_events,
            identification_events,
            cancellation,
            task,
        )
    }

    /// Dials the given address.
    ///
    /// Dials that fail before a connection attempt is made are reported
    /// immediately when the address names the peer.
    pub async fn dial(&mut self, addr: Multiaddr) {
        inc!(DIAL_PEER, "type" => "requested");
        let Err(e) = self.swarm.dial(addr.clone()) else {
            debug!(target: "p2p::host", %addr, "Dialing peer");
            return;
        };

        inc!(DIAL_PEER, "type" => "failed");
        warn!(target: "p2p::host", %addr, ?e, "Failed to dial peer");
        if let Some(peer_id) = multiaddr_peer_id(&addr) {
            let event = ConnectionAttemptEvent {
                peer_id,
                succeeded: false,
                error: e.to_string(),
                timestamp: Utc::now(),
            };
            self.record_connection_event(TraceEvent::ConnectionAttempt(event)).await;
        }
    }

    /// Translates a [`SwarmEvent`] into domain events.
    async fn handle_event(&mut self, event: SwarmEvent<Event>) {
        match event {
            SwarmEvent::ConnectionEstablished { peer_id, endpoint, num_established, .. } => {
                let timestamp = Utc::now();
                set!(PEER_COUNT; self.swarm.connected_peers().count() as f64);

                if endpoint.is_dialer() {
                    let event = ConnectionAttemptEvent {
                        peer_id,
                        succeeded: true,
                        error: String::new(),
                        timestamp,
                    };
                    self.record_connection_event(TraceEvent::ConnectionAttempt(event)).await;
                }

                if num_established.get() == 1 {
                    let remote_addr = endpoint.get_remote_address().clone();
                    let direction =
                        if endpoint.is_dialer() { Direction::Outbound } else { Direction::Inbound };
                    debug!(target: "p2p::host", %peer_id, %direction, %remote_addr, "Connection established");
                    self.connected.insert(
                        peer_id,
                        ConnectedPeer { since: Instant::now(), ip: multiaddr_ip(&remote_addr) },
                    );
                    let event = ConnectionEvent { peer_id, direction, remote_addr, timestamp };
                    self.record_connection_event(TraceEvent::Connection(event)).await;
                }
            }
            SwarmEvent::ConnectionClosed { peer_id, num_established, cause, .. } => {
                set!(PEER_COUNT; self.swarm.connected_peers().count() as f64);
                if num_established == 0 {
                    debug!(target: "p2p::host", %peer_id, ?cause, "Peer disconnected");
                    self.connected.remove(&peer_id);
                    let event = DisconnectionEvent { peer_id, timestamp: Utc::now() };
                    self.record_connection_event(TraceEvent::Disconnection(event)).await;
                }
            }
            SwarmEvent::OutgoingConnectionError { peer_id, error, .. } => {
                let Some(peer_id) = peer_id else {
                    debug!(target: "p2p::host", ?error, "Outgoing connection error to unknown peer");
                    return;
                };
                debug!(target: "p2p::host", %peer_id, ?error, "Outgoing connection error");
                let event = ConnectionAttemptEvent {
                    peer_id,
                    succeeded: false,
                    error: error.to_string(),
                    timestamp: Utc::now(),
                };
                self.record_connection_event(TraceEvent::ConnectionAttempt(event)).await;
            }
            SwarmEvent::IncomingConnectionError { error, connection_id, .. } => {
                trace!(target: "p2p::host", ?error, ?connection_id, "Incoming connection error");
            }
            SwarmEvent::NewListenAddr { address, .. } => {
                info!(target: "p2p::host", %address, "New listen address");
            }
            SwarmEvent::ListenerError { error, .. } => {
                error!(target: "p2p::host", ?error, "Listener error");
            }
            SwarmEvent::Behaviour(Event::Identify(event)) => self.handle_identify(*event).await,
            SwarmEvent::Behaviour(Event::Gossipsub(event)) => self.handle_gossipsub(*event).await,
            SwarmEvent::Behaviour(Event::Ping(event)) => {
                trace!(target: "p2p::host", peer = %event.peer, result = ?event.result, "Ping");
            }
            event => {
                trace!(target: "p2p::host", ?event, "Ignoring swarm event");
            }
        }
    }

    async fn handle_identify(&mut self, event: identify::Event) {
        match event {
            identify::Event::Received { peer_id, info, .. } => {
                let connected = self.connected.get(&peer_id).copied();
                let latency = connected.map(|c| c.since.elapsed()).unwrap_or_default();
                let ip = connected
                    .and_then(|c| c.ip)
                    .or_else(|| info.listen_addrs.iter().find_map(multiaddr_ip));
                record!(IDENTIFY_LATENCY; latency.as_secs_f64());
                debug!(target: "p2p::host", %peer_id, agent = %info.agent_version, "Identified peer");

                let identification = Identification {
                    user_agent: info.agent_version,
                    protocol_version: info.protocol_version,
                    pubkey: encode_public_key(info.public_key),
                    listen_addrs: info.listen_addrs,
                    protocols: info.protocols.iter().map(ToString::to_string).collect(),
                    ip,
                    latency,
                };
                let event =
                    IdentificationEvent { peer_id, timestamp: Utc::now(), result: Ok(identification) };
                self.record_identification_event(event).await;
            }
            identify::Event::Error { peer_id, error, .. } => {
                debug!(target: "p2p::host", %peer_id, ?error, "Identify failed");
                let event = IdentificationEvent {
                    peer_id,
                    timestamp: Utc::now(),
                    result: Err(error.to_string()),
                };
                self.record_identification_event(event).await;
            }
            event => {
                trace!(target: "p2p::host", ?event, "Ignoring identify event");
            }
        }
    }

    async fn handle_gossipsub(&mut self, event: gossipsub::Event) {
        match event {
            gossipsub::Event::Message { propagation_source, message_id, message } => {
                let event = MessageEvent {
                    peer_id: propagation_source,
                    topic: message.topic.into_string(),
                    message_id,
                    timestamp: Utc::now(),
                };
                self.record_connection_event(TraceEvent::Message(event)).await;
            }
            event => {
                trace!(target: "p2p::gossip", ?event, "Ignoring gossipsub event");
            }
        }
    }
}

/// Hex encodes a public key, compressed for secp256k1 keys and protobuf encoded otherwise.
fn encode_public_key(public_key: PublicKey) -> String {
    match public_key.clone().try_into_secp256k1() {
        Ok(key) => hex::encode(key.to_bytes()),
        Err(_) => hex::encode(public_key.encode_protobuf()),
    }
}
