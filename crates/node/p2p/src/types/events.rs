//! Domain events produced by the host.
//!
//! Events are plain values. Once sent into a notification queue they belong to
//! whichever side currently holds them.

use chrono::{DateTime, Utc};
use ethcrawl_peers::Direction;
use libp2p::{Multiaddr, PeerId, gossipsub::MessageId};
use std::{net::IpAddr, time::Duration};

/// A first connection to a peer was established.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEvent {
    /// The remote peer.
    pub peer_id: PeerId,
    /// Which side opened the connection.
    pub direction: Direction,
    /// The remote address of the connection.
    pub remote_addr: Multiaddr,
    /// When the connection was established.
    pub timestamp: DateTime<Utc>,
}

/// The last connection to a peer was closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisconnectionEvent {
    /// The remote peer.
    pub peer_id: PeerId,
    /// When the connection was closed.
    pub timestamp: DateTime<Utc>,
}

/// The outcome of an outbound dial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionAttemptEvent {
    /// The dialed peer.
    pub peer_id: PeerId,
    /// Whether the dial produced a connection.
    pub succeeded: bool,
    /// The raw dial error, empty on success.
    pub error: String,
    /// When the dial resolved.
    pub timestamp: DateTime<Utc>,
}

/// A gossip message was received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    /// The peer that forwarded the message.
    pub peer_id: PeerId,
    /// The full gossip topic string.
    pub topic: String,
    /// The gossipsub message id.
    pub message_id: MessageId,
    /// When the message was received.
    pub timestamp: DateTime<Utc>,
}

/// An event sent through the connection queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// See [`ConnectionEvent`].
    Connection(ConnectionEvent),
    /// See [`DisconnectionEvent`].
    Disconnection(DisconnectionEvent),
    /// See [`ConnectionAttemptEvent`].
    ConnectionAttempt(ConnectionAttemptEvent),
    /// See [`MessageEvent`].
    Message(MessageEvent),
}

impl TraceEvent {
    /// Returns the peer the event is about.
    pub const fn peer_id(&self) -> &PeerId {
        match self {
            Self::Connection(e) => &e.peer_id,
            Self::Disconnection(e) => &e.peer_id,
            Self::ConnectionAttempt(e) => &e.peer_id,
            Self::Message(e) => &e.peer_id,
        }
    }

    /// Returns when the event happened.
    pub const fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Connection(e) => e.timestamp,
            Self::Disconnection(e) => e.timestamp,
            Self::ConnectionAttempt(e) => e.timestamp,
            Self::Message(e) => e.timestamp,
        }
    }

    /// Returns a short name of the event kind, used as a metric label.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Connection(_) => "connection",
            Self::Disconnection(_) => "disconnection",
            Self::ConnectionAttempt(_) => "connection_attempt",
            Self::Message(_) => "message",
        }
    }
}

/// Identity details a peer reported over identify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identification {
    /// The reported agent version.
    pub user_agent: String,
    /// The reported protocol version.
    pub protocol_version: String,
    /// The hex encoded public key.
    pub pubkey: String,
    /// The reported listen addresses.
    pub listen_addrs: Vec<Multiaddr>,
    /// The supported protocols.
    pub protocols: Vec<String>,
    /// The remote IP the peer is connected from.
    pub ip: Option<IpAddr>,
    /// Time from connection establishment until identify completed.
    pub latency: Duration,
}

/// An identify exchange with a peer completed or failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentificationEvent {
    /// The remote peer.
    pub peer_id: PeerId,
    /// When the exchange resolved.
    pub timestamp: DateTime<Utc>,
    /// The reported identity, or the raw identify error.
    pub result: Result<Identification, String>,
}

impl IdentificationEvent {
    /// Returns whether the exchange succeeded.
    pub const fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}
