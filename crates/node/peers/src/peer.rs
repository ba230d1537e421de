//! Contains the [`Peer`] metrics entity.

use crate::{ClientInfo, ErrorKind, GossipTopic, MessageMetrics, UnknownTopicError};
use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// The column names of [`Peer::to_csv_line`], in order.
pub const PEER_CSV_HEADER: [&str; 27] = [
    "peer_id",
    "node_id",
    "user_agent",
    "client_name",
    "client_version",
    "pubkey",
    "addrs",
    "ip",
    "country",
    "city",
    "metadata_requested",
    "metadata_succeeded",
    "attempted",
    "succeeded",
    "connected",
    "attempts",
    "error",
    "latency",
    "connections",
    "disconnections",
    "connected_time",
    "beacon_block",
    "beacon_aggregate_and_proof",
    "voluntary_exit",
    "proposer_slashing",
    "attester_slashing",
    "total_messages",
];

/// The direction of a connection relative to the local host.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// The remote peer dialed the local host.
    #[display("inbound")]
    Inbound,
    /// The local host dialed the remote peer.
    #[display("outbound")]
    Outbound,
}

/// Aggregated crawl state for a single remote peer.
///
/// A [`Peer`] is exclusively owned by whoever holds its registry lock. All
/// mutation happens through the `record_*` methods, which keep the
/// following invariants:
///
/// - the peer id never changes after construction,
/// - `attempts` only grows within a metrics window and `attempted` never reverts,
/// - connection and disconnection instants are append-only and kept in arrival order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Peer {
    peer_id: String,
    /// The discovery node id, if known.
    pub node_id: String,
    /// The raw libp2p user agent.
    pub user_agent: String,
    /// Client details parsed from [`Peer::user_agent`].
    pub client: ClientInfo,
    /// The hex encoded public key.
    pub pubkey: String,
    /// The peer's listen addresses, space separated.
    pub addrs: String,
    /// The remote IP the peer was seen on.
    pub ip: String,
    /// The country the IP is located in.
    pub country: String,
    /// The city the IP is located in.
    pub city: String,
    /// Identification round trip, in seconds.
    pub latency: f64,

    /// Whether the peer currently holds at least one connection.
    pub is_connected: bool,
    /// The direction of the current connection, `None` while disconnected.
    pub connected_direction: Option<Direction>,
    attempted: bool,
    /// Whether any connection attempt to the peer succeeded.
    pub succeeded: bool,
    attempts: u64,
    /// The category of the last failed attempt, `None` after a success.
    pub error: Option<ErrorKind>,
    connection_times: Vec<DateTime<Utc>>,
    disconnection_times: Vec<DateTime<Utc>>,

    /// Whether the peer's metadata was requested.
    pub metadata_requested: bool,
    /// Whether a metadata request succeeded.
    pub metadata_succeeded: bool,
    /// When the peer was last handed to a peer store.
    pub last_export: Option<DateTime<Utc>>,

    beacon_block: MessageMetrics,
    beacon_aggregate_proof: MessageMetrics,
    voluntary_exit: MessageMetrics,
    proposer_slashing: MessageMetrics,
    attester_slashing: MessageMetrics,
}

impl Peer {
    /// Creates a zero-valued [`Peer`] for the given peer id.
    pub fn new(peer_id: impl Into<String>) -> Self {
        Self {
            peer_id: peer_id.into(),
            node_id: String::new(),
            user_agent: String::new(),
            client: ClientInfo::default(),
            pubkey: String::new(),
            addrs: String::new(),
            ip: String::new(),
            country: String::new(),
            city: String::new(),
            latency: 0.0,
            is_connected: false,
            connected_direction: None,
            attempted: false,
            succeeded: false,
            attempts: 0,
            error: None,
            connection_times: Vec::new(),
            disconnection_times: Vec::new(),
            metadata_requested: false,
            metadata_succeeded: false,
            last_export: None,
            beacon_block: MessageMetrics::new(),
            beacon_aggregate_proof: MessageMetrics::new(),
            voluntary_exit: MessageMetrics::new(),
            proposer_slashing: MessageMetrics::new(),
            attester_slashing: MessageMetrics::new(),
        }
    }

    /// Returns the peer id.
    pub fn peer_id(&self) -> &str {
        &self.peer_id
    }

    /// Returns whether a connection attempt was ever made.
    pub const fn attempted(&self) -> bool {
        self.attempted
    }

    /// Returns the number of connection attempts in the current window.
    pub const fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Returns the recorded connection instants, in arrival order.
    pub fn connection_times(&self) -> &[DateTime<Utc>] {
        &self.connection_times
    }

    /// Returns the recorded disconnection instants, in arrival order.
    pub fn disconnection_times(&self) -> &[DateTime<Utc>] {
        &self.disconnection_times
    }

    /// Returns the counter for the given topic.
    pub const fn message_metrics(&self, topic: GossipTopic) -> &MessageMetrics {
        match topic {
            GossipTopic::BeaconBlock => &self.beacon_block,
            GossipTopic::BeaconAggregateProof => &self.beacon_aggregate_proof,
            GossipTopic::VoluntaryExit => &self.voluntary_exit,
            GossipTopic::ProposerSlashing => &self.proposer_slashing,
            GossipTopic::AttesterSlashing => &self.attester_slashing,
        }
    }

    const fn message_metrics_mut(&mut self, topic: GossipTopic) -> &mut MessageMetrics {
        match topic {
            GossipTopic::BeaconBlock => &mut self.beacon_block,
            GossipTopic::BeaconAggregateProof => &mut self.beacon_aggregate_proof,
            GossipTopic::VoluntaryExit => &mut self.voluntary_exit,
            GossipTopic::ProposerSlashing => &mut self.proposer_slashing,
            GossipTopic::AttesterSlashing => &mut self.attester_slashing,
        }
    }

    /// Records a new connection to the peer.
    pub fn record_connection(&mut self, direction: Direction, time: DateTime<Utc>) {
        self.connection_times.push(time);
        self.is_connected = true;
        self.connected_direction = Some(direction);
    }

    /// Records that the peer disconnected.
    pub fn record_disconnection(&mut self, time: DateTime<Utc>) {
        self.disconnection_times.push(time);
        self.is_connected = false;
        self.connected_direction = None;
    }

    /// Records the outcome of a connection attempt.
    ///
    /// A failure stores the normalized `raw_error` but never clears an
    /// earlier success.
    pub fn record_connection_attempt(&mut self, succeeded: bool, raw_error: &str) {
        self.attempts += 1;
        self.attempted = true;
        if succeeded {
            self.succeeded = true;
            self.error = None;
        } else {
            self.error = Some(ErrorKind::classify(raw_error));
        }
    }

    /// Records a metadata (identification) request and whether it succeeded.
    ///
    /// Like [`Peer::succeeded`], a later failure does not clear an earlier success.
    pub const fn record_metadata_request(&mut self, succeeded: bool) {
        self.metadata_requested = true;
        self.metadata_succeeded |= succeeded;
    }

    /// Sets the user agent and the client details parsed from it.
    pub fn set_user_agent(&mut self, user_agent: impl Into<String>) {
        self.user_agent = user_agent.into();
        self.client = ClientInfo::from_user_agent(&self.user_agent);
    }

    /// Counts a message received on the named topic.
    ///
    /// Fails with [`UnknownTopicError`] for names outside [`GossipTopic::ALL`],
    /// in which case no counter changes.
    pub fn count_message(&mut self, topic: &str) -> Result<(), UnknownTopicError> {
        let topic = topic.parse::<GossipTopic>()?;
        self.message_metrics_mut(topic).increment();
        Ok(())
    }

    /// Returns the sum of all topic counters.
    pub fn all_messages_count(&self) -> u64 {
        GossipTopic::ALL.iter().map(|topic| self.message_metrics(*topic).count()).sum()
    }

    /// Returns the total connected time in minutes.
    ///
    /// Each connection instant, in recorded order, is paired with the first
    /// recorded disconnection instant that is not before it. Unpaired
    /// connections contribute nothing, and a disconnection may pair with
    /// several connections. Interleaved reconnects can therefore be
    /// mis-paired; exported history depends on this exact pairing.
    pub fn connected_duration(&self) -> f64 {
        let total_ms: i64 = self
            .connection_times
            .iter()
            .map(|connected| {
                self.disconnection_times
                    .iter()
                    .map(|disconnected| (*disconnected - *connected).num_milliseconds())
                    .find(|elapsed| *elapsed >= 0)
                    .unwrap_or(0)
            })
            .sum();
        total_ms as f64 / 60_000.0
    }

    /// Closes the current metrics window.
    ///
    /// Zeroes the attempt count and the topic counters. Identity and the
    /// connection history are untouched.
    pub fn reset_window(&mut self) {
        self.attempts = 0;
        for topic in GossipTopic::ALL {
            *self.message_metrics_mut(topic) = MessageMetrics::new();
        }
    }

    /// Folds a closed window back into the current one.
    ///
    /// Adds the attempts and topic counts of `closed` on top of whatever was
    /// recorded since that window was closed.
    pub fn restore_window(&mut self, closed: &Self) {
        self.attempts += closed.attempts;
        for topic in GossipTopic::ALL {
            self.message_metrics_mut(topic).count += closed.message_metrics(topic).count();
        }
    }

    /// Serializes the peer as a newline-terminated CSV row matching [`PEER_CSV_HEADER`].
    pub fn to_csv_line(&self) -> String {
        let error = self.error.as_ref().map_or("None", ErrorKind::label);
        let fields = [
            csv_field(&self.peer_id),
            csv_field(&self.node_id),
            csv_field(&self.user_agent),
            csv_field(self.client.name.as_deref().unwrap_or_default()),
            csv_field(self.client.version.as_deref().unwrap_or_default()),
            csv_field(&self.pubkey),
            csv_field(&self.addrs),
            csv_field(&self.ip),
            csv_field(&self.country),
            csv_field(&self.city),
            self.metadata_requested.to_string(),
            self.metadata_succeeded.to_string(),
            self.attempted.to_string(),
            self.succeeded.to_string(),
            self.is_connected.to_string(),
            self.attempts.to_string(),
            error.to_string(),
            self.latency.to_string(),
            self.connection_times.len().to_string(),
            self.disconnection_times.len().to_string(),
            format!("{:.3}", self.connected_duration()),
            self.beacon_block.count().to_string(),
            self.beacon_aggregate_proof.count().to_string(),
            self.voluntary_exit.count().to_string(),
            self.proposer_slashing.count().to_string(),
            self.attester_slashing.count().to_string(),
            self.all_messages_count().to_string(),
        ];
        let mut line = fields.join(",");
        line.push('\n');
        line
    }

    /// Emits the identity snapshot of the peer as a structured log event.
    pub fn log_peer(&self) {
        info!(
            target: "peers",
            peer_id = %self.peer_id,
            node_id = %self.node_id,
            user_agent = %self.user_agent,
            client_name = self.client.name.as_deref().unwrap_or_default(),
            client_os = self.client.os.as_deref().unwrap_or_default(),
            client_version = self.client.version.as_deref().unwrap_or_default(),
            pubkey = %self.pubkey,
            addrs = %self.addrs,
            ip = %self.ip,
            country = %self.country,
            city = %self.city,
            latency = self.latency,
            "Peer info"
        );
    }
}

/// Replaces the CSV separators in a peer-supplied value with spaces.
fn csv_field(value: &str) -> String {
    value.replace([',', '\n', '\r'], " ")
}
