//! # ethcrawl-peers
//!
//! Per-peer crawl state for the ethcrawl consensus-layer crawler.
//!
//! ## Overview
//!
//! Every remote peer the crawler observes is tracked as a [`Peer`]. The host
//! produces connection, identification and message events; the aggregator
//! resolves the addressed peer in a [`PeerRegistry`] and applies the event
//! through the peer's `record_*` mutators. Peers are periodically exported
//! through a [`PeerStore`] as fixed-column CSV lines, see [`Peer::to_csv_line`].
//!
//! ## Key Components
//!
//! - [`Peer`]: identity, connection state, connection history and five
//!   per-topic [`MessageMetrics`] counters.
//! - [`ErrorKind`]: the closed set of connection failure categories raw
//!   transport errors are normalized into.
//! - [`GossipTopic`]: the tracked beacon chain gossip topics.
//! - [`ClientInfo`]: client name, version and OS parsed from a user agent.
//! - [`PeerRegistry`]: the shared, per-peer locked map of tracked peers.
//! - [`IpLocator`] / [`PeerStore`]: geolocation and storage collaborators.
//!
//! ## Usage Example
//!
//! ```rust
//! use ethcrawl_peers::{Direction, PeerRegistry};
//!
//! let registry = PeerRegistry::new();
//! registry.with_peer("16Uiu2HAm...", |peer| {
//!     peer.record_connection_attempt(true, "");
//!     peer.record_connection(Direction::Outbound, chrono::Utc::now());
//!     peer.count_message("beacon_block").unwrap();
//! });
//!
//! let peer = registry.get("16Uiu2HAm...").unwrap();
//! assert_eq!(peer.all_messages_count(), 1);
//! ```

#![doc(issue_tracker_base_url = "https://github.com/ethcrawl/ethcrawl/issues/")]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[macro_use]
extern crate tracing;

mod errors;
pub use errors::{LocatorError, StoreError, UnknownTopicError};

mod message;
pub use message::MessageMetrics;

mod topic;
pub use topic::GossipTopic;

mod normalize;
pub use normalize::ErrorKind;

mod client;
pub use client::{ClientInfo, UNKNOWN_CLIENT};

mod peer;
pub use peer::{Direction, PEER_CSV_HEADER, Peer};

mod registry;
pub use registry::PeerRegistry;

mod traits;
pub use traits::{IpLocator, Location, NoopLocator, NoopPeerStore, PeerStore};
