//! # ethcrawl-p2p
//!
//! The libp2p host of the ethcrawl consensus-layer crawler.
//!
//! ## Overview
//!
//! The [`HostManager`] owns exactly one libp2p swarm per crawler process. It
//! listens on `/ip4/<ip>/tcp/<port>`, speaks identify, ping and eth2 gossipsub,
//! and translates every low-level notification into a typed domain event:
//!
//! - connections, disconnections, dial outcomes and gossip messages become
//!   [`TraceEvent`]s on the connection queue,
//! - identify results become [`IdentificationEvent`]s on the identification queue.
//!
//! Both queues are bounded FIFO [`NotificationQueue`]s holding
//! [`NOTIFICATION_QUEUE_SIZE`] events. A full queue stalls the host task until
//! a consumer catches up.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use ethcrawl_p2p::HostBuilder;
//! use libp2p::identity::Keypair;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let host = HostBuilder::new()
//!     .with_ip("0.0.0.0")
//!     .with_port(9020)
//!     .with_keypair(Keypair::generate_secp256k1())
//!     .build()?;
//!
//! let events = host.connection_events();
//! let handle = host.start();
//! while let Ok(event) = events.recv().await {
//!     println!("{:?} {}", event.peer_id(), event.kind());
//! }
//! handle.shutdown().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `metrics`: Enable Prometheus metrics collection (optional)

#![doc(issue_tracker_base_url = "https://github.com/ethcrawl/ethcrawl/issues/")]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[macro_use]
extern crate tracing;

#[macro_use]
mod macros;

/// Metrics collection for the host.
mod metrics;
pub use metrics::Metrics;

mod types;
pub use types::{
    ConnectionAttemptEvent, ConnectionEvent, DisconnectionEvent, ForkDigest, ForkDigestError,
    Identification, IdentificationEvent, MessageEvent, NetworkKind, TraceEvent,
    UnknownNetworkError,
};

/// Identify, ping and eth2 gossipsub behaviour.
mod gossip;
pub use gossip::{
    Behaviour, BehaviourError, DEFAULT_MESH_D, DEFAULT_MESH_DHI, DEFAULT_MESH_DLAZY,
    DEFAULT_MESH_DLO, Event, GOSSIP_HEARTBEAT, IDENTIFY_PROTOCOL_VERSION, MAX_GOSSIP_SIZE,
    MESSAGE_DOMAIN_INVALID_SNAPPY, MESSAGE_DOMAIN_VALID_SNAPPY, MESSAGE_ID_LEN, SEEN_MESSAGES_TTL,
    compute_message_id, default_config, default_config_builder,
};

/// The host manager and its event queues.
mod host;
pub use host::{
    DEFAULT_IDLE_TIMEOUT, HostBuilder, HostBuilderError, HostHandle, HostManager,
    HostStoppedError, NOTIFICATION_QUEUE_SIZE, NotificationQueue, default_user_agent,
    multiaddr_ip, multiaddr_peer_id,
};
