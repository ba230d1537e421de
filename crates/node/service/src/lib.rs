//! # ethcrawl-service
//!
//! The crawler service: everything between the libp2p host and the exported
//! peer snapshots.
//!
//! ## Overview
//!
//! The [`Crawler`] builds an [`ethcrawl_p2p::HostManager`], starts it, dials
//! the configured bootnodes and runs a set of [`CrawlerActor`]s under a single
//! cancellation token:
//!
//! - [`ConnectionAggregator`]s drain the connection queue and apply
//!   connections, disconnections, dial outcomes and gossip messages to the
//!   shared [`ethcrawl_peers::PeerRegistry`].
//! - [`IdentificationAggregator`]s drain the identification queue, fill in the
//!   peers' identity and geolocate them.
//! - The [`ExporterActor`] periodically hands a registry snapshot to a
//!   [`ethcrawl_peers::PeerStore`], [`CsvPeerStore`] by default, and closes
//!   every peer's metrics window.
//!
//! ## Features
//!
//! - `metrics`: Enable Prometheus metrics collection in the host (optional)

#![doc(issue_tracker_base_url = "https://github.com/ethcrawl/ethcrawl/issues/")]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[macro_use]
extern crate tracing;

mod actors;
pub use actors::{
    AggregatorContext, AggregatorError, CancellableContext, ConnectionAggregator, CrawlerActor,
    ExporterActor, ExporterContext, ExporterError, IdentificationAggregator, MIN_EXPORT_INTERVAL,
};

mod store;
pub use store::CsvPeerStore;

mod service;
pub use service::{
    Crawler, CrawlerConfig, CrawlerError, DEFAULT_EXPORT_INTERVAL_SECS, DEFAULT_EXPORT_PATH,
    DEFAULT_IP, DEFAULT_PORT, ExportConfig,
};
