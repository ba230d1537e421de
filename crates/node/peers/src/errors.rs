//! Error types for the peers crate.

use thiserror::Error;

/// A topic name that is not one of the tracked [`crate::GossipTopic`]s.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown topic name: {0}")]
pub struct UnknownTopicError(pub String);

/// An error returned by an [`crate::IpLocator`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocatorError {
    /// The locator has no entry for the address.
    #[error("no location found for {0}")]
    NotFound(std::net::IpAddr),
    /// The lookup backend failed.
    #[error("ip lookup failed: {0}")]
    Backend(String),
}

/// An error returned by a [`crate::PeerStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error while persisting peers.
    #[error("failed to persist peers: {0}")]
    Io(#[from] std::io::Error),
    /// The storage backend rejected the write.
    #[error("peer store backend error: {0}")]
    Backend(String),
}
