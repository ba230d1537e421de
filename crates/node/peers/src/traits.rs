//! Collaborator traits injected into the crawler.

use crate::{LocatorError, Peer, StoreError};
use async_trait::async_trait;
use std::net::IpAddr;

/// A resolved geographic location.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Location {
    /// The country name.
    pub country: String,
    /// The city name.
    pub city: String,
}

/// Resolves IP addresses to a [`Location`].
#[async_trait]
pub trait IpLocator: std::fmt::Debug + Send + Sync {
    /// Locates the given address.
    async fn locate(&self, ip: IpAddr) -> Result<Location, LocatorError>;
}

/// Persists exported peer snapshots.
#[async_trait]
pub trait PeerStore: std::fmt::Debug + Send + Sync {
    /// Stores a snapshot of peers. Each call replaces the previous snapshot.
    async fn store_peers(&self, peers: &[Peer]) -> Result<(), StoreError>;
}

/// An [`IpLocator`] that never resolves anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLocator;

#[async_trait]
impl IpLocator for NoopLocator {
    async fn locate(&self, ip: IpAddr) -> Result<Location, LocatorError> {
        Err(LocatorError::NotFound(ip))
    }
}

/// A [`PeerStore`] that discards every snapshot.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPeerStore;

#[async_trait]
impl PeerStore for NoopPeerStore {
    async fn store_peers(&self, _peers: &[Peer]) -> Result<(), StoreError> {
        Ok(())
    }
}
