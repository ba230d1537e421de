//! Utilities to extract parts of a [`Multiaddr`].

use libp2p::{Multiaddr, PeerId, multiaddr::Protocol};
use std::net::IpAddr;

/// Returns the first IP address component of the [`Multiaddr`].
pub fn multiaddr_ip(addr: &Multiaddr) -> Option<IpAddr> {
    addr.iter().find_map(|protocol| match protocol {
        Protocol::Ip4(ip) => Some(IpAddr::V4(ip)),
        Protocol::Ip6(ip) => Some(IpAddr::V6(ip)),
        _ => None,
    })
}

/// Returns the [`PeerId`] carried by a `/p2p/` component of the [`Multiaddr`].
pub fn multiaddr_peer_id(addr: &Multiaddr) -> Option<PeerId> {
    addr.iter().find_map(|protocol| match protocol {
        Protocol::P2p(peer_id) => Some(peer_id),
        _ => None,
    })
}
