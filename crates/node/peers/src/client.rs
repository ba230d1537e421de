//! Consensus client identification from libp2p user agents.

use serde::{Deserialize, Serialize};

/// The client name reported for a non-empty user agent that matches no known client.
pub const UNKNOWN_CLIENT: &str = "Unknown";

/// Client details parsed from a peer's user agent.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    /// The client implementation name.
    pub name: Option<String>,
    /// The operating system / target triple, when reported.
    pub os: Option<String>,
    /// The client version, when reported.
    pub version: Option<String>,
}

impl ClientInfo {
    /// Parses a user agent of the shape `<client>/<version>/<os>/...`.
    ///
    /// Teku reports `teku/teku/<version>/<os>/...`, and Nimbus usually
    /// reports a bare `nimbus`. An empty user agent yields empty info.
    pub fn from_user_agent(user_agent: &str) -> Self {
        let user_agent = user_agent.trim();
        if user_agent.is_empty() {
            return Self::default();
        }

        let segments: Vec<&str> = user_agent.split('/').map(str::trim).collect();
        let first = segments[0].to_lowercase();
        let segment = |i: usize| {
            segments.get(i).filter(|s| !s.is_empty()).map(|s| (*s).to_string())
        };

        let name = match first.as_str() {
            "lighthouse" => "Lighthouse",
            "prysm" => "Prysm",
            "teku" => "Teku",
            "nimbus" => "Nimbus",
            "lodestar" | "js-libp2p" => "Lodestar",
            "grandine" => "Grandine",
            "erigon" | "caplin" => "Erigon",
            _ => {
                return Self { name: Some(UNKNOWN_CLIENT.to_string()), os: None, version: None };
            }
        };

        let (version, os) = match name {
            // teku/teku/v24.1.0/linux-x86_64/-eclipseadoptium-openjdk64bitservervm-java-21
            "Teku" => (segment(2), segment(3)),
            // Prysm/v5.0.3/<commit>
            "Prysm" => (segment(1), None),
            _ => (segment(1), segment(2)),
        };

        Self { name: Some(name.to_string()), os, version }
    }
}
