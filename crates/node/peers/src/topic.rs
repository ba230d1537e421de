//! The gossip topics tracked per peer.

use crate::UnknownTopicError;
use core::fmt;
use std::str::FromStr;

/// The well-known beacon chain gossip topics a [`crate::Peer`] keeps a counter for.
///
/// Topic names are the `Name` segment of an eth2 gossip topic
/// `/eth2/<ForkDigest>/<Name>/<Encoding>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GossipTopic {
    /// Signed beacon blocks.
    BeaconBlock,
    /// Signed aggregate attestations and their proofs.
    BeaconAggregateProof,
    /// Signed voluntary exits.
    VoluntaryExit,
    /// Proposer slashings.
    ProposerSlashing,
    /// Attester slashings.
    AttesterSlashing,
}

impl GossipTopic {
    /// All tracked topics, in export column order.
    pub const ALL: [Self; 5] = [
        Self::BeaconBlock,
        Self::BeaconAggregateProof,
        Self::VoluntaryExit,
        Self::ProposerSlashing,
        Self::AttesterSlashing,
    ];

    /// The prefix shared by every eth2 gossip topic.
    pub const PREFIX: &str = "eth2";

    /// The encoding suffix used by every eth2 gossip topic.
    pub const ENCODING: &str = "ssz_snappy";

    /// Returns the topic name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::BeaconBlock => "beacon_block",
            Self::BeaconAggregateProof => "beacon_aggregate_and_proof",
            Self::VoluntaryExit => "voluntary_exit",
            Self::ProposerSlashing => "proposer_slashing",
            Self::AttesterSlashing => "attester_slashing",
        }
    }

    /// Returns the full gossip topic string for the given fork digest.
    pub fn full_topic(&self, fork_digest: &str) -> String {
        format!("/{}/{}/{}/{}", Self::PREFIX, fork_digest, self.name(), Self::ENCODING)
    }

    /// Extracts the topic name from a full eth2 gossip topic string.
    ///
    /// Strings that are not shaped like `/eth2/<digest>/<name>/<encoding>`
    /// are returned unchanged so that bare names pass straight through.
    pub fn name_from_full(topic: &str) -> &str {
        let mut parts = topic.split('/');
        match (parts.next(), parts.next(), parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(""), Some(Self::PREFIX), Some(_), Some(name), Some(_), None) => name,
            _ => topic,
        }
    }
}

impl fmt::Display for GossipTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GossipTopic {
    type Err = UnknownTopicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|topic| topic.name() == s)
            .ok_or_else(|| UnknownTopicError(s.to_string()))
    }
}
