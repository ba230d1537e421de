//! Network Behaviour Module.

use crate::{BehaviourError, Event};
use derive_more::Debug;
use libp2p::{
    gossipsub::{self, Config, IdentTopic, MessageAuthenticity},
    identify,
    identity::PublicKey,
    ping,
    swarm::NetworkBehaviour,
};

/// The protocol version announced over identify.
pub const IDENTIFY_PROTOCOL_VERSION: &str = "eth2/1.0.0";

/// Specifies the [`NetworkBehaviour`] of the crawler host.
#[derive(NetworkBehaviour, Debug)]
#[behaviour(to_swarm = "Event")]
pub struct Behaviour {
    /// Responds to inbound pings and send outbound pings.
    #[debug(skip)]
    pub ping: ping::Behaviour,
    /// Exchanges identity metadata with every connected peer.
    #[debug(skip)]
    pub identify: identify::Behaviour,
    /// Receives beacon chain gossip.
    pub gossipsub: gossipsub::Behaviour,
}

impl Behaviour {
    /// Configures the swarm behaviours, subscribes to the given gossip topics, and returns a new
    /// [`Behaviour`].
    pub fn new(
        public_key: PublicKey,
        user_agent: &str,
        cfg: Config,
        topics: &[String],
    ) -> Result<Self, BehaviourError> {
        let ping = ping::Behaviour::default();

        let identify = identify::Behaviour::new(
            identify::Config::new(IDENTIFY_PROTOCOL_VERSION.to_string(), public_key)
                .with_agent_version(user_agent.to_string()),
        );

        let mut gossipsub = gossipsub::Behaviour::new(MessageAuthenticity::Anonymous, cfg)
            .map_err(|e| BehaviourError::GossipsubCreationFailed(e.to_string()))?;

        for topic in topics {
            let topic = IdentTopic::new(topic.as_str());
            gossipsub
                .subscribe(&topic)
                .map_err(|e| BehaviourError::SubscriptionFailed(e.to_string()))?;
            debug!(target: "p2p::gossip", %topic, "Subscribed to topic");
        }

        Ok(Self { ping, identify, gossipsub })
    }
}
