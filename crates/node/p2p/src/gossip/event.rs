//! Event Handling Module.

use libp2p::{gossipsub, identify, ping};

/// The events emitted by the host [`crate::Behaviour`].
#[derive(Debug)]
pub enum Event {
    /// Represents a [`ping::Event`]
    Ping(ping::Event),
    /// Represents an [`identify::Event`]
    Identify(Box<identify::Event>),
    /// Represents a [`gossipsub::Event`]
    Gossipsub(Box<gossipsub::Event>),
}

impl From<ping::Event> for Event {
    fn from(value: ping::Event) -> Self {
        Self::Ping(value)
    }
}

impl From<identify::Event> for Event {
    fn from(value: identify::Event) -> Self {
        Self::Identify(Box::new(value))
    }
}

impl From<gossipsub::Event> for Event {
    fn from(value: gossipsub::Event) -> Self {
        Self::Gossipsub(Box::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libp2p::{PeerId, swarm::ConnectionId};

    #[test]
    fn test_gossipsub_event_conversion() {
        let event = Event::from(gossipsub::Event::Message {
            propagation_source: PeerId::random(),
            message_id: gossipsub::MessageId(vec![]),
            message: gossipsub::Message {
                source: None,
                data: vec![],
                sequence_number: None,
                topic: gossipsub::TopicHash::from_raw("/eth2/6a95a1a9/beacon_block/ssz_snappy"),
            },
        });
        assert!(matches!(event, Event::Gossipsub(e) if matches!(*e, gossipsub::Event::Message { .. })));
    }

    #[test]
    fn test_ping_event_conversion() {
        let event = Event::from(ping::Event {
            peer: PeerId::random(),
            connection: ConnectionId::new_unchecked(0),
            result: Ok(core::time::Duration::from_millis(40)),
        });
        assert!(matches!(event, Event::Ping(_)));
    }
}
