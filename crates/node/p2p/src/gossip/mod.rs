//! Gossipsub, identify and ping behaviour of the host.

mod behaviour;
pub use behaviour::{Behaviour, IDENTIFY_PROTOCOL_VERSION};

mod config;
pub use config::{
    DEFAULT_MESH_D, DEFAULT_MESH_DHI, DEFAULT_MESH_DLAZY, DEFAULT_MESH_DLO, GOSSIP_HEARTBEAT,
    MAX_GOSSIP_SIZE, MESSAGE_DOMAIN_INVALID_SNAPPY, MESSAGE_DOMAIN_VALID_SNAPPY, MESSAGE_ID_LEN,
    SEEN_MESSAGES_TTL, compute_message_id, default_config, default_config_builder,
};

mod error;
pub use error::BehaviourError;

mod event;
pub use event::Event;
