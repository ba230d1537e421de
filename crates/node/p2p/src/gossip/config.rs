//! Eth2 gossipsub configuration.

use lazy_static::lazy_static;
use libp2p::gossipsub::{Config, ConfigBuilder, Message, MessageId, ValidationMode};
use sha2::{Digest, Sha256};
use snap::raw::Decoder;
use std::time::Duration;

/// The target number of peers in a topic mesh.
pub const DEFAULT_MESH_D: usize = 8;

/// The lower bound of peers in a topic mesh.
pub const DEFAULT_MESH_DLO: usize = 6;

/// The upper bound of peers in a topic mesh.
pub const DEFAULT_MESH_DHI: usize = 12;

/// The number of peers gossip is emitted to.
pub const DEFAULT_MESH_DLAZY: usize = 6;

/// The maximum size of a gossip message, 10 MiB.
pub const MAX_GOSSIP_SIZE: usize = 10 * (1 << 20);

/// Message id domain for messages whose payload decompresses.
pub const MESSAGE_DOMAIN_VALID_SNAPPY: [u8; 4] = [0x01, 0x00, 0x00, 0x00];

/// Message id domain for messages whose payload fails to decompress.
pub const MESSAGE_DOMAIN_INVALID_SNAPPY: [u8; 4] = [0x00, 0x00, 0x00, 0x00];

/// The length of an eth2 gossip message id.
pub const MESSAGE_ID_LEN: usize = 20;

lazy_static! {
    /// The gossip heartbeat.
    pub static ref GOSSIP_HEARTBEAT: Duration = Duration::from_millis(700);

    /// The seen messages TTL.
    /// Limits the duration that message IDs are remembered for gossip deduplication purposes.
    pub static ref SEEN_MESSAGES_TTL: Duration = 550 * *GOSSIP_HEARTBEAT;
}

/// Constructs the default eth2 [`Config`].
///
/// ## Panics
///
/// Panics if the config is invalid. Since values are hard-coded,
/// this is not expected to panic.
pub fn default_config() -> Config {
    default_config_builder().build().expect("default gossipsub config must be valid")
}

/// Builds the default eth2 gossipsub configuration.
///
/// Messages are anonymous and identified with [`compute_message_id`]. Call
/// `.build()` on the returned builder to get the final [`Config`].
pub fn default_config_builder() -> ConfigBuilder {
    let mut builder = ConfigBuilder::default();
    builder
        .mesh_n(DEFAULT_MESH_D)
        .mesh_n_low(DEFAULT_MESH_DLO)
        .mesh_n_high(DEFAULT_MESH_DHI)
        .gossip_lazy(DEFAULT_MESH_DLAZY)
        .heartbeat_interval(*GOSSIP_HEARTBEAT)
        .fanout_ttl(Duration::from_secs(60))
        .history_length(6)
        .history_gossip(3)
        .max_transmit_size(MAX_GOSSIP_SIZE)
        .duplicate_cache_time(*SEEN_MESSAGES_TTL)
        .validation_mode(ValidationMode::Anonymous)
        .message_id_fn(compute_message_id);
    builder
}

/// Computes the eth2 [`MessageId`] of a gossipsub [`Message`].
///
/// The id is the first 20 bytes of
/// `sha256(domain ++ len(topic) as u64 le ++ topic ++ payload)`, where the
/// payload is snappy-decompressed when possible and the domain records
/// whether decompression succeeded.
pub fn compute_message_id(msg: &Message) -> MessageId {
    let topic = msg.topic.as_str().as_bytes();
    let (domain, payload) = match Decoder::new().decompress_vec(&msg.data) {
        Ok(data) => (MESSAGE_DOMAIN_VALID_SNAPPY, data),
        Err(_) => {
            trace!(target: "p2p::gossip", "Failed to decompress message, using invalid snappy domain");
            (MESSAGE_DOMAIN_INVALID_SNAPPY, msg.data.clone())
        }
    };

    let mut hasher = Sha256::new();
    hasher.update(domain);
    hasher.update((topic.len() as u64).to_le_bytes());
    hasher.update(topic);
    hasher.update(&payload);
    MessageId(hasher.finalize()[..MESSAGE_ID_LEN].to_vec())
}
