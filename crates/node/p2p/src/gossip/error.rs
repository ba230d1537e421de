//! Contains the error from constructing the host behaviour.

use thiserror::Error;

/// An error that can occur when creating a [`crate::Behaviour`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BehaviourError {
    /// The gossipsub behaviour creation failed.
    #[error("gossipsub behaviour creation failed: {0}")]
    GossipsubCreationFailed(String),
    /// Subscribing to a topic failed.
    #[error("subscription failed: {0}")]
    SubscriptionFailed(String),
}
