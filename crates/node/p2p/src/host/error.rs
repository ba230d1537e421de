//! Contains the error from building the host.

use crate::BehaviourError;
use thiserror::Error;

/// An error type for the [`crate::HostBuilder`].
///
/// Every variant is fatal: no partially constructed host is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostBuilderError {
    /// The listen IP was not set.
    #[error("listen ip not set")]
    MissingIp,
    /// The listen port was not set.
    #[error("listen port not set")]
    MissingPort,
    /// The host keypair was not set.
    #[error("host keypair not set")]
    MissingKeypair,
    /// The listen address does not form a valid multiaddress.
    #[error("couldn't generate multiaddress {addr}")]
    InvalidMultiaddr {
        /// The rejected textual address.
        addr: String,
    },
    /// A TCP error.
    #[error("TCP error")]
    TcpError,
    /// An error when setting the behaviour on the swarm builder.
    #[error("error setting behaviour on swarm builder")]
    WithBehaviourError,
    /// An error when building the host behaviour.
    #[error("error building host behaviour: {0}")]
    Behaviour(#[from] BehaviourError),
}
