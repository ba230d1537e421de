//! Common types for the host.

mod events;
pub use events::{
    ConnectionAttemptEvent, ConnectionEvent, DisconnectionEvent, Identification,
    IdentificationEvent, MessageEvent, TraceEvent,
};

mod network;
pub use network::{ForkDigest, ForkDigestError, NetworkKind, UnknownNetworkError};
