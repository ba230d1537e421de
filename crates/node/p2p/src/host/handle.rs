//! Contains a handle to the spawned host.

use crate::{IdentificationEvent, TraceEvent};
use async_channel::Receiver;
use libp2p::{Multiaddr, PeerId};
use thiserror::Error;
use tokio::{sync::mpsc::Sender, task::JoinHandle};
use tokio_util::sync::CancellationToken;

/// The host task is no longer running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("the host is not running")]
pub struct HostStoppedError;

/// Handle to the spawned [`crate::HostManager`].
///
/// Relays dial requests to the host task through a channel and exposes the
/// read side of both notification queues.
#[derive(Debug)]
pub struct HostHandle {
    peer_id: PeerId,
    full_multiaddr: Multiaddr,
    dial_sender: Sender<Multiaddr>,
    connection_events: Receiver<TraceEvent>,
    identification_events: Receiver<IdentificationEvent>,
    cancellation: CancellationToken,
    task: JoinHandle<()>,
}

impl HostHandle {
    /// Creates a new [`HostHandle`].
    pub(crate) const fn new(
        peer_id: PeerId,
        full_multiaddr: Multiaddr,
        dial_sender: Sender<Multiaddr>,
        connection_events: Receiver<TraceEvent>,
        identification_events: Receiver<IdentificationEvent>,
        cancellation: CancellationToken,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            peer_id,
            full_multiaddr,
            dial_sender,
            connection_events,
            identification_events,
            cancellation,
            task,
        }
    }

    /// Returns the host's peer id.
    pub const fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    /// Returns the host's listen address including its `/p2p/` component.
    pub const fn full_multiaddr(&self) -> &Multiaddr {
        &self.full_multiaddr
    }

    /// Asks the host to dial the given address.
    ///
    /// The outcome is reported as a connection attempt event once the dial resolves.
    pub async fn dial(&self, addr: Multiaddr) -> Result<(), HostStoppedError> {
        self.dial_sender.send(addr).await.map_err(|_| HostStoppedError)
    }

    /// Returns a read handle to the connection event queue.
    pub fn connection_events(&self) -> Receiver<TraceEvent> {
        self.connection_events.clone()
    }

    /// Returns a read handle to the identification event queue.
    pub fn identification_events(&self) -> Receiver<IdentificationEvent> {
        self.identification_events.clone()
    }

    /// Returns whether the host task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancels the host and waits for its task to exit.
    pub async fn shutdown(self) {
        self.cancellation.cancel();
        if let Err(e) = self.task.await {
            warn!(target: "p2p::host", ?e, "Host task did not exit cleanly");
        }
    }
}
