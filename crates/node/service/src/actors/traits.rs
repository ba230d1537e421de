//! [`CrawlerActor`] trait.

use async_trait::async_trait;
use tokio_util::sync::WaitForCancellationFuture;

/// A handle on the cancellation scope an actor runs in.
pub trait CancellableContext: Send {
    /// Returns a future that resolves when the actor is cancelled.
    fn cancelled(&self) -> WaitForCancellationFuture<'_>;
}

/// The [`CrawlerActor`] is a long running task of the crawler service.
///
/// Actors follow a two step lifecycle:
/// 1. Build: the actor is created from configuration and shared state known before the host is
///    running, such as the [`ethcrawl_peers::PeerRegistry`].
/// 2. Start: the actor receives its `StartData`, typically the receiving end of a host queue, and
///    runs until its context is cancelled or its input is exhausted.
#[async_trait]
pub trait CrawlerActor: Send + 'static {
    /// The error type for the actor.
    type Error: std::fmt::Debug;
    /// The data handed to [`CrawlerActor::start`], created after the actor was built.
    type StartData: Sized;

    /// Starts the actor.
    async fn start(self, start_context: Self::StartData) -> Result<(), Self::Error>;
}
