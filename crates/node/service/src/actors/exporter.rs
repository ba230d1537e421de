//! The exporter actor, periodically handing registry snapshots to a [`PeerStore`].

use crate::{CancellableContext, CrawlerActor};
use async_trait::async_trait;
use chrono::Utc;
use ethcrawl_peers::{PeerRegistry, PeerStore, StoreError};
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tokio::{select, time::MissedTickBehavior};
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// The shortest accepted export interval.
pub const MIN_EXPORT_INTERVAL: Duration = Duration::from_secs(1);

/// The start context of the [`ExporterActor`].
#[derive(Debug)]
pub struct ExporterContext {
    /// The cancellation token, shared between all tasks.
    pub cancellation: CancellationToken,
}

impl CancellableContext for ExporterContext {
    fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.cancellation.cancelled()
    }
}

/// An error from a single export.
#[derive(Debug, Error)]
pub enum ExporterError {
    /// The peer store rejected the snapshot.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Exports the [`PeerRegistry`] on a fixed interval.
///
/// Every tick closes the metrics window of each peer, hands the closed
/// windows to the [`PeerStore`] and stamps each peer's last export time.
/// Counts recorded while the store runs belong to the next window. A failed
/// store folds the closed windows back in, so their counts are carried into
/// the next export.
#[derive(Debug)]
pub struct ExporterActor {
    registry: PeerRegistry,
    peer_store: Arc<dyn PeerStore>,
    interval: Duration,
}

impl ExporterActor {
    /// Creates a new [`ExporterActor`]. The interval is clamped to [`MIN_EXPORT_INTERVAL`].
    pub fn new(registry: PeerRegistry, peer_store: Arc<dyn PeerStore>, interval: Duration) -> Self {
        Self { registry, peer_store, interval: interval.max(MIN_EXPORT_INTERVAL) }
    }

    /// Returns the export interval.
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs a single export, returning the number of exported peers.
    pub async fn export(&self) -> Result<usize, ExporterError> {
        let peers = self.registry.take_window();
        if let Err(err) = self.peer_store.store_peers(&peers).await {
            self.registry.restore_window(&peers);
            return Err(err.into());
        }
        self.registry.mark_exported(&peers, Utc::now());
        info!(target: "service::exporter", peers = peers.len(), "Exported peers");
        Ok(peers.len())
    }
}

#[async_trait]
impl CrawlerActor for ExporterActor {
    type Error = ExporterError;
    type StartData = ExporterContext;

    async fn start(self, context: Self::StartData) -> Result<(), Self::Error> {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            select! {
                biased;

                _ = context.cancelled() => {
                    info!(target: "service::exporter", "Received shutdown signal. Exiting exporter task.");
                    if let Err(err) = self.export().await {
                        warn!(target: "service::exporter", %err, "Final export failed");
                    }
                    return Ok(());
                }
                _ = ticker.tick() => {
                    if let Err(err) = self.export().await {
                        warn!(target: "service::exporter", %err, "Export failed");
                    }
                }
            }
        }
    }
}
