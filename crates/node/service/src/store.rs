//! A [`PeerStore`] writing peer snapshots to a CSV file.

use async_trait::async_trait;
use ethcrawl_peers::{PEER_CSV_HEADER, Peer, PeerStore, StoreError};
use std::path::{Path, PathBuf};

/// Writes each snapshot as a CSV file, replacing the previous one.
///
/// The file is written next to its destination and then renamed over it, so
/// readers never observe a partially written export.
#[derive(Debug, Clone)]
pub struct CsvPeerStore {
    path: PathBuf,
}

impl CsvPeerStore {
    /// Creates a [`CsvPeerStore`] writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the export path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Renders the header and one line per peer.
    pub fn render(peers: &[Peer]) -> String {
        let mut contents = PEER_CSV_HEADER.join(",");
        contents.push('\n');
        for peer in peers {
            contents.push_str(&peer.to_csv_line());
        }
        contents
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl PeerStore for CsvPeerStore {
    async fn store_peers(&self, peers: &[Peer]) -> Result<(), StoreError> {
        let staging = self.staging_path();
        tokio::fs::write(&staging, Self::render(peers)).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        debug!(target: "service::store", path = %self.path.display(), peers = peers.len(), "Wrote peer snapshot");
        Ok(())
    }
}
