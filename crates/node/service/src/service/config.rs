//! Configuration of the [`crate::Crawler`].

use ethcrawl_p2p::{ForkDigest, NetworkKind, default_user_agent};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// The default address the host listens on.
pub const DEFAULT_IP: &str = "0.0.0.0";

/// The default TCP port the host listens on.
pub const DEFAULT_PORT: u16 = 9020;

/// The default CSV export path.
pub const DEFAULT_EXPORT_PATH: &str = "peers.csv";

/// The default export interval, in seconds.
pub const DEFAULT_EXPORT_INTERVAL_SECS: u64 = 60;

/// Configuration of a [`crate::Crawler`].
///
/// Every field is optional when deserialized, missing fields take their
/// defaults. The host keypair is not part of the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// The IPv4 address to listen on.
    pub ip: String,
    /// The TCP port to listen on.
    pub port: u16,
    /// The user agent announced to peers.
    pub user_agent: String,
    /// The network being crawled.
    pub network: NetworkKind,
    /// The fork digest scoping the gossip topics.
    pub fork_digest: ForkDigest,
    /// Multiaddrs dialed once the host is running.
    pub bootnodes: Vec<String>,
    /// The number of workers draining each host queue.
    pub aggregator_workers: usize,
    /// Export settings.
    pub export: ExportConfig,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            ip: DEFAULT_IP.to_string(),
            port: DEFAULT_PORT,
            user_agent: default_user_agent(),
            network: NetworkKind::default(),
            fork_digest: ForkDigest::default(),
            bootnodes: Vec::new(),
            aggregator_workers: 1,
            export: ExportConfig::default(),
        }
    }
}

/// Export settings of a [`CrawlerConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// The CSV file peers are exported to.
    pub path: PathBuf,
    /// Seconds between exports.
    pub interval_secs: u64,
}

impl ExportConfig {
    /// Returns the export interval.
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { path: PathBuf::from(DEFAULT_EXPORT_PATH), interval_secs: DEFAULT_EXPORT_INTERVAL_SECS }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CrawlerConfig::default();
        assert_eq!(config.ip, "0.0.0.0");
        assert_eq!(config.port, 9020);
        assert!(config.user_agent.starts_with("ethcrawl/"));
        assert_eq!(config.network, NetworkKind::Mainnet);
        assert_eq!(config.fork_digest, ForkDigest::MAINNET_DENEB);
        assert_eq!(config.aggregator_workers, 1);
        assert_eq!(config.export.path, PathBuf::from("peers.csv"));
        assert_eq!(config.export.interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_partial_toml() {
        let config: CrawlerConfig = toml::from_str(
            r#"
            port = 9100
            network = "holesky"
            fork_digest = "0x01017000"
            bootnodes = ["/ip4/127.0.0.1/tcp/9000"]

            [export]
            interval_secs = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.ip, DEFAULT_IP);
        assert_eq!(config.port, 9100);
        assert_eq!(config.network, NetworkKind::Holesky);
        assert_eq!(config.fork_digest, ForkDigest([0x01, 0x01, 0x70, 0x00]));
        assert_eq!(config.bootnodes, vec!["/ip4/127.0.0.1/tcp/9000".to_string()]);
        assert_eq!(config.export.path, PathBuf::from(DEFAULT_EXPORT_PATH));
        assert_eq!(config.export.interval(), Duration::from_secs(10));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(toml::from_str::<CrawlerConfig>("fork_digest = \"zz\"").is_err());
        assert!(toml::from_str::<CrawlerConfig>("network = \"ropsten\"").is_err());
    }
}
