//! Flags configuring the crawler host and its export.

use crate::config::load_config;
use clap::Args;
use ethcrawl_cli::{SecretKeyLoader, parse_secret_key};
use ethcrawl_p2p::{ForkDigest, NetworkKind, default_user_agent};
use ethcrawl_service::{CrawlerConfig, ExportConfig};
use libp2p_identity::Keypair;
use std::{net::Ipv4Addr, path::PathBuf};

/// Crawler CLI flags.
#[derive(Args, Debug, Clone)]
pub(crate) struct CrawlerArgs {
    /// A TOML configuration file. When set, it replaces the host and export flags below.
    #[arg(long = "config", env = "ETHCRAWL_CONFIG")]
    pub config: Option<PathBuf>,
    /// The IPv4 address to listen on.
    #[arg(long = "ip", default_value = "0.0.0.0", env = "ETHCRAWL_IP")]
    pub ip: Ipv4Addr,
    /// The TCP port to listen on.
    #[arg(long = "port", default_value_t = ethcrawl_service::DEFAULT_PORT, env = "ETHCRAWL_PORT")]
    pub port: u16,
    /// Hex encoded secp256k1 secret key of the host. A random key is used when neither this nor
    /// `--private-key.path` is set.
    #[arg(long = "private-key", env = "ETHCRAWL_PRIVATE_KEY", conflicts_with = "private_key_path")]
    pub private_key: Option<String>,
    /// A file holding the hex encoded secret key. Created with a new key if it does not exist.
    #[arg(long = "private-key.path", env = "ETHCRAWL_PRIVATE_KEY_PATH")]
    pub private_key_path: Option<PathBuf>,
    /// The user agent announced to peers. Defaults to `ethcrawl/<version>`.
    #[arg(long = "user-agent", env = "ETHCRAWL_USER_AGENT")]
    pub user_agent: Option<String>,
    /// The network to crawl. One of: mainnet, sepolia, holesky, hoodi, devnet.
    #[arg(long = "network", default_value = "mainnet", env = "ETHCRAWL_NETWORK")]
    pub network: NetworkKind,
    /// The 4 byte hex fork digest of the gossip topics to subscribe to.
    #[arg(long = "fork-digest", default_value = "6a95a1a9", env = "ETHCRAWL_FORK_DIGEST")]
    pub fork_digest: ForkDigest,
    /// Comma separated multiaddrs dialed at start-up.
    #[arg(long = "bootnodes", value_delimiter = ',', env = "ETHCRAWL_BOOTNODES")]
    pub bootnodes: Vec<String>,
    /// The number of workers draining each host queue.
    #[arg(long = "aggregator.workers", default_value_t = 1, env = "ETHCRAWL_AGGREGATOR_WORKERS")]
    pub aggregator_workers: usize,
    /// The CSV file peers are exported to.
    #[arg(long = "export.path", default_value = ethcrawl_service::DEFAULT_EXPORT_PATH, env = "ETHCRAWL_EXPORT_PATH")]
    pub export_path: PathBuf,
    /// Seconds between exports.
    #[arg(
        long = "export.interval",
        default_value_t = ethcrawl_service::DEFAULT_EXPORT_INTERVAL_SECS,
        env = "ETHCRAWL_EXPORT_INTERVAL"
    )]
    pub export_interval: u64,
}

impl CrawlerArgs {
    /// Returns the [`CrawlerConfig`], read from `--config` when set.
    pub(crate) fn crawler_config(&self) -> anyhow::Result<CrawlerConfig> {
        if let Some(path) = &self.config {
            return load_config(path);
        }

        Ok(CrawlerConfig {
            ip: self.ip.to_string(),
            port: self.port,
            user_agent: self.user_agent.clone().unwrap_or_else(default_user_agent),
            network: self.network,
            fork_digest: self.fork_digest,
            bootnodes: self.bootnodes.clone(),
            aggregator_workers: self.aggregator_workers,
            export: ExportConfig { path: self.export_path.clone(), interval_secs: self.export_interval },
        })
    }

    /// Returns the host [`Keypair`].
    pub(crate) fn keypair(&self) -> anyhow::Result<Keypair> {
        if let Some(secret) = &self.private_key {
            return Ok(parse_secret_key(secret)?);
        }
        if let Some(path) = &self.private_key_path {
            return Ok(SecretKeyLoader::load(path)?);
        }
        Ok(Keypair::generate_secp256k1())
    }
}
