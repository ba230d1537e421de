//! Prometheus metrics CLI args
//!
//! Specifies the available flags for prometheus metric configuration inside CLI

use crate::{CliResult, init_prometheus_server};
use clap::Args;
use std::net::{IpAddr, Ipv4Addr};

/// The metric configuration available in CLI
#[derive(Debug, Clone, Args)]
pub struct MetricsArgs {
    /// Controls whether prometheus metrics are enabled.
    /// Disabled by default.
    #[arg(
        id = "metrics_enabled",
        long = "metrics.enabled",
        global = true,
        default_value_t = false,
        env = "ETHCRAWL_METRICS_ENABLED"
    )]
    pub enabled: bool,
    /// The port to serve prometheus metrics on
    #[arg(
        id = "metrics_port",
        long = "metrics.port",
        global = true,
        default_value = "9090",
        env = "ETHCRAWL_METRICS_PORT"
    )]
    pub port: u16,
    /// The ip address to use to emit prometheus metrics.
    #[arg(
        id = "metrics_addr",
        long = "metrics.addr",
        global = true,
        default_value = "0.0.0.0",
        env = "ETHCRAWL_METRICS_ADDR"
    )]
    pub addr: IpAddr,
}

impl Default for MetricsArgs {
    fn default() -> Self {
        Self { enabled: false, port: 9090, addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED) }
    }
}

impl MetricsArgs {
    /// Starts the Prometheus metrics server when enabled.
    ///
    /// This function should be called at the beginning of the program.
    pub fn init_metrics(&self) -> CliResult<()> {
        if self.enabled {
            init_prometheus_server(self.addr, self.port)?;
        }

        Ok(())
    }
}
