//! Contains the crawler CLI.

use crate::flags::CrawlerArgs;
use anyhow::Result;
use clap::Parser;
use ethcrawl_cli::{LogArgs, LogConfig, MetricsArgs, cli_styles};
use ethcrawl_service::{Crawler, CrawlerConfig};
use libp2p_identity::Keypair;

/// The crawler CLI.
#[derive(Parser, Clone, Debug)]
#[command(author, version, about, styles = cli_styles(), long_about = None)]
pub(crate) struct Cli {
    /// Logging arguments.
    #[command(flatten)]
    pub log_args: LogArgs,
    /// Prometheus CLI arguments.
    #[command(flatten)]
    pub metrics: MetricsArgs,
    /// Crawler arguments.
    #[command(flatten)]
    pub crawler: CrawlerArgs,
}

impl Cli {
    /// Runs the CLI.
    pub(crate) fn run(self) -> Result<()> {
        // Initialize the telemetry stack.
        LogConfig::new(self.log_args.clone()).init_tracing_subscriber(None)?;
        self.metrics.init_metrics()?;
        if self.metrics.enabled {
            ethcrawl_p2p::Metrics::init();
        }

        let config = self.crawler.crawler_config()?;
        let keypair = self.crawler.keypair()?;
        Self::run_until_ctrl_c(Self::crawl(config, keypair))
    }

    /// Runs the crawler until a shutdown signal is received.
    async fn crawl(config: CrawlerConfig, keypair: Keypair) -> Result<()> {
        let crawler = Crawler::new(config, keypair);
        let cancellation = crawler.cancellation_token();
        tokio::spawn(async move {
            shutdown_signal().await;
            tracing::info!(target: "ethcrawl", "Received shutdown signal, initiating graceful shutdown...");
            cancellation.cancel();
        });

        crawler.start().await?;
        Ok(())
    }

    /// Run until ctrl-c is pressed.
    pub(crate) fn run_until_ctrl_c<F>(fut: F) -> Result<()>
    where
        F: std::future::Future<Output = Result<()>>,
    {
        let rt = Self::tokio_runtime()?;
        rt.block_on(fut)
    }

    /// Creates a new default tokio multi-thread [Runtime](tokio::runtime::Runtime) with all
    /// features enabled
    pub(crate) fn tokio_runtime() -> Result<tokio::runtime::Runtime, std::io::Error> {
        tokio::runtime::Builder::new_multi_thread().enable_all().build()
    }
}

/// Listens for OS shutdown signals (SIGTERM, SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(target: "ethcrawl", %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!(target: "ethcrawl", %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parses_all_groups() {
        let cli = Cli::parse_from([
            "ethcrawl",
            "-vvvv",
            "--logs.format",
            "compact",
            "--metrics.enabled",
            "--metrics.port",
            "9191",
            "--port",
            "9021",
        ]);
        assert_eq!(cli.log_args.level, 4);
        assert!(cli.metrics.enabled);
        assert_eq!(cli.metrics.port, 9191);
        assert_eq!(cli.crawler.port, 9021);
    }
}
