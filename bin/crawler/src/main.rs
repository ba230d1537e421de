//! The `ethcrawl` binary: crawls the Ethereum consensus-layer peer-to-peer network and
//! periodically exports per-peer connection, identity and gossip statistics.

#![doc(issue_tracker_base_url = "https://github.com/ethcrawl/ethcrawl/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

use clap::Parser;

mod cli;
mod config;
mod flags;

fn main() {
    ethcrawl_cli::backtrace::enable();

    if let Err(err) = cli::Cli::parse().run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}
