//! # ethcrawl-cli
//!
//! Command line utilities shared by the ethcrawl binaries: logging arguments
//! and tracing initialisation, Prometheus metrics arguments, secret key
//! loading and clap styling.

#![doc(issue_tracker_base_url = "https://github.com/ethcrawl/ethcrawl/issues/")]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod clap;
pub use clap::cli_styles;

mod error;
pub use error::{CliError, CliResult, PrometheusError};

mod secrets;
pub use secrets::{KeypairError, SecretKeyLoader, encode_secret_key, parse_secret_key};

pub mod backtrace;

pub mod log;
pub use log::{LogArgs, LogConfig};

mod tracing;
pub use tracing::{LogFormat, init_test_tracing};

mod prometheus;
pub use prometheus::init_prometheus_server;

pub mod metrics_args;
pub use metrics_args::MetricsArgs;
