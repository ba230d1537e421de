//! Error types for CLI utilities.

use crate::KeypairError;
use metrics_exporter_prometheus::BuildError;
use std::io;
use thiserror::Error;
use tracing_subscriber::util::TryInitError;

/// Error type for prometheus server initialization.
#[derive(Debug, Error)]
pub enum PrometheusError {
    /// Failed to bind to the specified address.
    #[error("failed to bind to address: {0}")]
    Bind(#[from] io::Error),
    /// Failed to build or install the exporter.
    #[error("failed to install prometheus exporter: {0}")]
    Build(#[from] BuildError),
}

/// Errors that can occur in CLI operations.
#[derive(Error, Debug)]
pub enum CliError {
    /// Error initializing metrics.
    #[error("Failed to initialize metrics: {0}")]
    MetricsInitialization(#[from] PrometheusError),

    /// Error initializing the tracing subscriber.
    #[error("Failed to initialize tracing: {0}")]
    TracingInitialization(#[from] TryInitError),

    /// Error loading the host keypair.
    #[error("Failed to load keypair: {0}")]
    Keypair(#[from] KeypairError),
}

/// Type alias for CLI results.
pub type CliResult<T> = Result<T, CliError>;
