//! [`tracing_subscriber`] utilities.

use crate::log::LogConfig;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{
    EnvFilter, Layer,
    prelude::__tracing_subscriber_SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

/// The format of the logs.
#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[clap(rename_all = "lowercase")]
pub enum LogFormat {
    /// Full format (default).
    #[default]
    Full,
    /// JSON format.
    Json,
    /// Pretty format.
    Pretty,
    /// Compact format.
    Compact,
}

impl LogConfig {
    /// Initializes the global tracing subscriber.
    ///
    /// `RUST_LOG` directives, or the given `env_filter`, refine the global level.
    pub fn init_tracing_subscriber(&self, env_filter: Option<EnvFilter>) -> Result<(), TryInitError> {
        let stdout_layer = match self.format {
            LogFormat::Full => tracing_subscriber::fmt::layer().boxed(),
            LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
            LogFormat::Pretty => tracing_subscriber::fmt::layer().pretty().boxed(),
            LogFormat::Compact => tracing_subscriber::fmt::layer().compact().boxed(),
        };

        let env_filter = env_filter
            .unwrap_or_else(EnvFilter::from_default_env)
            .add_directive(self.global_level.into());

        tracing_subscriber::registry().with(env_filter).with(stdout_layer).try_init()?;

        Ok(())
    }
}

/// Initializes tracing at debug level for tests. Repeated calls are no-ops.
pub fn init_test_tracing() {
    let _ = LogConfig::default().init_tracing_subscriber(None);
}
