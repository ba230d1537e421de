//! Arguments for logging.

use crate::tracing::LogFormat;
use clap::{ArgAction, Args};
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

/// Logging arguments.
#[derive(Args, Debug, Default, Serialize, Deserialize, Clone)]
pub struct LogArgs {
    /// Verbosity level (0-5).
    /// By default, the verbosity level is set to 3 (info level). 0 silences all logs.
    #[arg(
        short = 'v',
        global = true,
        default_value = "3",
        env = "ETHCRAWL_LOG_LEVEL",
        action = ArgAction::Count,
    )]
    pub level: u8,
    /// The format of the logs printed to stdout. One of: full, json, pretty, compact.
    ///
    /// full: The default rust log format.
    /// json: The logs are printed in JSON structured format.
    /// pretty: The logs are printed in a pretty, human readable format.
    /// compact: The logs are printed in a compact format.
    #[arg(long = "logs.format", global = true, default_value = "full", env = "ETHCRAWL_LOG_FORMAT")]
    pub format: LogFormat,
}

/// Global configuration for logging.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Global verbosity level for logging.
    pub global_level: LevelFilter,
    /// The format of the logs printed to stdout.
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { global_level: LevelFilter::DEBUG, format: LogFormat::Full }
    }
}

impl From<LogArgs> for LogConfig {
    fn from(args: LogArgs) -> Self {
        Self::new(args)
    }
}

impl LogConfig {
    /// Creates a new `LogConfig` from `LogArgs`.
    pub const fn new(args: LogArgs) -> Self {
        let level = match args.level {
            0 => LevelFilter::OFF,
            1 => LevelFilter::ERROR,
            2 => LevelFilter::WARN,
            3 => LevelFilter::INFO,
            4 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        };

        Self { global_level: level, format: args.format }
    }
}
