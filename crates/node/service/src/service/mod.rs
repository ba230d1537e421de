//! The [`Crawler`] service, composing the host and the [`CrawlerActor`]s.
//!
//! [`CrawlerActor`]: crate::CrawlerActor

mod config;
pub use config::{
    CrawlerConfig, DEFAULT_EXPORT_INTERVAL_SECS, DEFAULT_EXPORT_PATH, DEFAULT_IP, DEFAULT_PORT,
    ExportConfig,
};

mod crawler;
pub use crawler::{Crawler, CrawlerError};

pub(crate) mod util;
pub(crate) use util::spawn_and_wait;
