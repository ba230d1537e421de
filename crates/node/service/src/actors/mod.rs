//! [`CrawlerActor`] services for the crawler.
//!
//! [`CrawlerActor`]: super::CrawlerActor

mod traits;
pub use traits::{CancellableContext, CrawlerActor};

mod aggregator;
pub use aggregator::{
    AggregatorContext, AggregatorError, ConnectionAggregator, IdentificationAggregator,
};

mod exporter;
pub use exporter::{ExporterActor, ExporterContext, ExporterError, MIN_EXPORT_INTERVAL};
