//! Metrics for the crawler host.

/// Container for metrics.
#[derive(Debug, Clone)]
pub struct Metrics;

impl Metrics {
    /// Counter of network notifications translated by the host, labelled by `type`.
    pub const NOTIFICATIONS: &str = "ethcrawl_host_notifications";

    /// Counter of events sent into the notification queues, labelled by `queue`.
    pub const QUEUE_SENDS: &str = "ethcrawl_host_queue_sends";

    /// Counter of dials, labelled by `type`.
    pub const DIAL_PEER: &str = "ethcrawl_host_dial_peer";

    /// Gauge of peers currently connected to the host.
    pub const PEER_COUNT: &str = "ethcrawl_host_peer_count";

    /// Histogram of identification latencies, in seconds.
    pub const IDENTIFY_LATENCY: &str = "ethcrawl_host_identify_latency_seconds";

    /// Initializes metrics for the host.
    ///
    /// This does two things:
    /// * Describes various metrics.
    /// * Initializes metrics to 0 so they can be queried immediately.
    #[cfg(feature = "metrics")]
    pub fn init() {
        Self::describe();
        Self::zero();
    }

    /// Describes metrics used in [`ethcrawl_p2p`][crate].
    #[cfg(feature = "metrics")]
    pub fn describe() {
        metrics::describe_counter!(
            Self::NOTIFICATIONS,
            "Network notifications translated into crawl events"
        );
        metrics::describe_counter!(Self::QUEUE_SENDS, "Events sent into the notification queues");
        metrics::describe_counter!(Self::DIAL_PEER, "Dials issued by the crawler host");
        metrics::describe_gauge!(Self::PEER_COUNT, "Number of peers connected to the host");
        metrics::describe_histogram!(
            Self::IDENTIFY_LATENCY,
            "Time from connection establishment to a completed identify exchange"
        );
    }

    /// Initializes metrics to `0` so they can be queried immediately by consumers of prometheus
    /// metrics.
    #[cfg(feature = "metrics")]
    pub fn zero() {
        for kind in ["connection", "disconnection", "connection_attempt", "message", "identify"] {
            metrics::counter!(Self::NOTIFICATIONS, "type" => kind).absolute(0);
        }
        for queue in ["connection", "identification"] {
            metrics::counter!(Self::QUEUE_SENDS, "queue" => queue).absolute(0);
        }
        for kind in ["requested", "failed"] {
            metrics::counter!(Self::DIAL_PEER, "type" => kind).absolute(0);
        }
        set!(PEER_COUNT; 0.0);
    }
}
