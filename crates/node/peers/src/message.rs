//! Contains the [`MessageMetrics`] counter.

use serde::{Deserialize, Serialize};

/// Counts the gossip messages received from a peer on a single topic.
///
/// The count only ever grows. It is zeroed by replacing the counter
/// at the end of a metrics window, see [`crate::Peer::reset_window`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageMetrics {
    /// The number of messages received.
    pub count: u64,
}

impl MessageMetrics {
    /// Creates a new counter starting at zero.
    pub const fn new() -> Self {
        Self { count: 0 }
    }

    /// Increments the counter by one.
    pub const fn increment(&mut self) {
        self.count += 1;
    }

    /// Returns the current count.
    pub const fn count(&self) -> u64 {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_metrics_starts_at_zero() {
        assert_eq!(MessageMetrics::new().count(), 0);
        assert_eq!(MessageMetrics::default(), MessageMetrics::new());
    }

    #[test]
    fn test_message_metrics_increment() {
        let mut metrics = MessageMetrics::new();
        for _ in 0..7 {
            metrics.increment();
        }
        assert_eq!(metrics.count(), 7);
    }
}
