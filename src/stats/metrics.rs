//! Statistics and metrics for the subscription registry

use std::sync::atomic::{AtomicU64, Ordering};

/// Result of a single `broadcast` call
///
/// Purely diagnostic: a broadcast never fails, drops are part of normal
/// backpressure handling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastOutcome {
    /// Subscribers whose queue accepted the event
    pub delivered: usize,
    /// Subscribers that missed the event (queue full past the timeout, or receiver dropped)
    pub dropped: usize,
    /// Subscribers not attempted because their queue or the registry was closing
    pub skipped: usize,
}

impl BroadcastOutcome {
    /// Total number of subscribers the call was routed to
    pub fn subscribers(&self) -> usize {
        self.delivered + self.dropped + self.skipped
    }
}

/// Point-in-time registry statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Distinct event keys with at least one subscriber
    pub key_count: usize,
    /// Live subscriptions across all keys
    pub subscriber_count: usize,
    /// Sends currently waiting on a subscriber queue
    pub in_flight: usize,
    /// Broadcast calls that found at least one subscriber
    pub broadcasts: u64,
    /// Events accepted by subscriber queues
    pub delivered: u64,
    /// Events dropped for slow or vanished subscribers
    pub dropped: u64,
    /// Sends skipped because of a close
    pub skipped: u64,
    /// Times the key cache was rebuilt
    pub cache_rebuilds: u64,
}

/// Lifetime counters, updated without locking
#[derive(Debug, Default)]
pub(crate) struct RegistryMetrics {
    broadcasts: AtomicU64,
    delivered: AtomicU64,
    dropped: AtomicU64,
    skipped: AtomicU64,
}

impl RegistryMetrics {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&self, outcome: &BroadcastOutcome) {
        self.broadcasts.fetch_add(1, Ordering::Relaxed);
        self.delivered
            .fetch_add(outcome.delivered as u64, Ordering::Relaxed);
        self.dropped.fetch_add(outcome.dropped as u64, Ordering::Relaxed);
        self.skipped.fetch_add(outcome.skipped as u64, Ordering::Relaxed);
    }

    /// Fill the counter fields of a stats snapshot
    pub(crate) fn fill(&self, stats: &mut RegistryStats) {
        stats.broadcasts = self.broadcasts.load(Ordering::Relaxed);
        stats.delivered = self.delivered.load(Ordering::Relaxed);
        stats.dropped = self.dropped.load(Ordering::Relaxed);
        stats.skipped = self.skipped.load(Ordering::Relaxed);
    }
}
