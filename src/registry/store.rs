//! Subscription registry implementation
//!
//! The central registry that maps event keys to subscriber queues and fans
//! decoded logs out to them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinSet;

use crate::event::{Address, Event, EventKey, Hash};
use crate::stats::metrics::{BroadcastOutcome, RegistryMetrics, RegistryStats};

use super::cache::KeyCache;
use super::config::RegistryConfig;
use super::error::RegistryError;
use super::queue::{Delivery, SubscriberQueue, Subscription, SubscriptionId};

/// Central registry for all subscriptions of one chain
///
/// Thread-safe via `RwLock`. Broadcasts only take the read lock long enough
/// to snapshot a key's subscriber list, so they never block each other.
/// Lock order is registry, then cache; per-queue gates are only awaited with
/// neither lock held.
pub struct SubscriptionRegistry {
    /// Map of event key to subscriber queues, in subscription order
    subscribers: RwLock<HashMap<EventKey, Vec<Arc<SubscriberQueue>>>>,

    /// Derived list of subscribed keys
    cache: KeyCache,

    /// Set once `close` starts; never cleared
    closing: AtomicBool,

    next_subscription_id: AtomicU64,

    metrics: RegistryMetrics,

    /// Configuration
    config: RegistryConfig,
}

impl SubscriptionRegistry {
    /// Create a new registry with default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a new registry with custom configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            cache: KeyCache::new(),
            closing: AtomicBool::new(false),
            next_subscription_id: AtomicU64::new(1),
            metrics: RegistryMetrics::new(),
            config,
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Chain this registry serves
    pub fn chain_id(&self) -> u64 {
        self.config.chain_id
    }

    /// Register a new subscriber for `(address, topic)`
    ///
    /// Subscribing twice under the same key yields two independent queues,
    /// each receiving every event.
    pub async fn subscribe(
        &self,
        address: Address,
        topic: Hash,
    ) -> Result<Subscription, RegistryError> {
        if address.is_zero() {
            tracing::warn!(
                chain_id = self.config.chain_id,
                "Attempted to subscribe with an empty address"
            );
            return Err(RegistryError::InvalidArgument("address cannot be empty"));
        }
        if topic.is_zero() {
            tracing::warn!(
                chain_id = self.config.chain_id,
                "Attempted to subscribe with an empty topic"
            );
            return Err(RegistryError::InvalidArgument("topic cannot be empty"));
        }

        let key = EventKey::new(address, topic);
        let mut subscribers = self.subscribers.write().await;

        // Checked under the write lock: close sets the flag under the same lock
        if self.closing.load(Ordering::SeqCst) {
            tracing::warn!(
                chain_id = self.config.chain_id,
                key = %key,
                "Attempted to subscribe to a closed registry"
            );
            return Err(RegistryError::Closed);
        }

        let id = SubscriptionId::new(self.next_subscription_id.fetch_add(1, Ordering::Relaxed));
        let (queue, subscription) =
            SubscriberQueue::channel(id, key, self.config.queue_capacity);

        let queues = subscribers.entry(key).or_default();
        queues.push(Arc::new(queue));
        let count = queues.len();

        self.cache.invalidate().await;

        tracing::info!(
            chain_id = self.config.chain_id,
            key = %key,
            subscription = %id,
            subscribers = count,
            "New subscription added"
        );

        Ok(subscription)
    }

    /// Remove a subscription and close its queue
    ///
    /// Waits until no broadcast is sending to this queue before closing it.
    /// Sends to other queues do not delay the call.
    pub async fn unsubscribe(
        &self,
        address: Address,
        topic: Hash,
        id: SubscriptionId,
    ) -> Result<(), RegistryError> {
        let key = EventKey::new(address, topic);

        let queue = {
            let mut subscribers = self.subscribers.write().await;

            let Some(queues) = subscribers.get_mut(&key) else {
                tracing::warn!(
                    chain_id = self.config.chain_id,
                    key = %key,
                    "Attempted to unsubscribe from a non-existent event key"
                );
                return Err(RegistryError::NotFoundEventKey(key));
            };

            let Some(position) = queues.iter().position(|queue| queue.id() == id) else {
                tracing::warn!(
                    chain_id = self.config.chain_id,
                    key = %key,
                    subscription = %id,
                    "Attempted to unsubscribe a non-existent subscriber"
                );
                return Err(RegistryError::NotFoundSubscriber(key, id));
            };

            let queue = queues.remove(position);
            let remaining = queues.len();

            if remaining == 0 {
                subscribers.remove(&key);
                tracing::debug!(
                    chain_id = self.config.chain_id,
                    key = %key,
                    "No remaining subscribers, removing event key from registry"
                );
            }

            self.cache.invalidate().await;

            tracing::info!(
                chain_id = self.config.chain_id,
                key = %key,
                subscription = %id,
                remaining = remaining,
                "Subscription removed"
            );

            queue
        };

        // Unlinked above, so no new broadcast can pick this queue up
        queue.close().await;

        tracing::debug!(
            chain_id = self.config.chain_id,
            key = %key,
            subscription = %id,
            "Subscriber queue closed"
        );

        Ok(())
    }

    /// Fan an event out to every subscriber of `key`
    ///
    /// Sends run concurrently, each waiting at most `send_timeout` for queue
    /// space; the call returns once all of them finished. A subscriber whose
    /// queue stays full misses the event and a warning is logged.
    ///
    /// `key` is trusted as given: it is not checked against the event's own
    /// address and topics.
    pub async fn broadcast(&self, key: &EventKey, event: Event) -> BroadcastOutcome {
        let queues = {
            let subscribers = self.subscribers.read().await;
            match subscribers.get(key) {
                Some(queues) => queues.clone(),
                None => {
                    tracing::debug!(
                        chain_id = self.config.chain_id,
                        key = %key,
                        "Event key not found in registry"
                    );
                    return BroadcastOutcome::default();
                }
            }
        };

        let mut outcome = BroadcastOutcome::default();
        let total = queues.len();
        let timeout = self.config.send_timeout;
        let mut sends = JoinSet::new();

        for (spawned, queue) in queues.into_iter().enumerate() {
            if self.closing.load(Ordering::SeqCst) {
                // Partial delivery is accepted during shutdown
                outcome.skipped += total - spawned;
                break;
            }

            let event = event.clone();
            sends.spawn(async move {
                let delivery = queue.deliver(event, timeout).await;
                (queue.id(), delivery)
            });
        }

        while let Some(result) = sends.join_next().await {
            match result {
                Ok((_, Delivery::Sent)) => outcome.delivered += 1,
                Ok((id, Delivery::TimedOut)) => {
                    outcome.dropped += 1;
                    tracing::warn!(
                        chain_id = self.config.chain_id,
                        key = %key,
                        subscription = %id,
                        timeout_ms = timeout.as_millis() as u64,
                        "Log broadcast to subscriber timed out, event dropped"
                    );
                }
                Ok((id, Delivery::ReceiverDropped)) => {
                    outcome.dropped += 1;
                    tracing::debug!(
                        chain_id = self.config.chain_id,
                        key = %key,
                        subscription = %id,
                        "Subscriber dropped its receiver without unsubscribing"
                    );
                }
                Ok((_, Delivery::Closed)) => outcome.skipped += 1,
                Err(e) => {
                    outcome.dropped += 1;
                    tracing::error!(
                        chain_id = self.config.chain_id,
                        key = %key,
                        error = %e,
                        "Broadcast send task failed"
                    );
                }
            }
        }

        self.metrics.record(&outcome);

        tracing::debug!(
            chain_id = self.config.chain_id,
            key = %key,
            block = event.block_number,
            delivered = outcome.delivered,
            dropped = outcome.dropped,
            skipped = outcome.skipped,
            "Log broadcast to all subscribers"
        );

        outcome
    }

    /// All event keys with at least one subscriber, sorted
    ///
    /// Served from cache until the next subscribe, unsubscribe or close.
    pub async fn list_keys(&self) -> Arc<[EventKey]> {
        if let Some(keys) = self.cache.get().await {
            return keys;
        }

        let subscribers = self.subscribers.read().await;

        let mut keys: Vec<EventKey> = subscribers
            .iter()
            .filter(|(_, queues)| !queues.is_empty())
            .map(|(key, _)| *key)
            .collect();
        keys.sort_unstable();
        let keys: Arc<[EventKey]> = keys.into();

        // Stored before the read lock is released so no mutation can slip in between
        self.cache.store(Arc::clone(&keys)).await;
        drop(subscribers);

        tracing::debug!(
            chain_id = self.config.chain_id,
            unique_keys = keys.len(),
            "Cached event keys"
        );

        keys
    }

    /// Shut the registry down, closing every subscriber queue exactly once
    ///
    /// In-flight sends finish (or time out) before their queue is closed.
    /// Later `subscribe` calls fail with [`RegistryError::Closed`]; calling
    /// `close` again is a no-op.
    pub async fn close(&self) {
        let drained = {
            let mut subscribers = self.subscribers.write().await;
            self.closing.store(true, Ordering::SeqCst);
            let drained = std::mem::take(&mut *subscribers);
            self.cache.invalidate().await;
            drained
        };

        if drained.is_empty() {
            tracing::debug!(
                chain_id = self.config.chain_id,
                "Subscription registry already empty"
            );
            return;
        }

        let mut closed = 0usize;
        for queue in drained.into_values().flatten() {
            if queue.close().await {
                closed += 1;
            }
        }

        tracing::info!(
            chain_id = self.config.chain_id,
            closed = closed,
            "Subscription registry closed, all subscriber queues have been closed"
        );
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.closing.load(Ordering::SeqCst)
    }

    /// Number of live subscriptions for a key
    pub async fn subscriber_count(&self, key: &EventKey) -> usize {
        self.subscribers
            .read()
            .await
            .get(key)
            .map_or(0, |queues| queues.len())
    }

    /// Number of distinct subscribed keys
    pub async fn key_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    /// Snapshot of registry statistics
    pub async fn stats(&self) -> RegistryStats {
        let mut stats = {
            let subscribers = self.subscribers.read().await;
            RegistryStats {
                key_count: subscribers.len(),
                subscriber_count: subscribers.values().map(Vec::len).sum(),
                in_flight: subscribers
                    .values()
                    .flatten()
                    .map(|queue| queue.in_flight())
                    .sum(),
                ..Default::default()
            }
        };

        self.metrics.fill(&mut stats);
        stats.cache_rebuilds = self.cache.rebuilds();
        stats
    }
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
