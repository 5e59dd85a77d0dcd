//! Registry configuration

use std::time::Duration;

/// Default number of events buffered per subscriber
pub const DEFAULT_QUEUE_CAPACITY: usize = 3;

/// Default time a broadcast waits on a full subscriber queue
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_millis(100);

/// Subscription registry configuration
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Chain the registry serves (used as a logging field)
    pub chain_id: u64,

    /// Capacity of each subscriber queue
    pub queue_capacity: usize,

    /// Bounded wait for a single enqueue before the event is dropped
    pub send_timeout: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            chain_id: 0,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }
}

impl RegistryConfig {
    /// Create a config for the given chain
    pub fn for_chain(chain_id: u64) -> Self {
        Self {
            chain_id,
            ..Default::default()
        }
    }

    /// Set the chain ID
    pub fn chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    /// Set the per-subscriber queue capacity (at least 1)
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Set the per-send timeout
    pub fn send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RegistryConfig::default();

        assert_eq!(config.chain_id, 0);
        assert_eq!(config.queue_capacity, 3);
        assert_eq!(config.send_timeout, Duration::from_millis(100));
    }

    #[test]
    fn test_for_chain() {
        let config = RegistryConfig::for_chain(1337);

        assert_eq!(config.chain_id, 1337);
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
    }

    #[test]
    fn test_builder_queue_capacity_floor() {
        // A zero-capacity channel cannot be created
        let config = RegistryConfig::default().queue_capacity(0);

        assert_eq!(config.queue_capacity, 1);
    }

    #[test]
    fn test_builder_chaining() {
        let config = RegistryConfig::default()
            .chain_id(1)
            .queue_capacity(16)
            .send_timeout(Duration::from_millis(20));

        assert_eq!(config.chain_id, 1);
        assert_eq!(config.queue_capacity, 16);
        assert_eq!(config.send_timeout, Duration::from_millis(20));
    }
}
