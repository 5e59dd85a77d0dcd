//! Decoded chain log payload
//!
//! The registry treats `Event` as opaque: it is cloned once per subscriber
//! and handed over unmodified.

use bytes::Bytes;

use super::key::{Address, EventKey, Hash};

/// A decoded on-chain log delivered to subscribers
///
/// This is designed to be cheap to clone: `data` is reference counted and
/// logs carry at most a handful of topics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Block the log was included in
    pub block_number: u64,
    /// Hash of the transaction that emitted the log
    pub tx_hash: Hash,
    /// Emitting contract
    pub address: Address,
    /// Indexed topics, signature hash first
    pub topics: Vec<Hash>,
    /// Non-indexed data (zero-copy via reference counting)
    pub data: Bytes,
    /// Position of the log within its block
    pub index: u32,
}

impl Event {
    /// Create an event with no data
    pub fn new(block_number: u64, tx_hash: Hash, address: Address, topics: Vec<Hash>) -> Self {
        Self {
            block_number,
            tx_hash,
            address,
            topics,
            data: Bytes::new(),
            index: 0,
        }
    }

    /// Set the data payload
    pub fn with_data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = data.into();
        self
    }

    /// Set the log index
    pub fn with_index(mut self, index: u32) -> Self {
        self.index = index;
        self
    }

    /// Key derived from the log's own address and first topic
    ///
    /// Informational only. `SubscriptionRegistry::broadcast` routes by the
    /// key its caller supplies and never compares it against this one.
    pub fn event_key(&self) -> Option<EventKey> {
        self.topics
            .first()
            .map(|topic| EventKey::new(self.address, *topic))
    }
}
