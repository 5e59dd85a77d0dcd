//! Subscriber queue types
//!
//! Each subscription is a bounded mpsc channel. The consumer owns the
//! receiving half through [`Subscription`]; the registry owns the only
//! sender through `SubscriberQueue` and is the only party that closes it.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc::{self, error::SendTimeoutError, error::TryRecvError};

use crate::event::{Event, EventKey};

use super::gate::SendGate;

/// Unique identifier for a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw numeric value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Result of a single enqueue attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Delivery {
    /// Event accepted by the queue
    Sent,
    /// Queue stayed full for the whole send timeout
    TimedOut,
    /// Consumer dropped its `Subscription` without unsubscribing
    ReceiverDropped,
    /// Queue is being closed; no send was attempted
    Closed,
}

/// Registry-side half of a subscription
#[derive(Debug)]
pub(crate) struct SubscriberQueue {
    id: SubscriptionId,
    /// `None` once closed
    tx: Mutex<Option<mpsc::Sender<Event>>>,
    gate: SendGate,
}

impl SubscriberQueue {
    /// Create a queue and the consumer handle reading from it
    pub(crate) fn channel(
        id: SubscriptionId,
        key: EventKey,
        capacity: usize,
    ) -> (Self, Subscription) {
        // mpsc panics on a zero-sized buffer
        let (tx, rx) = mpsc::channel(capacity.max(1));

        let queue = Self {
            id,
            tx: Mutex::new(Some(tx)),
            gate: SendGate::new(),
        };

        (queue, Subscription { id, key, rx })
    }

    pub(crate) fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Number of sends currently in flight for this queue
    pub(crate) fn in_flight(&self) -> usize {
        self.gate.in_flight()
    }

    /// Attempt to enqueue, waiting at most `timeout` for space
    pub(crate) async fn deliver(&self, event: Event, timeout: Duration) -> Delivery {
        let Some(_permit) = self.gate.enter() else {
            return Delivery::Closed;
        };
        // Declared after the permit so the clone is dropped before the permit is released
        let Some(tx) = self.sender() else {
            return Delivery::Closed;
        };

        match tx.send_timeout(event, timeout).await {
            Ok(()) => Delivery::Sent,
            Err(SendTimeoutError::Timeout(_)) => Delivery::TimedOut,
            Err(SendTimeoutError::Closed(_)) => Delivery::ReceiverDropped,
        }
    }

    /// Wait for in-flight sends to finish, then close the queue.
    ///
    /// Returns `true` only for the call that actually closed it.
    pub(crate) async fn close(&self) -> bool {
        self.gate.shut().await;
        self.lock_tx().take().is_some()
    }

    fn sender(&self) -> Option<mpsc::Sender<Event>> {
        self.lock_tx().clone()
    }

    fn lock_tx(&self) -> MutexGuard<'_, Option<mpsc::Sender<Event>>> {
        // The critical sections never panic, so a poisoned lock still holds valid state
        self.tx.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Consumer-side handle for a subscription
///
/// Events arrive in the order they were accepted. Once the registry closes
/// the queue (via `unsubscribe` or `close`), `recv` drains whatever is still
/// buffered and then returns `None`.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    key: EventKey,
    rx: mpsc::Receiver<Event>,
}

impl Subscription {
    /// Identifier to pass to `SubscriptionRegistry::unsubscribe`
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Key this subscription was registered under
    pub fn key(&self) -> EventKey {
        self.key
    }

    /// Receive the next event, or `None` once the queue is closed and empty
    pub async fn recv(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Receive without waiting
    pub fn try_recv(&mut self) -> Result<Event, TryRecvError> {
        self.rx.try_recv()
    }

    /// Whether the registry has closed this queue
    pub fn is_closed(&self) -> bool {
        self.rx.is_closed()
    }

    /// Number of buffered events
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Whether no events are buffered
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
