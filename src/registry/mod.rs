//! Subscription registry for chain log routing
//!
//! The registry maps `(address, topic)` keys to subscriber queues and fans
//! each decoded log out to every queue registered for its key. Each
//! subscriber gets its own bounded `tokio::sync::mpsc` channel, so a slow
//! consumer only loses its own events.
//!
//! # Architecture
//!
//! ```text
//!                      Arc<SubscriptionRegistry>
//!                ┌──────────────────────────────────┐
//!                │ subscribers: HashMap<EventKey,   │
//!                │   Vec<SubscriberQueue {          │
//!                │     tx: mpsc::Sender,            │
//!                │     gate: in-flight counter,     │
//!                │   }>                             │
//!                │ >                                │
//!                │ cache: sorted key list (lazy)    │
//!                └────────────────┬─────────────────┘
//!                                 │
//!         ┌───────────────────────┼───────────────────────┐
//!         │                       │                       │
//!         ▼                       ▼                       ▼
//!    [Log poller]           [Subscription]          [Subscription]
//!    broadcast(key, ev)     recv().await            recv().await
//!         │                       ▲                       ▲
//!         └── one send task per subscriber, ≤ send_timeout ┘
//! ```
//!
//! # Closing
//!
//! Queues are only closed by the registry, after being unlinked and after
//! every send already targeting them has finished. Consumers see buffered
//! events followed by `None`.

mod cache;
pub mod config;
pub mod error;
mod gate;
pub mod queue;
pub mod store;

pub use config::RegistryConfig;
pub use error::RegistryError;
pub use queue::{Subscription, SubscriptionId};
pub use store::SubscriptionRegistry;
