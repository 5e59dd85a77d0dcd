//! In-process subscription registry for decoded chain logs
//!
//! A log poller resolves each chain log into an [`EventKey`] (contract
//! address + topic) and hands it to [`SubscriptionRegistry::broadcast`]. The
//! registry fans the event out to every [`Subscription`] registered for that
//! key. Delivery is best effort: a subscriber whose bounded queue stays full
//! for the send timeout misses the event, everyone else is unaffected.
//!
//! # Example
//!
//! ```
//! use sentinel_rs::{Address, Event, EventKey, Hash, RegistryConfig, SubscriptionRegistry};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = SubscriptionRegistry::with_config(RegistryConfig::for_chain(1));
//!
//! let address: Address = "0x1234567890abcdef1234567890abcdef12345678".parse()?;
//! let topic = Hash::from_low_u64_be(0xAB);
//! let mut subscription = registry.subscribe(address, topic).await?;
//!
//! let event = Event::new(1, Hash::ZERO, address, vec![topic]);
//! registry.broadcast(&EventKey::new(address, topic), event).await;
//!
//! let received = subscription.recv().await.expect("queue is open");
//! assert_eq!(received.block_number, 1);
//!
//! registry.unsubscribe(address, topic, subscription.id()).await?;
//! assert!(subscription.recv().await.is_none());
//! # Ok(())
//! # }
//! ```

pub mod event;
pub mod registry;
pub mod stats;

pub use event::{Address, Event, EventKey, Hash, ParseHexError};
pub use registry::{
    RegistryConfig, RegistryError, Subscription, SubscriptionId, SubscriptionRegistry,
};
pub use stats::{BroadcastOutcome, RegistryStats};
