//! Registry error types
//!
//! Error types for subscription management. Broadcast delivery failures are
//! not errors: they are logged and counted as drops.

use crate::event::EventKey;

use super::queue::SubscriptionId;

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Subscribe called with a zero address or topic
    InvalidArgument(&'static str),
    /// No subscriber list exists for the key
    NotFoundEventKey(EventKey),
    /// The subscription is not registered under the key
    NotFoundSubscriber(EventKey, SubscriptionId),
    /// The registry has been closed
    Closed,
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::InvalidArgument(reason) => write!(f, "Invalid argument: {}", reason),
            RegistryError::NotFoundEventKey(key) => write!(f, "Event key not found: {}", key),
            RegistryError::NotFoundSubscriber(key, id) => {
                write!(f, "Subscriber {} not found for event key: {}", id, key)
            }
            RegistryError::Closed => write!(f, "Registry is closed"),
        }
    }
}

impl std::error::Error for RegistryError {}
