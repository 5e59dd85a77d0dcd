//! Registry statistics

pub mod metrics;

pub use metrics::{BroadcastOutcome, RegistryStats};
