//! Chain event types
//!
//! This module provides:
//! - Fixed-size identifiers (`Address`, `Hash`) with hex parsing
//! - The `EventKey` routing pair
//! - The `Event` log payload fanned out to subscribers

pub mod key;
pub mod log;

pub use key::{Address, EventKey, Hash, ParseHexError};
pub use log::Event;
