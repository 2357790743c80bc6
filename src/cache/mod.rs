//! Cache Module
//!
//! Provides in-memory caching with per-entry TTL, lazy expiration and
//! periodic sweeping.

mod engine;
mod entry;
mod stats;
mod store;
mod value;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use engine::{Cache, CacheBuilder, EvictionCallback};
pub use entry::{Expiration, Item};
pub use stats::CacheStats;
pub use store::Store;
pub use value::Value;
