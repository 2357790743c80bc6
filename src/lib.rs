//! TTL Cache - An in-process key-value cache with expiration
//!
//! Thread-safe storage with per-entry TTL, conditional writes, integer
//! increment, eviction callbacks and a background janitor.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{Cache, CacheBuilder, CacheStats, Expiration, Item, Value};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
