//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::Expiration;

/// Default entry lifetime in seconds.
const DEFAULT_TTL_SECS: u64 = 600;
/// Default janitor interval in seconds.
const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 30;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Default TTL in seconds for entries set with `Expiration::Default` (0 = never expire)
    pub default_ttl_secs: u64,
    /// Background cleanup interval in seconds (0 = no janitor)
    pub cleanup_interval_secs: u64,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds (default: 600)
    /// - `CACHE_CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 30)
    pub fn from_env() -> Self {
        Self {
            default_ttl_secs: env::var("CACHE_DEFAULT_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TTL_SECS),
            cleanup_interval_secs: env::var("CACHE_CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CLEANUP_INTERVAL_SECS),
        }
    }

    /// Default expiration applied to entries stored with `Expiration::Default`.
    pub fn default_expiration(&self) -> Expiration {
        match self.default_ttl_secs {
            0 => Expiration::Never,
            secs => Expiration::After(Duration::from_secs(secs)),
        }
    }

    /// Interval between janitor sweeps; zero disables the janitor.
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: DEFAULT_TTL_SECS,
            cleanup_interval_secs: DEFAULT_CLEANUP_INTERVAL_SECS,
        }
    }
}
