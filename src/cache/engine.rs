//! Cache Engine Module
//!
//! Public cache built on top of the store: expiration resolution, conditional
//! writes, increment, sweeps and eviction callbacks.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::{debug, error, trace};

use crate::cache::stats::StatsCounters;
use crate::cache::{CacheStats, Expiration, Item, Store, Value};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::{Janitor, Sweeper};

/// Callback invoked with the key and last value of a deleted or swept entry.
pub type EvictionCallback = Arc<dyn Fn(&str, &Value) + Send + Sync>;

// == Cache Core ==
/// State shared between the cache handle and its janitor.
struct CacheCore {
    default_ttl: Option<Duration>,
    store: RwLock<Store>,
    on_evicted: Option<EvictionCallback>,
    stats: StatsCounters,
}

impl CacheCore {
    /// Removes every expired entry, then notifies the callback once per
    /// removed entry with the lock released.
    fn delete_expired(&self) -> usize {
        let now = Instant::now();
        let removed = self.store.write().remove_expired(now);
        self.stats.record_expired(removed.len());

        if let Some(on_evicted) = &self.on_evicted {
            trace!("Dispatching {} eviction callbacks", removed.len());
            for (key, value) in &removed {
                on_evicted(key, value);
            }
        }
        removed.len()
    }
}

impl Sweeper for CacheCore {
    fn sweep(&self) -> usize {
        self.delete_expired()
    }
}

// == Cache ==
/// Thread-safe key-value cache with per-entry expiration.
///
/// Share it between threads with `Arc<Cache>`. When the last owner drops it,
/// its janitor (if any) is stopped.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use ttl_cache::{Cache, Expiration, Value};
///
/// let cache = Cache::new(Expiration::After(Duration::from_secs(600)), Duration::ZERO);
/// cache.set("num", 10, Expiration::Default);
/// assert_eq!(cache.increment("num", 1).unwrap(), 11);
/// assert_eq!(cache.get("num"), Some(Value::Int(11)));
/// ```
pub struct Cache {
    // Declared first so the janitor stops before the core is released
    janitor: Option<Janitor>,
    core: Arc<CacheCore>,
}

impl Cache {
    // == Constructors ==
    /// Creates a cache with a default expiration and a cleanup interval.
    ///
    /// `default_expiration` applies to entries stored with
    /// `Expiration::Default`; `Never` or `Default` here means such entries
    /// never expire. A zero `cleanup_interval` disables background sweeping.
    pub fn new(default_expiration: Expiration, cleanup_interval: Duration) -> Self {
        Self::builder()
            .default_expiration(default_expiration)
            .cleanup_interval(cleanup_interval)
            .build()
    }

    /// Creates a cache from loaded configuration.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.default_expiration(), config.cleanup_interval())
    }

    pub fn builder() -> CacheBuilder {
        CacheBuilder::default()
    }

    fn deadline(&self, expiration: Expiration, now: Instant) -> Option<Instant> {
        expiration.deadline(self.core.default_ttl, now)
    }

    // == Set ==
    /// Stores a value, replacing any existing entry.
    pub fn set(
        &self,
        key: impl Into<String>,
        value: impl Into<Value>,
        expiration: impl Into<Expiration>,
    ) {
        let expires_at = self.deadline(expiration.into(), Instant::now());
        self.core
            .store
            .write()
            .set(key.into(), value.into(), expires_at);
    }

    // == Add ==
    /// Stores a value only if the key is absent or its entry has expired.
    ///
    /// # Errors
    /// `CacheError::KeyExists` if a live entry already occupies the key.
    pub fn add(
        &self,
        key: impl Into<String>,
        value: impl Into<Value>,
        expiration: impl Into<Expiration>,
    ) -> Result<()> {
        let key = key.into();
        let mut store = self.core.store.write();
        let now = Instant::now();

        if store.get(&key, now).is_some() {
            return Err(CacheError::KeyExists(key));
        }
        store.set(key, value.into(), self.deadline(expiration.into(), now));
        Ok(())
    }

    // == Replace ==
    /// Overwrites a value only if the key holds a live entry.
    ///
    /// The expiration is recomputed from `expiration`.
    ///
    /// # Errors
    /// `CacheError::KeyNotFound` if the key is absent or expired.
    pub fn replace(
        &self,
        key: impl Into<String>,
        value: impl Into<Value>,
        expiration: impl Into<Expiration>,
    ) -> Result<()> {
        let key = key.into();
        let mut store = self.core.store.write();
        let now = Instant::now();

        if store.get(&key, now).is_none() {
            return Err(CacheError::KeyNotFound(key));
        }
        store.set(key, value.into(), self.deadline(expiration.into(), now));
        Ok(())
    }

    // == Get ==
    /// Returns the value if the key holds a live entry.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.get_with_expiration(key).map(|(value, _)| value)
    }

    /// Returns the value and its expiration instant (None = never expires).
    pub fn get_with_expiration(&self, key: &str) -> Option<(Value, Option<Instant>)> {
        let found = self
            .core
            .store
            .read()
            .get(key, Instant::now())
            .map(|item| (item.value.clone(), item.expires_at));

        self.core.stats.record_lookup(found.is_some());
        found
    }

    // == Increment ==
    /// Adds `n` to an integer entry and returns the new value.
    ///
    /// The expiration is left unchanged. Overflow wraps.
    ///
    /// # Errors
    /// - `CacheError::KeyNotFound` if the key is absent or expired
    /// - `CacheError::UnsupportedType` if the value is not `Value::Int`
    pub fn increment(&self, key: &str, n: i64) -> Result<i64> {
        let mut store = self.core.store.write();
        let item = store
            .get_mut(key, Instant::now())
            .ok_or_else(|| CacheError::KeyNotFound(key.to_string()))?;

        match &mut item.value {
            Value::Int(current) => {
                *current = current.wrapping_add(n);
                Ok(*current)
            }
            other => Err(CacheError::UnsupportedType {
                key: key.to_string(),
                kind: other.kind(),
            }),
        }
    }

    // == Delete ==
    /// Removes a key. Does nothing if the key is not in the cache.
    ///
    /// If an entry was removed, the eviction callback runs on this thread
    /// after the lock is released, so it may call back into the cache.
    pub fn delete(&self, key: &str) {
        let removed = self.core.store.write().delete(key);

        if let Some(value) = removed {
            self.core.stats.record_eviction();
            if let Some(on_evicted) = &self.core.on_evicted {
                on_evicted(key, &value);
            }
        }
    }

    // == Delete Expired ==
    /// Removes all expired entries and returns how many were removed.
    ///
    /// All removals happen under one lock with one timestamp; callbacks fire
    /// afterwards, once per removed entry.
    pub fn delete_expired(&self) -> usize {
        self.core.delete_expired()
    }

    // == Items ==
    /// Returns a copy of all stored entries, including expired ones not yet
    /// swept. Check [`Item::is_expired`] to skip stale entries.
    pub fn items(&self) -> HashMap<String, Item> {
        self.core
            .store
            .read()
            .iter()
            .map(|(key, item)| (key.clone(), item.clone()))
            .collect()
    }

    // == Item Count ==
    /// Returns the number of stored entries, including expired ones not yet swept.
    pub fn item_count(&self) -> usize {
        self.core.store.read().len()
    }

    // == Flush ==
    /// Removes all entries without invoking the eviction callback.
    pub fn flush(&self) {
        self.core.store.write().clear();
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        self.core.stats.snapshot(self.item_count())
    }

    /// Default lifetime for entries stored with `Expiration::Default`.
    pub fn default_expiration(&self) -> Option<Duration> {
        self.core.default_ttl
    }

    /// Whether a janitor was started for this cache.
    pub fn has_janitor(&self) -> bool {
        self.janitor.is_some()
    }
}

impl fmt::Debug for Cache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("default_ttl", &self.core.default_ttl)
            .field("item_count", &self.item_count())
            .field("janitor", &self.janitor)
            .finish()
    }
}

// == Cache Builder ==
/// Builder for [`Cache`], the only way to attach an eviction callback.
pub struct CacheBuilder {
    default_expiration: Expiration,
    cleanup_interval: Duration,
    on_evicted: Option<EvictionCallback>,
}

impl Default for CacheBuilder {
    fn default() -> Self {
        Self {
            default_expiration: Expiration::Never,
            cleanup_interval: Duration::ZERO,
            on_evicted: None,
        }
    }
}

impl CacheBuilder {
    pub fn default_expiration(mut self, expiration: Expiration) -> Self {
        self.default_expiration = expiration;
        self
    }

    /// Zero disables the janitor.
    pub fn cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Sets the callback run when an entry is removed by `delete` or
    /// `delete_expired`. It is not run on `flush` or overwrite.
    pub fn on_evicted<F>(mut self, on_evicted: F) -> Self
    where
        F: Fn(&str, &Value) + Send + Sync + 'static,
    {
        self.on_evicted = Some(Arc::new(on_evicted));
        self
    }

    pub fn build(self) -> Cache {
        let core = Arc::new(CacheCore {
            default_ttl: self.default_expiration.as_default_ttl(),
            store: RwLock::new(Store::new()),
            on_evicted: self.on_evicted,
            stats: StatsCounters::default(),
        });

        let janitor = if self.cleanup_interval.is_zero() {
            None
        } else {
            match Janitor::start(Arc::downgrade(&core), self.cleanup_interval) {
                Ok(janitor) => Some(janitor),
                Err(err) => {
                    error!("Failed to start janitor, expired entries will not be swept: {}", err);
                    None
                }
            }
        };

        debug!(
            "Cache created: default_ttl={:?}, cleanup_interval={:?}",
            core.default_ttl, self.cleanup_interval
        );

        Cache { janitor, core }
    }
}
