//! Cache Store Module
//!
//! HashMap storage of items with lazy expiration checks.
//!
//! The store itself is not synchronized; the cache keeps it behind a single
//! lock and every method here runs inside that critical section.

use std::collections::hash_map::{self, HashMap};
use std::time::Instant;

use crate::cache::{Item, Value};

// == Store ==
/// Key-value storage for cache items.
#[derive(Debug, Default)]
pub struct Store {
    /// Key-value storage, may hold expired items until swept
    items: HashMap<String, Item>,
}

impl Store {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
        }
    }

    // == Get ==
    /// Looks up a live item.
    ///
    /// Returns None if the key is absent or its item is expired at `now`.
    /// Expired items are left in place for the next sweep.
    pub fn get(&self, key: &str, now: Instant) -> Option<&Item> {
        self.items.get(key).filter(|item| !item.is_expired_at(now))
    }

    /// Mutable variant of [`Store::get`].
    pub fn get_mut(&mut self, key: &str, now: Instant) -> Option<&mut Item> {
        self.items
            .get_mut(key)
            .filter(|item| !item.is_expired_at(now))
    }

    // == Set ==
    /// Inserts or overwrites unconditionally.
    pub fn set(&mut self, key: String, value: Value, expires_at: Option<Instant>) {
        self.items.insert(key, Item::new(value, expires_at));
    }

    // == Delete ==
    /// Removes a key, returning its value if one was stored.
    ///
    /// Expired but unswept items are still reported as removed.
    pub fn delete(&mut self, key: &str) -> Option<Value> {
        self.items.remove(key).map(|item| item.value)
    }

    // == Remove Expired ==
    /// Removes every item expired at `now` and returns them.
    pub fn remove_expired(&mut self, now: Instant) -> Vec<(String, Value)> {
        let expired_keys: Vec<String> = self
            .items
            .iter()
            .filter(|(_, item)| item.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        expired_keys
            .into_iter()
            .filter_map(|key| {
                let item = self.items.remove(&key)?;
                Some((key, item.value))
            })
            .collect()
    }

    // == Iterate ==
    /// Iterates over all stored items, expired ones included.
    pub fn iter(&self) -> hash_map::Iter<'_, String, Item> {
        self.items.iter()
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.items.clear();
    }

    // == Length ==
    /// Returns the number of stored items, expired ones included.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
