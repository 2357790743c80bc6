//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache against a plain HashMap model.

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{Cache, Expiration, Value};
use crate::error::CacheError;

// == Strategies ==
/// Small key space so operations collide often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-d]{1,2}".prop_map(|s| s)
}

fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::Int),
        "[a-z ]{0,16}".prop_map(Value::Text),
        prop::collection::vec(any::<u8>(), 0..8).prop_map(Value::Bytes),
    ]
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: Value },
    Add { key: String, value: Value },
    Replace { key: String, value: Value },
    Increment { key: String, by: i64 },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Add { key, value }),
        (key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Replace { key, value }),
        (key_strategy(), -100_i64..100).prop_map(|(key, by)| CacheOp::Increment { key, by }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

fn counting_cache() -> (Cache, Arc<AtomicUsize>) {
    let evictions = Arc::new(AtomicUsize::new(0));
    let counter = evictions.clone();
    let cache = Cache::builder()
        .default_expiration(Expiration::After(Duration::from_secs(3600)))
        .on_evicted(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .build();
    (cache, evictions)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Without expiry in play, every operation agrees with a HashMap model and
    // the callback fires once per delete of a present key.
    #[test]
    fn prop_matches_model(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let (cache, evictions) = counting_cache();
        let mut model: HashMap<String, Value> = HashMap::new();
        let mut expected_evictions = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    cache.set(key.clone(), value.clone(), Expiration::Default);
                    model.insert(key, value);
                }
                CacheOp::Add { key, value } => {
                    let result = cache.add(key.clone(), value.clone(), Expiration::Default);
                    if model.contains_key(&key) {
                        prop_assert_eq!(result, Err(CacheError::KeyExists(key)));
                    } else {
                        prop_assert_eq!(result, Ok(()));
                        model.insert(key, value);
                    }
                }
                CacheOp::Replace { key, value } => {
                    let result = cache.replace(key.clone(), value.clone(), Expiration::Default);
                    if model.contains_key(&key) {
                        prop_assert_eq!(result, Ok(()));
                        model.insert(key, value);
                    } else {
                        prop_assert_eq!(result, Err(CacheError::KeyNotFound(key)));
                    }
                }
                CacheOp::Increment { key, by } => {
                    let result = cache.increment(&key, by);
                    match model.get_mut(&key) {
                        Some(Value::Int(current)) => {
                            *current = current.wrapping_add(by);
                            prop_assert_eq!(result, Ok(*current));
                        }
                        Some(other) => {
                            let is_unsupported = matches!(
                                result,
                                Err(CacheError::UnsupportedType { kind, .. }) if kind == other.kind()
                            );
                            prop_assert!(is_unsupported);
                        }
                        None => prop_assert_eq!(result, Err(CacheError::KeyNotFound(key))),
                    }
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(cache.get(&key), model.get(&key).cloned());
                }
                CacheOp::Delete { key } => {
                    cache.delete(&key);
                    if model.remove(&key).is_some() {
                        expected_evictions += 1;
                    }
                }
            }
        }

        prop_assert_eq!(cache.item_count(), model.len());
        prop_assert_eq!(evictions.load(Ordering::SeqCst), expected_evictions);
        prop_assert_eq!(cache.stats().evictions, expected_evictions as u64);
    }

    // Sweeping a cache with nothing expired changes nothing.
    #[test]
    fn prop_sweep_without_expired_is_noop(
        entries in prop::collection::hash_map(key_strategy(), value_strategy(), 0..10)
    ) {
        let (cache, evictions) = counting_cache();
        for (key, value) in &entries {
            cache.set(key.clone(), value.clone(), Expiration::Default);
        }

        prop_assert_eq!(cache.delete_expired(), 0);
        prop_assert_eq!(cache.item_count(), entries.len());
        prop_assert_eq!(evictions.load(Ordering::SeqCst), 0);
    }

    // Flush empties the cache and never notifies.
    #[test]
    fn prop_flush_never_notifies(
        entries in prop::collection::hash_map(key_strategy(), value_strategy(), 0..10)
    ) {
        let (cache, evictions) = counting_cache();
        for (key, value) in entries {
            cache.set(key, value, Expiration::Never);
        }

        cache.flush();

        prop_assert_eq!(cache.item_count(), 0);
        prop_assert_eq!(evictions.load(Ordering::SeqCst), 0);
    }
}
