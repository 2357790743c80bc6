//! TTL Cache demo
//!
//! Walks through the basic cache operations with logging enabled.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ttl_cache::{Cache, CacheConfig, Expiration};

/// Entry point for the demo.
///
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache (with janitor if an interval is configured)
/// 4. Run set/get/increment/replace/delete and print stats
fn main() -> Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ttl_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CacheConfig::from_env();
    info!(
        "Configuration loaded: default_ttl={}s, cleanup_interval={}s",
        config.default_ttl_secs, config.cleanup_interval_secs
    );

    let cache = Cache::builder()
        .default_expiration(config.default_expiration())
        .cleanup_interval(config.cleanup_interval())
        .on_evicted(|key, value| info!("Evicted {} = {:?}", key, value))
        .build();

    cache.set("foo", "bar", Expiration::Default);
    if let Some(foo) = cache.get("foo") {
        info!("foo = {:?}", foo);
    }

    cache.set("num", 10, Expiration::Default);
    let num = cache.increment("num", 1)?;
    info!("num = {}", num);

    cache.replace("foo", "change", Expiration::Default)?;
    if let Some(foo) = cache.get("foo") {
        info!("foo = {:?}", foo);
    }

    cache.set("test", "hehe", Expiration::Default);
    info!("item count = {}", cache.item_count());

    cache.delete("foo");
    if cache.get("foo").is_none() {
        info!("foo deleted");
    }

    info!("stats: {}", serde_json::to_string(&cache.stats())?);
    Ok(())
}
