//! Integration Tests for the Cache
//!
//! Exercises the public API end to end, including the background janitor.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use expiry_cache::{Cache, CacheConfig, ManualClock};
use parking_lot::Mutex;
use tokio::sync::mpsc;

// == Helper Functions ==

const TIMEOUT: Duration = Duration::from_secs(60);
const INITIAL_SIZE: usize = 10;
const NO_OVERRIDE: Duration = Duration::ZERO;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "expiry_cache=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

fn create_test_cache() -> (Cache<String, String>, ManualClock) {
    init_tracing();
    let clock = ManualClock::default();
    let cache = Cache::builder(TIMEOUT)
        .initial_capacity(INITIAL_SIZE)
        .clock(clock.clone())
        .build();
    (cache, clock)
}

fn expire(clock: &ManualClock) {
    clock.advance(TIMEOUT + Duration::from_nanos(1));
}

fn s(value: &str) -> String {
    value.to_string()
}

// == Clean Up Tests ==

#[test]
fn test_clean_up_with_removal_listener() {
    init_tracing();
    let clock = ManualClock::default();
    let removed = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&removed);
    let cache = Cache::builder(TIMEOUT)
        .initial_capacity(INITIAL_SIZE)
        .clock(clock.clone())
        .removal_listener(move |key: String, value: String| sink.lock().push((key, value)))
        .build();

    cache.put(s("a"), s("1"), NO_OVERRIDE);
    expire(&clock);

    assert_eq!(cache.clean_up(), 1);
    assert_eq!(*removed.lock(), vec![(s("a"), s("1"))]);
    assert!(cache.is_empty());
}

#[test]
fn test_clean_up_without_removal_listener() {
    let (cache, clock) = create_test_cache();

    cache.put(s("alpha"), s("a"), NO_OVERRIDE);
    cache.put(s("bravo"), s("b"), NO_OVERRIDE);
    expire(&clock);

    assert_eq!(cache.clean_up(), 2);
    assert_eq!(cache.len(), 0);
}

#[test]
fn test_clean_up_notifies_every_removed_entry() {
    init_tracing();
    let clock = ManualClock::default();
    let removed = Arc::new(Mutex::new(HashMap::new()));
    let sink = Arc::clone(&removed);
    let cache = Cache::builder(TIMEOUT)
        .clock(clock.clone())
        .removal_listener(move |key: u32, value: u32| {
            assert!(sink.lock().insert(key, value).is_none(), "Notified twice for {}", key);
        })
        .build();

    for key in 0..50u32 {
        cache.put(key, key * 10, NO_OVERRIDE);
    }
    cache.put(1000, 0, Duration::from_secs(3600));
    expire(&clock);

    assert_eq!(cache.clean_up(), 50);
    assert_eq!(cache.clean_up(), 0);

    let removed = removed.lock();
    assert_eq!(removed.len(), 50);
    assert!((0..50u32).all(|key| removed.get(&key) == Some(&(key * 10))));
    assert_eq!(cache.get(&1000), Some(0));
    assert_eq!(cache.stats().expirations, 50);
}

// == Write Operation Tests ==

#[test]
fn test_put() {
    let (cache, _) = create_test_cache();

    assert_eq!(cache.put(s("alpha"), s("a"), NO_OVERRIDE), None);
    assert_eq!(cache.put(s("bravo"), s("b"), NO_OVERRIDE), None);
    assert_eq!(cache.put(s("alpha"), s("b"), NO_OVERRIDE), Some(s("a")));
    assert_eq!(cache.put(s("bravo"), s("a"), NO_OVERRIDE), Some(s("b")));
}

#[test]
fn test_put_if_absent() {
    let (cache, _) = create_test_cache();

    assert_eq!(cache.put(s("a"), s("1"), NO_OVERRIDE), None);
    assert_eq!(cache.put_if_absent(s("a"), s("2"), NO_OVERRIDE), Some(s("1")));
    assert_eq!(cache.get("a"), Some(s("1")));
}

#[test]
fn test_put_if_absent_on_empty_cache() {
    let (cache, _) = create_test_cache();

    assert_eq!(cache.put_if_absent(s("alpha"), s("a"), NO_OVERRIDE), None);
    assert_eq!(cache.put_if_absent(s("alpha"), s("b"), NO_OVERRIDE), Some(s("a")));
}

#[test]
fn test_replace() {
    let (cache, _) = create_test_cache();

    assert_eq!(cache.put(s("a"), s("1"), NO_OVERRIDE), None);
    assert_eq!(cache.put(s("b"), s("2"), NO_OVERRIDE), None);
    assert_eq!(cache.replace(s("a"), s("3"), NO_OVERRIDE), Some(s("1")));
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.get("a"), Some(s("3")));
}

#[test]
fn test_replace_on_empty_cache() {
    let (cache, _) = create_test_cache();

    assert_eq!(cache.replace(s("a"), s("1"), NO_OVERRIDE), None);
    assert_eq!(cache.len(), 0);
}

#[test]
fn test_replace_refreshes_ttl() {
    let (cache, clock) = create_test_cache();

    cache.put(s("alpha"), s("a"), Duration::from_secs(1));
    cache.replace(s("alpha"), s("b"), NO_OVERRIDE);
    clock.advance(Duration::from_secs(30));

    assert_eq!(cache.get("alpha"), Some(s("b")));
}

// == Read Operation Tests ==

#[test]
fn test_get_unknown_key() {
    let (cache, _) = create_test_cache();
    assert_eq!(cache.get("alpha"), None);
}

#[test]
fn test_get_updates_last_access_time() {
    let (cache, clock) = create_test_cache();
    cache.put(s("alpha"), s("a"), NO_OVERRIDE);

    clock.advance(TIMEOUT / 2);
    assert_eq!(cache.get("alpha"), Some(s("a")));
    clock.advance(TIMEOUT / 2);
    assert_eq!(cache.get("alpha"), Some(s("a")));
}

#[test]
fn test_get_expired_value() {
    let (cache, clock) = create_test_cache();

    cache.put(s("alpha"), s("a"), NO_OVERRIDE);
    assert_eq!(cache.get("alpha"), Some(s("a")));

    expire(&clock);
    assert_eq!(cache.get("alpha"), None);
}

#[test]
fn test_entries() {
    let (cache, clock) = create_test_cache();

    cache.put(s("a"), s("1"), NO_OVERRIDE);
    expire(&clock);
    cache.put(s("b"), s("2"), NO_OVERRIDE);

    let entries = cache.entries();
    assert_eq!(entries, HashMap::from([(s("b"), s("2"))]));
}

#[test]
fn test_size_counts_expired_entries() {
    let (cache, clock) = create_test_cache();

    cache.put(s("alpha"), s("a"), NO_OVERRIDE);
    expire(&clock);
    cache.put(s("bravo"), s("b"), NO_OVERRIDE);

    assert_eq!(cache.len(), 2);
    assert_eq!(cache.entries().len(), 1);
}

// == Delete Tests ==

#[test]
fn test_delete_non_existent_key() {
    let (cache, _) = create_test_cache();
    assert_eq!(cache.delete("alpha"), None);
}

#[test]
fn test_delete_existing_key() {
    let (cache, _) = create_test_cache();

    cache.put(s("alpha"), s("a"), NO_OVERRIDE);
    assert_eq!(cache.delete("alpha"), Some(s("a")));
    assert_eq!(cache.get("alpha"), None);
}

#[test]
fn test_delete_expired_key() {
    let (cache, clock) = create_test_cache();

    cache.put(s("alpha"), s("a"), NO_OVERRIDE);
    expire(&clock);

    assert_eq!(cache.delete("alpha"), None);
    assert_eq!(cache.len(), 0);
}

// == Concurrency Tests ==

#[test]
fn test_concurrent_writers_and_sweeps() {
    let (cache, clock) = create_test_cache();
    let cache = Arc::new(cache);

    let writers: Vec<_> = (0..4)
        .map(|worker| {
            let cache = Arc::clone(&cache);
            std::thread::spawn(move || {
                for i in 0..250 {
                    let key = format!("{}-{}", worker, i);
                    cache.put(key.clone(), s("v"), NO_OVERRIDE);
                    assert_eq!(cache.get(&key), Some(s("v")));
                    cache.clean_up();
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    assert_eq!(cache.len(), 1000);
    expire(&clock);
    assert_eq!(cache.clean_up(), 1000);
}

// == Janitor Tests ==

#[tokio::test]
async fn test_janitor() {
    init_tracing();
    let clock = ManualClock::default();
    let (key_tx, mut key_rx) = mpsc::unbounded_channel();
    let cache = Cache::builder(TIMEOUT)
        .initial_capacity(INITIAL_SIZE)
        .clock(clock.clone())
        .removal_listener(move |key: String, _value: String| {
            let _ = key_tx.send(key);
        })
        .build();

    cache.put(s("alpha"), s("a"), NO_OVERRIDE);
    expire(&clock);
    cache.start_janitor(Duration::from_millis(1)).await.unwrap();

    let key = tokio::time::timeout(Duration::from_secs(5), key_rx.recv())
        .await
        .expect("Janitor should sweep within the timeout");
    cache.stop_janitor().await;

    assert_eq!(key, Some(s("alpha")));
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_janitor_stop_halts_sweeps() {
    let (cache, clock) = create_test_cache();

    cache.start_janitor(Duration::from_millis(1)).await.unwrap();
    cache.put(s("alpha"), s("a"), NO_OVERRIDE);
    expire(&clock);

    tokio::time::timeout(Duration::from_secs(5), async {
        while !cache.is_empty() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("Janitor should reclaim the expired entry");

    cache.stop_janitor().await;
    cache.stop_janitor().await;
    assert!(!cache.is_janitor_running().await);

    cache.put(s("bravo"), s("b"), NO_OVERRIDE);
    expire(&clock);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(cache.len(), 1, "No sweep may run after stop returns");
}

#[tokio::test]
async fn test_janitor_from_config() {
    let config = CacheConfig {
        janitor_interval: Some(Duration::from_millis(1)),
        ..CacheConfig::default()
    };

    let clock = ManualClock::default();
    let cache: Cache<String, String> = Cache::from_config(&config)
        .unwrap()
        .clock(clock.clone())
        .build();
    assert!(cache.start_configured_janitor(&config).await.unwrap());

    cache.put(s("alpha"), s("a"), NO_OVERRIDE);
    clock.advance(config.default_timeout + Duration::from_nanos(1));

    tokio::time::timeout(Duration::from_secs(5), async {
        while !cache.is_empty() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("Janitor should reclaim the expired entry");

    cache.stop_janitor().await;
}
