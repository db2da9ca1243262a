//! Cache Handle Module
//!
//! The public cache: a locked `CacheStore`, an optional removal listener and
//! an optional janitor.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Mutex as AsyncMutex;

use crate::cache::listener::notify_removals;
use crate::cache::{CacheBuilder, CacheStats, CacheStore, RemovalListener};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::tasks::Janitor;

/// State shared between the cache and its janitor task.
struct Shared<K, V> {
    store: Mutex<CacheStore<K, V>>,
    listener: Option<RemovalListener<K, V>>,
}

impl<K, V> Shared<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn clean_up(&self) -> usize {
        let removed = self.store.lock().clean_up();
        let count = removed.len();
        // Lock is released; the listener may call back into the cache.
        notify_removals(self.listener.as_ref(), removed);
        count
    }
}

// == Cache ==
/// In-memory key-value cache with idle-timeout expiration.
///
/// Every operation takes the same exclusive lock. Reads refresh an entry's
/// idle timer, so there is no shared read path.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use expiry_cache::Cache;
///
/// let cache: Cache<String, u32> = Cache::new(Duration::from_secs(60));
/// assert_eq!(cache.put("answer".to_string(), 42, Duration::ZERO), None);
/// assert_eq!(cache.get("answer"), Some(42));
/// ```
pub struct Cache<K, V> {
    shared: Arc<Shared<K, V>>,
    janitor: AsyncMutex<Option<Janitor>>,
}

impl<K, V> Cache<K, V> {
    /// Creates a cache using the wall clock and no removal listener.
    pub fn new(default_timeout: Duration) -> Self {
        CacheBuilder::new(default_timeout).build()
    }

    /// Starts configuring a cache.
    pub fn builder(default_timeout: Duration) -> CacheBuilder<K, V> {
        CacheBuilder::new(default_timeout)
    }

    /// Starts configuring a cache from loaded settings.
    ///
    /// The janitor interval is applied separately by
    /// `start_configured_janitor`, since starting it needs a runtime.
    pub fn from_config(config: &CacheConfig) -> Result<CacheBuilder<K, V>> {
        config.validate()?;
        Ok(CacheBuilder::new(config.default_timeout).initial_capacity(config.initial_capacity))
    }

    pub(crate) fn from_parts(store: CacheStore<K, V>, listener: Option<RemovalListener<K, V>>) -> Self {
        Self {
            shared: Arc::new(Shared {
                store: Mutex::new(store),
                listener,
            }),
            janitor: AsyncMutex::new(None),
        }
    }

    /// Returns the number of resident entries, including expired entries
    /// that have not been swept yet.
    pub fn len(&self) -> usize {
        self.shared.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.store.lock().is_empty()
    }

    /// Returns hit, miss and expiration counters.
    pub fn stats(&self) -> CacheStats {
        self.shared.store.lock().stats()
    }

    /// Stops the janitor and waits for it to exit.
    ///
    /// A no-op when no janitor is running, so it is safe to call before
    /// `start_janitor` or more than once.
    pub async fn stop_janitor(&self) {
        let mut slot = self.janitor.lock().await;
        if let Some(janitor) = slot.take() {
            janitor.stop().await;
        }
    }

    /// Returns true while a janitor is scheduled and its task is alive.
    pub async fn is_janitor_running(&self) -> bool {
        self.janitor
            .lock()
            .await
            .as_ref()
            .is_some_and(|janitor| !janitor.is_finished())
    }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Inserts or overwrites an entry, returning the previous live value.
    ///
    /// A zero `ttl_override` applies the default timeout.
    pub fn put(&self, key: K, value: V, ttl_override: Duration) -> Option<V> {
        self.shared.store.lock().put(key, value, ttl_override)
    }

    /// Inserts an entry unless a live one exists, in which case its value is
    /// returned and nothing changes.
    pub fn put_if_absent(&self, key: K, value: V, ttl_override: Duration) -> Option<V> {
        self.shared.store.lock().put_if_absent(key, value, ttl_override)
    }

    /// Overwrites a live entry and returns its old value. Does nothing for
    /// absent or expired keys.
    pub fn replace(&self, key: K, value: V, ttl_override: Duration) -> Option<V> {
        self.shared.store.lock().replace(key, value, ttl_override)
    }

    /// Returns a live value and restarts its idle timer.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shared.store.lock().get(key)
    }

    /// Removes an entry, returning its value only if it was still live.
    ///
    /// The removal listener is not notified.
    pub fn delete<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shared.store.lock().delete(key)
    }

    /// Returns a snapshot of the live entries.
    pub fn entries(&self) -> HashMap<K, V> {
        self.shared.store.lock().entries()
    }

    /// Returns how long a live entry has left before it expires.
    pub fn time_to_live<Q>(&self, key: &Q) -> Option<Duration>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shared.store.lock().time_to_live(key)
    }

    /// Removes every expired entry and returns how many were removed.
    ///
    /// The removal listener is called for each of them after the lock is
    /// released.
    pub fn clean_up(&self) -> usize {
        self.shared.clean_up()
    }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    /// Starts sweeping expired entries every `interval`.
    ///
    /// A janitor that is already running is stopped first and replaced.
    /// Must be called from within a tokio runtime.
    pub async fn start_janitor(&self, interval: Duration) -> Result<()> {
        // Reject a bad interval before touching the running janitor.
        Janitor::first_sweep_at(interval)?;

        let mut slot = self.janitor.lock().await;
        if let Some(previous) = slot.take() {
            previous.stop().await;
        }

        let shared = Arc::clone(&self.shared);
        *slot = Some(Janitor::start(interval, move || shared.clean_up())?);
        Ok(())
    }

    /// Starts the janitor at the configured interval.
    ///
    /// Returns false without starting anything when the configuration
    /// disables the janitor.
    pub async fn start_configured_janitor(&self, config: &CacheConfig) -> Result<bool> {
        config.validate()?;
        match config.janitor_interval {
            Some(interval) => {
                self.start_janitor(interval).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
