//! Cache Store Module
//!
//! Entry storage with idle-timeout expiration. The store itself is not
//! synchronized; `Cache` wraps it in a single exclusive lock.

use std::borrow::Borrow;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;

use crate::cache::{CacheEntry, CacheStats};
use crate::clock::{to_time_delta, Clock};

// == Cache Store ==
/// Key-value storage with per-entry TTL.
///
/// Expired entries stay resident until `clean_up` or `delete` removes them
/// (or a write replaces them), but no read ever reports them.
pub struct CacheStore<K, V> {
    /// Key-value storage
    entries: HashMap<K, CacheEntry<V>>,
    /// Read and sweep statistics
    stats: CacheStats,
    /// TTL applied when a write passes a zero override
    default_timeout: TimeDelta,
    /// Source of the current time
    clock: Arc<dyn Clock>,
}

impl<K, V> CacheStore<K, V> {
    // == Constructor ==
    /// Creates a new CacheStore.
    ///
    /// # Arguments
    /// * `default_timeout` - TTL for writes that do not override it
    /// * `initial_capacity` - Capacity hint for the underlying map
    /// * `clock` - Time source for all expiration checks
    pub fn new(default_timeout: Duration, initial_capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::with_capacity(initial_capacity),
            stats: CacheStats::new(),
            default_timeout: to_time_delta(default_timeout),
            clock,
        }
    }

    /// Returns the override if positive, else the default timeout.
    fn effective_ttl(&self, ttl_override: Duration) -> TimeDelta {
        if ttl_override.is_zero() {
            self.default_timeout
        } else {
            to_time_delta(ttl_override)
        }
    }

    // == Length ==
    /// Returns the number of resident entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if no entry is resident.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }
}

impl<K, V> CacheStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    // == Put ==
    /// Inserts or overwrites an entry.
    ///
    /// Returns the previous value if it was still live. An expired previous
    /// entry is overwritten silently.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl_override` - TTL for this entry; zero selects the default timeout
    pub fn put(&mut self, key: K, value: V, ttl_override: Duration) -> Option<V> {
        let now = self.clock.now();
        let entry = CacheEntry::new(value, self.effective_ttl(ttl_override), now);

        self.entries
            .insert(key, entry)
            .filter(|previous| !previous.is_expired(now))
            .map(|previous| previous.value)
    }

    // == Put If Absent ==
    /// Inserts an entry unless a live one already exists.
    ///
    /// Returns the existing live value without touching it, or None after
    /// inserting.
    pub fn put_if_absent(&mut self, key: K, value: V, ttl_override: Duration) -> Option<V> {
        let now = self.clock.now();
        let ttl = self.effective_ttl(ttl_override);

        match self.entries.entry(key) {
            Entry::Occupied(occupied) if !occupied.get().is_expired(now) => {
                Some(occupied.get().value.clone())
            }
            Entry::Occupied(mut occupied) => {
                occupied.insert(CacheEntry::new(value, ttl, now));
                None
            }
            Entry::Vacant(vacant) => {
                vacant.insert(CacheEntry::new(value, ttl, now));
                None
            }
        }
    }

    // == Replace ==
    /// Overwrites a live entry, returning its old value.
    ///
    /// Absent and expired keys are left untouched and None is returned.
    pub fn replace(&mut self, key: K, value: V, ttl_override: Duration) -> Option<V> {
        let now = self.clock.now();
        let ttl = self.effective_ttl(ttl_override);

        match self.entries.get_mut(&key) {
            Some(entry) if !entry.is_expired(now) => {
                let previous = std::mem::replace(entry, CacheEntry::new(value, ttl, now));
                Some(previous.value)
            }
            _ => None,
        }
    }

    // == Get ==
    /// Retrieves a live value and restarts its idle timer.
    ///
    /// Expired entries are reported as absent but left in place for the
    /// next sweep.
    pub fn get<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();

        match self.entries.get_mut(key) {
            Some(entry) if !entry.is_expired(now) => {
                entry.refresh(now);
                self.stats.record_hit();
                Some(entry.value.clone())
            }
            _ => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Delete ==
    /// Removes an entry.
    ///
    /// The value is returned only if the entry was still live; an expired
    /// entry is removed all the same.
    pub fn delete<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();

        self.entries
            .remove(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value)
    }

    // == Entries ==
    /// Returns a snapshot of all live entries without refreshing them.
    pub fn entries(&self) -> HashMap<K, V> {
        let now = self.clock.now();

        self.entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired(now))
            .map(|(key, entry)| (key.clone(), entry.value.clone()))
            .collect()
    }

    // == Time To Live ==
    /// Returns how long a live entry has left, without refreshing it.
    pub fn time_to_live<Q>(&self, key: &Q) -> Option<Duration>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();
        self.entries.get(key)?.ttl_remaining(now)
    }

    // == Clean Up ==
    /// Removes all expired entries from the store.
    ///
    /// Returns the removed key/value pairs so the caller can notify a
    /// listener once the lock is released.
    pub fn clean_up(&mut self) -> Vec<(K, V)> {
        let now = self.clock.now();

        let expired_keys: Vec<K> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        let removed: Vec<(K, V)> = expired_keys
            .iter()
            .filter_map(|key| self.entries.remove_entry(key))
            .map(|(key, entry)| (key, entry.value))
            .collect();

        self.stats.record_expirations(removed.len());
        removed
    }
}

impl<K, V> fmt::Debug for CacheStore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("len", &self.entries.len())
            .field("stats", &self.stats)
            .field("default_timeout", &self.default_timeout)
            .finish_non_exhaustive()
    }
}
