//! Cache Builder Module
//!
//! Collects construction options for a `Cache`.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::{Cache, CacheStore, RemovalListener};
use crate::clock::{Clock, SystemClock};

// == Cache Builder ==
/// Builder for [`Cache`].
///
/// Defaults: wall clock, no removal listener, no capacity hint.
pub struct CacheBuilder<K, V> {
    default_timeout: Duration,
    initial_capacity: usize,
    listener: Option<RemovalListener<K, V>>,
    clock: Arc<dyn Clock>,
}

impl<K, V> CacheBuilder<K, V> {
    /// Starts a builder with the TTL applied to writes that do not override it.
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            default_timeout,
            initial_capacity: 0,
            listener: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Pre-allocates room for `capacity` entries.
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Registers a callback for entries reclaimed by clean-up sweeps.
    pub fn removal_listener<F>(mut self, listener: F) -> Self
    where
        F: Fn(K, V) + Send + Sync + 'static,
    {
        self.listener = Some(Arc::new(listener));
        self
    }

    /// Replaces the wall clock, typically with a `ManualClock` in tests.
    pub fn clock<C>(mut self, clock: C) -> Self
    where
        C: Clock + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    // == Build ==
    pub fn build(self) -> Cache<K, V> {
        debug!(
            "Creating cache: default_timeout={:?}, initial_capacity={}, listener={}",
            self.default_timeout,
            self.initial_capacity,
            self.listener.is_some()
        );

        let store = CacheStore::new(self.default_timeout, self.initial_capacity, self.clock);
        Cache::from_parts(store, self.listener)
    }
}
