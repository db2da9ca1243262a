//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with idle-timeout support.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

// == Cache Entry ==
/// Represents a single cache entry with value and expiration bookkeeping.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Last time the entry was written or successfully read
    pub last_refreshed: DateTime<Utc>,
    /// Effective time-to-live, measured from `last_refreshed`
    pub ttl: TimeDelta,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry refreshed at `now`.
    pub fn new(value: V, ttl: TimeDelta, now: DateTime<Utc>) -> Self {
        Self {
            value,
            last_refreshed: now,
            ttl,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// Boundary condition: the comparison is strict. An entry whose idle time
    /// equals its TTL exactly is still live; it expires one tick later.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.last_refreshed > self.ttl
    }

    // == Refresh ==
    /// Restarts the idle timer.
    pub fn refresh(&mut self, now: DateTime<Utc>) {
        self.last_refreshed = now;
    }

    // == Time To Live ==
    /// Returns the time left before the entry expires, or None if it already has.
    pub fn ttl_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        if self.is_expired(now) {
            return None;
        }
        // A clock that moved backwards leaves more than `ttl` remaining,
        // saturating for the longest TTLs.
        let remaining = self
            .ttl
            .checked_sub(&(now - self.last_refreshed))
            .unwrap_or(TimeDelta::MAX);
        remaining.to_std().ok()
    }
}
