//! Cache Statistics Module
//!
//! Counts lookups by outcome and entries reclaimed by clean-up sweeps.

use serde::Serialize;

// == Cache Stats ==
/// Snapshot of cache activity since construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups that returned a live value
    pub hits: u64,
    /// Lookups on unknown or expired keys
    pub misses: u64,
    /// Entries removed by `clean_up`, whether run by hand or by the janitor
    pub expirations: u64,
    /// Resident entries at snapshot time, expired ones included
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a CacheStats with every counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Lookups ==
    /// Total number of lookups, successful or not.
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    // == Hit Rate ==
    /// Fraction of lookups that found a live value, 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            lookups => self.hits as f64 / lookups as f64,
        }
    }

    // == Record Hit ==
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Expirations ==
    /// Adds one sweep's worth of reclaimed entries.
    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    // == Update Entry Count ==
    /// Sets the resident entry count reported by the snapshot.
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_start_at_zero() {
        assert_eq!(
            CacheStats::new(),
            CacheStats {
                hits: 0,
                misses: 0,
                expirations: 0,
                total_entries: 0,
            }
        );
    }

    #[test]
    fn test_hit_rate_before_any_lookup() {
        let stats = CacheStats::new();
        assert_eq!(stats.lookups(), 0);
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_counts_both_outcomes() {
        let mut stats = CacheStats::new();
        (0..3).for_each(|_| stats.record_hit());
        stats.record_miss();

        assert_eq!(stats.lookups(), 4);
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_expirations_accumulate_across_sweeps() {
        let mut stats = CacheStats::new();
        for removed in [3, 0, 2] {
            stats.record_expirations(removed);
        }

        assert_eq!(stats.expirations, 5);
    }

    #[test]
    fn test_stats_serialize() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.set_total_entries(4);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "hits": 1,
                "misses": 0,
                "expirations": 0,
                "total_entries": 4,
            })
        );
    }
}
