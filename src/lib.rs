//! Expiry Cache - An in-memory key-value cache with idle-timeout expiration
//!
//! Entries expire once they have gone unread and unwritten for longer than
//! their TTL. Expired entries are hidden from reads immediately and reclaimed
//! by `Cache::clean_up`, either on demand or from a background janitor, with
//! an optional listener notified for each reclaimed entry.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{Cache, CacheBuilder, CacheStats, RemovalListener};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
