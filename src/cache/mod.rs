//! Cache Module
//!
//! Provides in-memory caching with idle-timeout expiration, removal
//! notifications and background sweeping.

mod builder;
mod entry;
mod handle;
mod listener;
mod stats;
mod store;


// Re-export public types
pub use builder::CacheBuilder;
pub use entry::CacheEntry;
pub use handle::Cache;
pub use listener::RemovalListener;
pub use stats::CacheStats;
pub use store::CacheStore;
