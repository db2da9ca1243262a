//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::error::{CacheError, Result};

const DEFAULT_TIMEOUT_SECS: u64 = 300;
const DEFAULT_INITIAL_CAPACITY: usize = 16;
const DEFAULT_JANITOR_INTERVAL_MS: u64 = 1000;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// TTL for entries written without an override
    pub default_timeout: Duration,
    /// Capacity hint for the entry map
    pub initial_capacity: usize,
    /// Time between janitor sweeps, None = no janitor
    pub janitor_interval: Option<Duration>,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DEFAULT_TIMEOUT_SECS` - Default TTL in seconds (default: 300, must be positive)
    /// - `CACHE_INITIAL_CAPACITY` - Entry map capacity hint (default: 16)
    /// - `CACHE_JANITOR_INTERVAL_MS` - Sweep interval in milliseconds (default: 1000, 0 disables)
    ///
    /// Unparsable or out-of-range values are logged and replaced by the default.
    pub fn from_env() -> Self {
        let timeout_secs = match env_or("CACHE_DEFAULT_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS) {
            0 => {
                warn!("CACHE_DEFAULT_TIMEOUT_SECS must be positive, using {}", DEFAULT_TIMEOUT_SECS);
                DEFAULT_TIMEOUT_SECS
            }
            secs => secs,
        };
        let janitor_ms = env_or("CACHE_JANITOR_INTERVAL_MS", DEFAULT_JANITOR_INTERVAL_MS);

        Self {
            default_timeout: Duration::from_secs(timeout_secs),
            initial_capacity: env_or("CACHE_INITIAL_CAPACITY", DEFAULT_INITIAL_CAPACITY),
            janitor_interval: (janitor_ms > 0).then(|| Duration::from_millis(janitor_ms)),
        }
    }

    /// Checks values set programmatically.
    pub fn validate(&self) -> Result<()> {
        if self.default_timeout.is_zero() {
            return Err(CacheError::InvalidConfig(
                "default_timeout must be positive".to_string(),
            ));
        }
        if self.janitor_interval.is_some_and(|interval| interval.is_zero()) {
            return Err(CacheError::InvalidConfig(
                "janitor_interval must be positive; use None to disable".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            janitor_interval: Some(Duration::from_millis(DEFAULT_JANITOR_INTERVAL_MS)),
        }
    }
}

/// Reads and parses a variable, falling back to `default` when unset or invalid.
fn env_or<T: FromStr + Copy>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid value {:?} for {}", raw, name);
            default
        }),
        Err(_) => default,
    }
}
