//! Error types for the cache
//!
//! Store operations never fail; absence is reported through `Option`.
//! Errors only arise from janitor misuse and configuration.

use std::time::Duration;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Janitor interval must be non-zero
    #[error("Invalid janitor interval: {0:?}")]
    InvalidInterval(Duration),

    /// Janitor was started outside a tokio runtime
    #[error("No tokio runtime available to run the janitor")]
    NoRuntime,

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
