//! Removal Notification Module
//!
//! Callback invoked for entries reclaimed by a clean-up sweep.

use std::sync::Arc;

/// Called once per entry removed by a sweep, with the entry's key and value.
///
/// Never called for explicit deletes or overwrites. Runs after the cache
/// lock has been released, so it may call back into the cache.
pub type RemovalListener<K, V> = Arc<dyn Fn(K, V) + Send + Sync>;

/// Dispatches buffered removals to the listener, if any.
pub(crate) fn notify_removals<K, V>(listener: Option<&RemovalListener<K, V>>, removed: Vec<(K, V)>) {
    let Some(listener) = listener else {
        return;
    };
    for (key, value) in removed {
        listener(key, value);
    }
}
