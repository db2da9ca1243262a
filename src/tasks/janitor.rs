//! Janitor Task
//!
//! Background task that periodically sweeps expired cache entries.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::error::{CacheError, Result};

// == Janitor ==
/// Handle to a running sweep task.
///
/// The task only knows how to call its sweep closure on a schedule; it holds
/// no cache state of its own. Dropping the handle signals the task to exit
/// without waiting for it; `stop` waits.
#[derive(Debug)]
pub struct Janitor {
    /// Sender to signal shutdown
    shutdown_tx: watch::Sender<bool>,
    /// The spawned sweep loop
    handle: JoinHandle<()>,
    interval: Duration,
}

impl Janitor {
    /// Spawns a task that calls `sweep` every `interval` on the current
    /// tokio runtime. The first sweep happens one interval after start.
    ///
    /// # Arguments
    /// * `interval` - Time between sweeps, must be non-zero
    /// * `sweep` - Removes expired entries and returns how many it removed
    ///
    /// # Errors
    /// * `CacheError::InvalidInterval` for a zero interval or one too large
    ///   to schedule
    /// * `CacheError::NoRuntime` when called outside a tokio runtime
    pub fn start<F>(interval: Duration, sweep: F) -> Result<Self>
    where
        F: Fn() -> usize + Send + 'static,
    {
        let first_sweep = Self::first_sweep_at(interval)?;
        let runtime = Handle::try_current().map_err(|_| CacheError::NoRuntime)?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = runtime.spawn(janitor_loop(first_sweep, interval, sweep, shutdown_rx));

        info!("Janitor started with interval of {:?}", interval);

        Ok(Self {
            shutdown_tx,
            handle,
            interval,
        })
    }

    /// Returns when the first sweep is due if `interval` can be scheduled.
    ///
    /// The interval must be non-zero, and two of them added to the current
    /// instant must not overflow, since the ticker adds one interval past
    /// each sweep.
    pub fn first_sweep_at(interval: Duration) -> Result<Instant> {
        if interval.is_zero() {
            return Err(CacheError::InvalidInterval(interval));
        }
        Instant::now()
            .checked_add(interval)
            .filter(|first| first.checked_add(interval).is_some())
            .ok_or(CacheError::InvalidInterval(interval))
    }

    /// Signals the task to stop and waits until it has exited.
    ///
    /// A sweep already in progress runs to completion first. Once this
    /// returns no further sweep from this janitor can happen.
    pub async fn stop(self) {
        // Fails only if the task already exited and dropped its receiver.
        let _ = self.shutdown_tx.send(true);

        match self.handle.await {
            Ok(()) => info!("Janitor stopped"),
            Err(err) if err.is_panic() => warn!("Janitor task panicked during a sweep"),
            Err(err) => warn!("Janitor task ended abnormally: {}", err),
        }
    }

    /// Returns the time between sweeps.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns true once the task has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// The sweep loop. Cancellation is only observed between sweeps.
async fn janitor_loop<F>(
    first_sweep: Instant,
    interval: Duration,
    sweep: F,
    mut shutdown_rx: watch::Receiver<bool>,
) where
    F: Fn() -> usize,
{
    let mut ticker = time::interval_at(first_sweep, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    debug!("Janitor received shutdown signal");
                    return;
                }
            }
            _ = ticker.tick() => {
                let removed = sweep();

                if removed > 0 {
                    info!("Janitor sweep: removed {} expired entries", removed);
                } else {
                    debug!("Janitor sweep: no expired entries found");
                }
            }
        }
    }
}
