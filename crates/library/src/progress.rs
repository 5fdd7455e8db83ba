//! Forward-progress counter for a batch run.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Snapshot handed to the progress callback on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub total: usize,
    pub current: usize,
    /// Time since the previous tick, or since the tracker was created.
    pub time_delta: Duration,
}

pub type ProgressCallback = Arc<dyn Fn(ProgressUpdate) + Send + Sync>;

#[derive(Debug)]
struct ProgressState {
    total: usize,
    current: usize,
    last_tick_at: Instant,
}

/// Counts items worked on during one run.
///
/// `current` only ever grows. The callback runs while the state lock is
/// held, so concurrent increments produce snapshots in the order they were
/// applied and never interleave.
pub struct ProgressTracker {
    state: Mutex<ProgressState>,
    callback: Option<ProgressCallback>,
}

impl ProgressTracker {
    pub fn new(total: usize, callback: Option<ProgressCallback>) -> Self {
        Self {
            state: Mutex::new(ProgressState { total, current: 0, last_tick_at: Instant::now() }),
            callback,
        }
    }

    /// Advance by `n` items and notify the callback.
    pub fn increment(&self, n: usize) -> ProgressUpdate {
        // Recover the state from a lock poisoned by a panicking callback.
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        state.current = state.current.saturating_add(n);
        let update = ProgressUpdate {
            total: state.total,
            current: state.current,
            time_delta: now.duration_since(state.last_tick_at),
        };
        state.last_tick_at = now;
        if let Some(callback) = &self.callback {
            callback(update);
        }
        update
    }

    pub fn current(&self) -> usize {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).current
    }

    pub fn total(&self) -> usize {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).total
    }
}
