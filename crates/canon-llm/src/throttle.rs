//! Run-wide minimum gap between generator calls.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use canon_core::traits::{Sleeper, ThreadSleeper};

/// Enforces `min_interval` between any two calls passing through it.
///
/// Shared by every claim in a run, so parallel workers queue up behind one
/// another instead of each keeping its own pace.
pub struct Throttle {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
    sleeper: Arc<dyn Sleeper>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self::with_sleeper(min_interval, Arc::new(ThreadSleeper))
    }

    pub fn with_sleeper(min_interval: Duration, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
            sleeper,
        }
    }

    /// Never waits.
    pub fn unthrottled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Blocks until a call is allowed, then claims the slot.
    pub fn wait(&self) {
        let mut last = self
            .last_call
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                self.sleeper.sleep(self.min_interval - elapsed);
            }
        }
        *last = Some(Instant::now());
    }
}

impl std::fmt::Debug for Throttle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttle")
            .field("min_interval", &self.min_interval)
            .finish()
    }
}
