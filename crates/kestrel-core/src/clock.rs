//! Monotonic time and an interruptible sleep.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Source of monotonic time for frame pacing and event timestamps.
///
/// `now` is measured from an arbitrary, fixed epoch chosen by the clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> Duration;

    /// Block for `duration` or until `wake` is signalled.
    ///
    /// Returns `true` if the sleep was cut short by a wake-up.
    fn sleep(&self, duration: Duration, wake: &WakeSignal) -> bool;

    /// Current time in nanoseconds, the unit carried by input events.
    fn now_nanos(&self) -> u64 {
        self.now().as_nanos() as u64
    }
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }

    fn sleep(&self, duration: Duration, wake: &WakeSignal) -> bool {
        wake.wait_timeout(duration)
    }
}

/// A latch that lets any thread cut a pacing sleep short.
///
/// A wake that arrives while nobody is sleeping is remembered and consumed by
/// the next wait, so a close request can never slip between two sleeps.
#[derive(Debug, Default)]
pub struct WakeSignal {
    woken: Mutex<bool>,
    condvar: Condvar,
}

impl WakeSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wake(&self) {
        let mut woken = self.woken.lock();
        *woken = true;
        self.condvar.notify_all();
    }

    /// Consume a pending wake without blocking.
    pub fn take(&self) -> bool {
        std::mem::take(&mut *self.woken.lock())
    }

    /// Wait up to `timeout`; returns `true` if woken (the wake is consumed).
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut woken = self.woken.lock();
        while !*woken {
            if self.condvar.wait_until(&mut woken, deadline).timed_out() {
                break;
            }
        }
        std::mem::take(&mut *woken)
    }
}
