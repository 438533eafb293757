//! Virtual time for deterministic pacing tests.

use std::sync::Arc;
use std::time::Duration;

use kestrel_core::{Clock, WakeSignal};
use parking_lot::Mutex;

#[derive(Debug, Default)]
struct ClockState {
    now: Duration,
    slept: Duration,
    sleeps: usize,
    woken: usize,
}

/// A clock that only moves when told to.
///
/// `sleep` returns immediately: a pending wake-up is consumed without moving
/// time, otherwise the clock jumps forward by the requested duration.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    state: Arc<Mutex<ClockState>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, duration: Duration) {
        self.state.lock().now += duration;
    }

    pub fn set(&self, now: Duration) {
        self.state.lock().now = now;
    }

    /// Total virtual time spent in `sleep`.
    pub fn total_slept(&self) -> Duration {
        self.state.lock().slept
    }

    pub fn sleep_count(&self) -> usize {
        self.state.lock().sleeps
    }

    /// Number of sleeps cut short by a wake-up.
    pub fn woken_count(&self) -> usize {
        self.state.lock().woken
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.state.lock().now
    }

    fn sleep(&self, duration: Duration, wake: &WakeSignal) -> bool {
        let mut state = self.state.lock();
        state.sleeps += 1;
        if wake.take() {
            state.woken += 1;
            return true;
        }
        state.now += duration;
        state.slept += duration;
        false
    }
}
