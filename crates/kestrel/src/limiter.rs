//! Deadline-based frame pacing.

use std::time::Duration;

use kestrel_core::config::FpsTarget;

/// Frames a window may fall behind before its schedule is rebased.
const MAX_BACKLOG_FRAMES: u32 = 2;

/// Length of one frame at `fps`, rounded up so that pacing never runs fast.
pub fn frame_period(fps: u32) -> Option<Duration> {
    (fps > 0).then(|| Duration::from_nanos(1_000_000_000u64.div_ceil(u64::from(fps))))
}

/// Schedules iterations of one window against a target rate.
///
/// Deadlines advance by whole periods from the previous deadline rather than
/// from the moment a frame finished, so a slow frame is absorbed by the
/// following ones instead of shifting every later frame. A window that falls
/// more than a couple of frames behind is rebased to the current time.
#[derive(Debug, Clone, Default)]
pub struct FrameLimiter {
    next_deadline: Option<Duration>,
}

impl FrameLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` when the window may run immediately and is never waited on.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.next_deadline
    }

    pub fn is_due(&self, now: Duration) -> bool {
        self.next_deadline.is_none_or(|deadline| now >= deadline)
    }

    /// Record that an iteration finished at `now` and schedule the next one.
    ///
    /// An iteration that ran ahead of its deadline (woken for posted work)
    /// keeps the existing deadline.
    pub fn finish_iteration(&mut self, now: Duration, period: Option<Duration>) {
        let Some(period) = period else {
            self.next_deadline = None;
            return;
        };

        self.next_deadline = Some(match self.next_deadline {
            Some(deadline) if deadline > now => deadline,
            Some(deadline) => {
                let next = deadline + period;
                if now.saturating_sub(next) > period * MAX_BACKLOG_FRAMES {
                    tracing::trace!(behind = ?now.saturating_sub(next), "frame schedule rebased");
                    now + period
                } else {
                    next
                }
            }
            None => now + period,
        });
    }
}

/// Pacing period of an iteration given the window's target.
///
/// Paused windows still iterate, at the idle rate. An idle rate of zero is
/// treated as one iteration a second so a paused window never spins.
pub fn iteration_period(target: FpsTarget, idle_fps: u32) -> Option<Duration> {
    match target {
        FpsTarget::Paused => frame_period(idle_fps.max(1)),
        FpsTarget::Unthrottled => None,
        FpsTarget::Limited(fps) => frame_period(fps),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_period_rounds_up() {
        assert_eq!(frame_period(30), Some(Duration::from_nanos(33_333_334)));
        assert_eq!(frame_period(1), Some(Duration::from_secs(1)));
        assert_eq!(frame_period(0), None);
    }

    #[test]
    fn test_first_iteration_is_due_immediately() {
        let limiter = FrameLimiter::new();
        assert!(limiter.is_due(Duration::ZERO));
    }

    #[test]
    fn test_slow_frame_does_not_shift_schedule() {
        let period = 10 * MS;
        let mut limiter = FrameLimiter::new();
        limiter.finish_iteration(Duration::ZERO, Some(period));
        assert_eq!(limiter.next_deadline(), Some(10 * MS));

        // Frame at 10ms runs 15ms long.
        limiter.finish_iteration(25 * MS, Some(period));
        assert_eq!(limiter.next_deadline(), Some(20 * MS));
        assert!(limiter.is_due(25 * MS));

        limiter.finish_iteration(26 * MS, Some(period));
        assert_eq!(limiter.next_deadline(), Some(30 * MS));
    }

    #[test]
    fn test_long_stall_rebases() {
        let period = 10 * MS;
        let mut limiter = FrameLimiter::new();
        limiter.finish_iteration(Duration::ZERO, Some(period));
        limiter.finish_iteration(500 * MS, Some(period));
        assert_eq!(limiter.next_deadline(), Some(510 * MS));
    }

    #[test]
    fn test_early_iteration_keeps_deadline() {
        let period = 10 * MS;
        let mut limiter = FrameLimiter::new();
        limiter.finish_iteration(Duration::ZERO, Some(period));
        limiter.finish_iteration(3 * MS, Some(period));
        assert_eq!(limiter.next_deadline(), Some(10 * MS));
        assert!(!limiter.is_due(9 * MS));
    }

    #[test]
    fn test_unthrottled_is_always_due() {
        let mut limiter = FrameLimiter::new();
        limiter.finish_iteration(Duration::ZERO, Some(10 * MS));
        limiter.finish_iteration(10 * MS, None);
        assert_eq!(limiter.next_deadline(), None);
        assert!(limiter.is_due(10 * MS));
    }

    #[test]
    fn test_iteration_period_for_targets() {
        assert_eq!(iteration_period(FpsTarget::Paused, 60), frame_period(60));
        assert_eq!(iteration_period(FpsTarget::Unthrottled, 60), None);
        assert_eq!(iteration_period(FpsTarget::Limited(10), 60), Some(100 * MS));
    }

    #[test]
    fn test_zero_idle_rate_still_waits() {
        assert_eq!(
            iteration_period(FpsTarget::Paused, 0),
            Some(Duration::from_secs(1))
        );
    }
}
