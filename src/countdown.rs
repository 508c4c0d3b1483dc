//! Whole-second countdown to the next automatic refresh, shown in the header.
//!
//! The countdown is display only. It does not drive fetching. The poll loop ticks on
//! the same interval grid, and every fetch start resets the countdown to the instant
//! the fetch began, so the two agree even after a manual refresh.

use std::time::{Duration, Instant};

pub struct Countdown {
    interval: Duration,
    reset_at: Instant,
    remaining: u64,
}

impl Countdown {
    /// Intervals below one second are raised to one second.
    pub fn new(interval: Duration, now: Instant) -> Self {
        let interval = interval.max(Duration::from_secs(1));
        let mut countdown = Self {
            interval,
            reset_at: now,
            remaining: 0,
        };
        countdown.remaining = countdown.remaining_at(now);
        countdown
    }

    /// Restart the full interval from `now`.
    pub fn reset(&mut self, now: Instant) {
        self.reset_at = now;
        self.remaining = self.remaining_at(now);
    }

    /// Recompute from the clock. On reaching zero the countdown snaps to the
    /// start of the current interval, so missed ticks never accumulate drift.
    pub fn tick(&mut self, now: Instant) -> u64 {
        let mut remaining = self.remaining_at(now);
        if remaining == 0 {
            let elapsed = now.saturating_duration_since(self.reset_at).as_millis();
            let into_period = elapsed % self.interval.as_millis();
            let into_period = Duration::from_millis(u64::try_from(into_period).unwrap_or(0));
            self.reset_at = now.checked_sub(into_period).unwrap_or(now);
            remaining = self.remaining_at(now);
        }
        self.remaining = remaining;
        remaining
    }

    /// Seconds left at `now`, rounded up and never negative.
    pub fn remaining_at(&self, now: Instant) -> u64 {
        let elapsed = now.saturating_duration_since(self.reset_at);
        let left = self.interval.saturating_sub(elapsed);
        u64::try_from(left.as_millis().div_ceil(1000)).unwrap_or(u64::MAX)
    }

    /// Value as of the last tick or reset.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEN: Duration = Duration::from_secs(10);

    #[test]
    fn starts_at_full_interval() {
        let now = Instant::now();
        let c = Countdown::new(TEN, now);
        assert_eq!(c.remaining(), 10);
    }

    #[test]
    fn partial_seconds_round_up() {
        let t0 = Instant::now();
        let mut c = Countdown::new(TEN, t0);
        assert_eq!(c.tick(t0 + Duration::from_millis(100)), 10);
        assert_eq!(c.tick(t0 + Duration::from_millis(1000)), 9);
        assert_eq!(c.tick(t0 + Duration::from_millis(9_999)), 1);
    }

    #[test]
    fn wraps_to_full_interval_at_zero() {
        let t0 = Instant::now();
        let mut c = Countdown::new(TEN, t0);
        assert_eq!(c.tick(t0 + TEN), 10);
        assert_eq!(c.tick(t0 + TEN + Duration::from_secs(3)), 7);
    }

    #[test]
    fn missed_ticks_do_not_drift() {
        let t0 = Instant::now();
        let mut c = Countdown::new(TEN, t0);
        // Suspended for 2.5 intervals: 5s into the third period.
        assert_eq!(c.tick(t0 + Duration::from_secs(25)), 5);
    }

    #[test]
    fn reset_restarts_interval() {
        let t0 = Instant::now();
        let mut c = Countdown::new(TEN, t0);
        c.tick(t0 + Duration::from_secs(7));
        assert_eq!(c.remaining(), 3);
        c.reset(t0 + Duration::from_secs(7));
        assert_eq!(c.remaining(), 10);
    }

    #[test]
    fn stays_within_bounds() {
        let t0 = Instant::now();
        let mut c = Countdown::new(Duration::from_secs(3), t0);
        for ms in (0..20_000).step_by(250) {
            let r = c.tick(t0 + Duration::from_millis(ms));
            assert!(r <= 3, "remaining {r} at {ms}ms");
        }
    }

    #[test]
    fn sub_second_interval_is_raised() {
        let c = Countdown::new(Duration::from_millis(200), Instant::now());
        assert_eq!(c.interval(), Duration::from_secs(1));
    }
}
