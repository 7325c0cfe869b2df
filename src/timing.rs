//! Wraparound-safe timers over the free-running millisecond counter
//!
//! Every periodic policy in the firmware (backlight timeout, display auto
//! reset, frame pacing, sensor polling, NTP sync) compares the current
//! millisecond counter against a stored start point. The counter is a `u32`
//! and overflows roughly every 49.7 days, so all comparisons go through
//! [`elapsed_ms`], which uses modular subtraction.

/// Milliseconds elapsed between `since` and `now`, tolerant of counter overflow.
#[inline]
pub const fn elapsed_ms(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

/// Returns `true` when at least `interval_ms` have passed since `since`.
#[inline]
pub const fn has_elapsed(now: u32, since: u32, interval_ms: u32) -> bool {
    elapsed_ms(now, since) >= interval_ms
}

pub const fn secs_to_ms(secs: u32) -> u32 {
    secs.saturating_mul(1000)
}

pub const fn mins_to_ms(mins: u32) -> u32 {
    secs_to_ms(mins.saturating_mul(60))
}

/// A restartable interval timer.
///
/// Stores only the millisecond value at which it was last restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timer {
    started_at: u32,
}

impl Timer {
    pub const fn new(now: u32) -> Self {
        Self { started_at: now }
    }

    /// Restart the timer at `now`.
    pub fn restart(&mut self, now: u32) {
        self.started_at = now;
    }

    pub const fn started_at(&self) -> u32 {
        self.started_at
    }

    pub const fn elapsed(&self, now: u32) -> u32 {
        elapsed_ms(now, self.started_at)
    }

    pub const fn has_elapsed(&self, now: u32, interval_ms: u32) -> bool {
        has_elapsed(now, self.started_at, interval_ms)
    }
}

/// Current value of the embassy monotonic clock truncated to the `u32`
/// millisecond counter used by every manager tick.
#[cfg(feature = "embassy")]
pub fn now_ms() -> u32 {
    embassy_time::Instant::now().as_millis() as u32
}
