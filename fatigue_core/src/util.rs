//! Common time/period helpers for fatigue_core.

use std::time::Duration;

/// Number of microseconds in one minute.
pub const MICROS_PER_MIN: u64 = 60_000_000;

/// Poll period for a cadence given in samples per minute.
/// - Clamps `per_min` to at least 1 to avoid division by zero.
/// - Ensures result is at least 1 microsecond.
#[inline]
pub fn poll_period(per_min: u32) -> Duration {
    Duration::from_micros((MICROS_PER_MIN / u64::from(per_min.max(1))).max(1))
}

/// Warm-up progress in percent for iteration `i` of `n` (0-based), ending at 100.
#[inline]
pub fn warmup_percent(i: u32, n: u32) -> u32 {
    if n <= 1 {
        return 100;
    }
    (u64::from(i) * 100 / u64::from(n - 1)).min(100) as u32
}
