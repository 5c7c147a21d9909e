//! How long the current code stays valid.
//!
//! Everything is computed from absolute epoch seconds, so any period works
//! and no calendar or time zone is involved.

use std::num::NonZeroU64;

fn whole_seconds(now: f64) -> u64 {
    // отрицательное время и NaN считаем эпохой
    now.floor() as u64
}

/// Seconds left in the current period, in `1..=period`.
///
/// At the exact start of a period the full period is reported, never 0.
pub fn seconds_remaining(now: f64, period: NonZeroU64) -> u64 {
    let period = period.get();
    period - whole_seconds(now) % period
}

/// Remaining share of the period in `(0, 1]`, for progress bars.
pub fn progress(now: f64, period: NonZeroU64) -> f64 {
    seconds_remaining(now, period) as f64 / period.get() as f64
}

/// Epoch second at which the next code becomes due.
pub fn next_rollover(now: f64, period: NonZeroU64) -> u64 {
    whole_seconds(now).saturating_add(seconds_remaining(now, period))
}
