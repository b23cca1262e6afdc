//! Capped exponential backoff.
//!
//! The delay before attempt `n + 1` is `min(initial * multiplier^(n - 1), max)`.
//! Arithmetic is done in `f64` milliseconds and the result is rounded down to
//! a whole millisecond.

use std::time::Duration;

/// Calculate the capped exponential delay that follows a failed `attempt`.
///
/// `attempt` is 1-indexed and names the attempt that just failed. Attempt `0`
/// never waits.
pub fn calculate_backoff(
    attempt: u32,
    initial: Duration,
    multiplier: f64,
    max: Duration,
) -> Duration {
    if attempt == 0 || initial.is_zero() {
        return Duration::ZERO;
    }

    let max_ms = max.as_millis() as f64;
    let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
    let delay_ms = initial.as_millis() as f64 * multiplier.powi(exponent);

    // inf and NaN both land on the cap
    if !delay_ms.is_finite() || delay_ms >= max_ms {
        return max;
    }

    Duration::from_millis(delay_ms.floor() as u64)
}
