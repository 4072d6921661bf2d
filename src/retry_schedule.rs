//! C3: Retry Scheduler. Pure computation over a [`RetryPolicy`].
//!
//! `next_delay` implements spec §4.3's formula,
//! `min(initial * multiplier^(attempt - 1), max_backoff)`, with the same
//! overflow-safe arithmetic style as the teacher's `Backoff::Exponential`
//! (`checked_pow`/`saturating_mul` rather than plain `*`/`pow`).

use crate::types::RetryPolicy;
use std::time::Duration;

/// Delay before the given attempt number (1-indexed: the delay returned
/// is the wait *before* making attempt `attempt`, so `next_delay(1, _)` is
/// only meaningful as a precomputed value, never awaited by attempt 1
/// itself).
pub fn next_delay(attempt: u32, policy: &RetryPolicy) -> Duration {
    let exponent = attempt.saturating_sub(1);
    let factor = policy
        .backoff_multiplier
        .checked_pow(exponent)
        .unwrap_or(u32::MAX);
    let seconds = policy
        .initial_backoff_seconds
        .checked_mul(factor)
        .unwrap_or(u32::MAX)
        .min(policy.max_backoff_seconds);
    Duration::from_secs(seconds as u64)
}

/// Whether the scheduler permits another attempt after `attempt` has
/// already been made.
pub fn should_retry(attempt: u32, policy: &RetryPolicy) -> bool {
    attempt < policy.max_attempts
}
