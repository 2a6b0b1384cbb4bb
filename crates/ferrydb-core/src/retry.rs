//! Bounded retry policy with exponential, optionally jittered backoff.
//!
//! Every call site carries its own policy value; the engine keeps no shared
//! mutable retry state, so concurrent callers cannot interfere.

use serde::{Deserialize, Serialize};
use std::time::Duration;

// Doubling stops here; beyond ~64x the base, only the cap matters.
const MAX_BACKOFF_SHIFT: u32 = 6;

///
/// RetryPolicy
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first. `1` disables retries.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Spread delays by up to +50% to decorrelate concurrent retriers.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(5),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            jitter: false,
        }
    }

    /// Backoff delay before retrying after `failed_attempts` failures
    /// (1-based). Exponential in the attempt count, capped at `max_delay`,
    /// plus up to 50% uniform jitter when enabled.
    #[must_use]
    pub fn delay_for(&self, failed_attempts: u32) -> Duration {
        let shift = failed_attempts.saturating_sub(1).min(MAX_BACKOFF_SHIFT);
        let delay = self
            .base_delay
            .saturating_mul(1_u32 << shift)
            .min(self.max_delay);

        if self.jitter && !delay.is_zero() {
            delay + delay.mul_f64(rand::random::<f64>() * 0.5)
        } else {
            delay
        }
    }

    /// Whether another attempt fits inside the budget after
    /// `failed_attempts` failures.
    #[must_use]
    pub const fn allows_retry(&self, failed_attempts: u32) -> bool {
        failed_attempts < self.max_attempts
    }
}

/// Sleep out the backoff delay before retry attempt `failed_attempts + 1`.
pub(crate) fn sleep_before_retry(policy: &RetryPolicy, failed_attempts: u32) {
    let delay = policy.delay_for(failed_attempts);
    tracing::debug!(failed_attempts, delay_ms = delay.as_millis() as u64, "backing off");
    std::thread::sleep(delay);
}

///
/// TESTS
///
