//! Retry runtime for idempotent agent calls.
//!
//! Sleeping and jitter sit behind traits so tests can run the retry loop
//! without real delays.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Async sleeping abstraction for retry backoff.
#[async_trait]
pub trait RetrySleeper: Send + Sync {
    /// Suspend execution for `duration`.
    ///
    /// ```rust,no_run
    /// use async_trait::async_trait;
    /// use std::sync::{Arc, Mutex};
    /// use std::time::Duration;
    /// use ubiclient::domain::RetrySleeper;
    ///
    /// #[derive(Default)]
    /// struct CountingSleeper {
    ///     calls: Arc<Mutex<u32>>,
    /// }
    ///
    /// #[async_trait]
    /// impl RetrySleeper for CountingSleeper {
    ///     async fn sleep(&self, _duration: Duration) {
    ///         *self.calls.lock().expect("calls mutex") += 1;
    ///     }
    /// }
    /// ```
    async fn sleep(&self, duration: Duration);
}

/// Retry backoff jitter abstraction.
pub trait BackoffJitter: Send + Sync {
    /// Return a jittered delay derived from the exponential base delay.
    fn jittered_delay(&self, base: Duration, attempt: u32, now: DateTime<Utc>) -> Duration;
}

/// Runtime helpers used by the retry loop.
pub struct RetryRuntime {
    /// Async sleep implementation.
    pub sleeper: Arc<dyn RetrySleeper>,
    /// Jitter strategy for retry delays.
    pub jitter: Arc<dyn BackoffJitter>,
}

impl Default for RetryRuntime {
    fn default() -> Self {
        Self {
            sleeper: Arc::new(TokioSleeper),
            jitter: Arc::new(AttemptJitter),
        }
    }
}

/// Sleeper used outside tests: parks the calling Tokio task between attempts
/// of a checkout read.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl RetrySleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Default jitter for checkout reads.
///
/// Stretches each backoff by up to a quarter so clients that lost the API at
/// the same moment do not come back in lockstep. The offset comes from the
/// clock's sub-second reading and the attempt number, so an injected clock
/// makes it reproducible.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttemptJitter;

const ATTEMPT_STRIDE: u64 = 7_919;

impl BackoffJitter for AttemptJitter {
    fn jittered_delay(&self, base: Duration, attempt: u32, now: DateTime<Utc>) -> Duration {
        let spread = (base / 4).max(Duration::from_millis(1));
        let spread_ms = u64::try_from(spread.as_millis()).unwrap_or(u64::MAX);
        let seed = u64::from(now.timestamp_subsec_nanos())
            .wrapping_add(u64::from(attempt).wrapping_mul(ATTEMPT_STRIDE));
        base.saturating_add(Duration::from_millis(seed % spread_ms.saturating_add(1)))
    }
}

/// Exponential backoff: `initial * 2^(attempt-1)`, capped at `max`.
pub(super) fn backoff_delay(initial: Duration, max: Duration, attempt: u32) -> Duration {
    let exponent = 2_u32.saturating_pow(attempt.saturating_sub(1));
    let base_ms = u64::try_from(initial.as_millis()).unwrap_or(u64::MAX);
    let max_ms = u64::try_from(max.as_millis()).unwrap_or(u64::MAX);
    Duration::from_millis(base_ms.saturating_mul(u64::from(exponent)).min(max_ms))
}
