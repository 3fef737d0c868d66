//! Token-bucket rate limiting for the shared daily call budget.

use crate::errors::{PlantbookError, PlantbookResult};
use chrono::Utc;
use parking_lot::Mutex;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Conservative retry-after fallback when the limiter can never grant.
const EXHAUSTED_FALLBACK: Duration = Duration::from_secs(24 * 60 * 60);

/// How the client reacts when the rate limiter has no token available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RateLimitBehavior {
    /// Block until the rate limiter allows the request (default).
    #[default]
    Wait,
    /// Return [`PlantbookError::RateLimited`] immediately instead of waiting.
    Error,
}

/// Token-bucket limiter enforcing a shared call budget across concurrent
/// callers.
///
/// Holds a single burst token refilled at a fixed interval. Bucket
/// accounting is explicit arithmetic behind a lock, which gives the
/// fail-fast path peek-without-consume semantics: a reservation that would
/// require waiting leaves the bucket untouched.
pub struct RateLimiter {
    bucket: Mutex<TokenBucket>,
}

impl RateLimiter {
    /// Creates a limiter with capacity 1 refilling once per `refill_interval`.
    pub fn new(refill_interval: Duration) -> Self {
        Self {
            bucket: Mutex::new(TokenBucket::new(1.0, refill_interval)),
        }
    }

    /// Creates a limiter spreading `requests_per_day` evenly over 24 hours.
    pub fn per_day(requests_per_day: u32) -> Self {
        let refill = Duration::from_secs(24 * 60 * 60) / requests_per_day.max(1);
        Self::new(refill)
    }

    /// Blocks until a token is available or `ctx` is cancelled.
    ///
    /// Cancellation surfaces as [`PlantbookError::Cancelled`], never as a
    /// rate error.
    pub async fn acquire(&self, ctx: &CancellationToken) -> PlantbookResult<()> {
        loop {
            let wait = {
                let mut bucket = self.bucket.lock();
                if bucket.try_consume() {
                    return Ok(());
                }
                bucket.time_until_available()
            };

            tokio::select! {
                _ = ctx.cancelled() => {
                    return Err(PlantbookError::Cancelled {
                        operation: "rate limit wait".to_string(),
                    });
                }
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }

    /// Attempts to take a token without waiting.
    ///
    /// A reservation that would require a wait is not consumed; the call
    /// fails with [`PlantbookError::RateLimited`] carrying the instant at
    /// which a token becomes available.
    pub fn try_acquire(&self) -> PlantbookResult<()> {
        let mut bucket = self.bucket.lock();

        if bucket.exhausted() {
            return Err(PlantbookError::RateLimited {
                retry_after: Utc::now()
                    + chrono::Duration::from_std(EXHAUSTED_FALLBACK)
                        .unwrap_or(chrono::Duration::MAX),
                message: "rate limiter exhausted".to_string(),
            });
        }

        if bucket.try_consume() {
            return Ok(());
        }

        let wait = bucket.time_until_available();
        Err(PlantbookError::RateLimited {
            retry_after: Utc::now()
                + chrono::Duration::from_std(wait).unwrap_or(chrono::Duration::MAX),
            message: "rate limit exceeded, please retry later".to_string(),
        })
    }
}

struct TokenBucket {
    capacity: f64,
    tokens: f64,
    refill_interval: Duration,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(capacity: f64, refill_interval: Duration) -> Self {
        Self {
            capacity,
            tokens: capacity,
            refill_interval,
            last_refill: Instant::now(),
        }
    }

    /// True when the bucket can never grant a token.
    fn exhausted(&self) -> bool {
        self.capacity < 1.0
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        let rate = 1.0 / self.refill_interval.as_secs_f64().max(f64::MIN_POSITIVE);
        self.tokens = (self.tokens + elapsed * rate).min(self.capacity);
        self.last_refill = now;
    }

    fn try_consume(&mut self) -> bool {
        self.refill();
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Wait until one token is available. Assumes a fresh [`Self::refill`].
    fn time_until_available(&self) -> Duration {
        if self.tokens >= 1.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64((1.0 - self.tokens) * self.refill_interval.as_secs_f64())
        }
    }
}
