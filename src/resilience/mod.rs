//! Resilience primitives for the request pipeline.
//!
//! The only built-in resilience is pre-dispatch rate gating; nothing is
//! retried automatically.

mod rate_limiter;

pub use rate_limiter::{RateLimitBehavior, RateLimiter};
