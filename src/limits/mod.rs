//! Request admission limits.
//!
//! # Design Decisions
//! - Separate from the executor: retries are never throttled implicitly
//! - Callers consult the limiter inside their operation, so a denial is an
//!   ordinary failed attempt that the executor may retry after backoff

pub mod rate_limit;

pub use rate_limit::{RateDecision, RateLimiter};
