//! Resilient operation executor.
//!
//! Runs fallible async (or blocking) operations under a bounded retry policy
//! with capped exponential backoff, plus the small collaborators that
//! usually sit next to it: a TTL cache, a fixed-window rate limiter, and
//! TOML configuration.
//!
//! ```no_run
//! use std::time::Duration;
//! use resilient_exec::resilience::{ResilientExecutor, RetryPolicy};
//!
//! # async fn fetch_balance() -> Result<u64, std::io::Error> { Ok(0) }
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let policy = RetryPolicy::builder()
//!     .max_attempts(5)
//!     .initial_delay(Duration::from_millis(200))
//!     .build()?;
//!
//! let balance = ResilientExecutor::new(policy)
//!     .on_retry(|attempt, error: &std::io::Error| {
//!         tracing::warn!(attempt, error = %error, "balance fetch failed");
//!     })
//!     .execute(fetch_balance)
//!     .await?;
//! # let _ = balance;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod commands;
pub mod config;
pub mod lifecycle;
pub mod limits;
pub mod observability;
pub mod resilience;

pub use config::ExecutorConfig;
pub use resilience::{execute, execute_blocking, ExecuteError, ResilientExecutor, RetryPolicy};
