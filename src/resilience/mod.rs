//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Caller supplies operation + RetryPolicy:
//!     → policy.rs (validated attempt count and backoff parameters)
//!     → executor.rs (attempt loop, one suspend point per retry wait)
//!         → timeouts.rs (optional deadline around each attempt, caller side)
//!         → On failure: hook.rs (observer), backoff.rs (next delay)
//!     → first success, or the last failure unchanged
//! ```
//!
//! # Design Decisions
//! - Invalid policies are rejected at build time, before any attempt
//! - Attempts are strictly sequential; nothing is shared between calls
//! - The executor never wraps, logs or classifies operation errors
//! - Cancellation and blocking execution are separate entry points

pub mod backoff;
pub mod blocking;
pub mod executor;
pub mod hook;
pub mod policy;
pub mod timeouts;

pub use blocking::execute_blocking;
pub use executor::{execute, ExecuteError, ResilientExecutor};
pub use hook::{LogRetries, NoopHook, OnRetry};
pub use policy::{InvalidPolicy, RetryPolicy, RetryPolicyBuilder};
pub use timeouts::{with_attempt_timeout, AttemptTimedOut};
