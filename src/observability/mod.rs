//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Executor callers, cache and rate limiter produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → Log aggregation (stderr, pretty or JSON)
//!     → Whatever metrics recorder the application installs
//! ```
//!
//! # Design Decisions
//! - The executor core emits nothing; retries are observed through hooks
//! - Structured logging (JSON) for machine parsing
//! - Each CLI run carries a run ID span

pub mod logging;
pub mod metrics;
