//! Metrics collection.
//!
//! # Metrics
//! - `executor_retries_total` (counter): retries scheduled, by operation
//! - `executor_outcomes_total` (counter): finished executions, by operation and outcome
//! - `cache_entries` (gauge): live entries in a TTL cache
//! - `rate_limited_total` (counter): denied requests, by key
//!
//! # Design Decisions
//! - Emits through the `metrics` facade only; installing a recorder or
//!   exporter is the embedding application's job
//! - Without a recorder every call is a cheap no-op

/// Outcome label for `executor_outcomes_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
    Cancelled,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
            Outcome::Cancelled => "cancelled",
        }
    }
}

pub fn record_retry(operation: &str) {
    ::metrics::counter!("executor_retries_total", "operation" => operation.to_string()).increment(1);
}

pub fn record_outcome(operation: &str, outcome: Outcome) {
    ::metrics::counter!(
        "executor_outcomes_total",
        "operation" => operation.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

pub fn record_cache_size(size: usize) {
    ::metrics::gauge!("cache_entries").set(size as f64);
}

pub fn record_rate_limited(key: &str) {
    ::metrics::counter!("rate_limited_total", "key" => key.to_string()).increment(1);
}
