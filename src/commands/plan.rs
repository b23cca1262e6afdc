//! Backoff schedule preview.

use serde::Serialize;

use crate::resilience::RetryPolicy;

/// One scheduled wait.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PlannedRetry {
    /// Attempt whose failure triggers this wait.
    pub after_attempt: u32,
    pub delay_ms: u64,
    /// Total backoff waited once this delay has elapsed.
    pub cumulative_ms: u64,
}

/// The full worst-case timeline of a policy.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Plan {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub max_delay_ms: u64,
    pub retries: Vec<PlannedRetry>,
    pub total_delay_ms: u64,
}

pub fn plan(policy: &RetryPolicy) -> Plan {
    let mut cumulative_ms: u64 = 0;
    let retries = policy
        .schedule()
        .zip(1..)
        .map(|(delay, after_attempt)| {
            let delay_ms = delay.as_millis() as u64;
            cumulative_ms = cumulative_ms.saturating_add(delay_ms);
            PlannedRetry {
                after_attempt,
                delay_ms,
                cumulative_ms,
            }
        })
        .collect();

    Plan {
        max_attempts: policy.max_attempts(),
        initial_delay_ms: policy.initial_delay().as_millis() as u64,
        backoff_multiplier: policy.backoff_multiplier(),
        max_delay_ms: policy.max_delay().as_millis() as u64,
        retries,
        total_delay_ms: cumulative_ms,
    }
}
