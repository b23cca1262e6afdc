//! Retry observers.
//!
//! A hook runs synchronously after an attempt fails and before the backoff
//! wait starts. It is never called after the final attempt or after a success.
//! A panicking hook is not caught; it unwinds out of the executor and no
//! further attempt is made.

use std::fmt::Display;

use crate::observability::metrics;

/// Observer invoked with the 1-indexed number of the attempt that just failed.
pub trait OnRetry<E> {
    fn on_retry(&mut self, attempt: u32, error: &E);
}

impl<E, F> OnRetry<E> for F
where
    F: FnMut(u32, &E),
{
    fn on_retry(&mut self, attempt: u32, error: &E) {
        self(attempt, error)
    }
}

/// Hook that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHook;

impl<E> OnRetry<E> for NoopHook {
    fn on_retry(&mut self, _attempt: u32, _error: &E) {}
}

/// Hook that reports each retry as a `warn` event and a counter increment.
#[derive(Debug, Clone)]
pub struct LogRetries {
    operation: String,
}

impl LogRetries {
    /// `operation` labels both the log event and the metric.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }
}

impl<E: Display> OnRetry<E> for LogRetries {
    fn on_retry(&mut self, attempt: u32, error: &E) {
        tracing::warn!(
            operation = %self.operation,
            attempt,
            error = %error,
            "Attempt failed, retrying"
        );
        metrics::record_retry(&self.operation);
    }
}
