//! Resilient execution of async operations.
//!
//! # Responsibilities
//! - Run an operation up to `max_attempts` times, strictly one after another
//! - Wait a capped exponential delay between failed attempts
//! - Notify the retry hook before each wait
//! - Surface the first success or the last failure, untouched
//!
//! # Design Decisions
//! - Stateless: everything lives on the stack of one `execute` call
//! - No logging in here; callers observe retries through the hook
//! - Cancellation is opt-in via `execute_until_cancelled`

use std::future::Future;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::resilience::hook::{NoopHook, OnRetry};
use crate::resilience::policy::RetryPolicy;

/// Failure of a cancellable execution.
#[derive(Debug, Error)]
pub enum ExecuteError<E> {
    /// The final permitted attempt failed with this error.
    #[error("{0}")]
    Operation(E),

    /// The cancellation token fired; no further attempt was started.
    #[error("cancelled after {attempts} attempt(s)")]
    Cancelled {
        attempts: u32,
        last_error: Option<E>,
    },
}

impl<E> ExecuteError<E> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExecuteError::Cancelled { .. })
    }

    /// The operation error carried by this failure, if any attempt produced one.
    pub fn into_operation_error(self) -> Option<E> {
        match self {
            ExecuteError::Operation(error) => Some(error),
            ExecuteError::Cancelled { last_error, .. } => last_error,
        }
    }
}

/// Executes one operation under a [`RetryPolicy`].
///
/// Built per call and consumed by `execute`. Independent executors share
/// nothing, so concurrent calls neither coordinate nor throttle each other.
#[derive(Debug, Clone)]
pub struct ResilientExecutor<H = NoopHook> {
    pub(crate) policy: RetryPolicy,
    pub(crate) hook: H,
}

impl ResilientExecutor<NoopHook> {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            hook: NoopHook,
        }
    }
}

impl Default for ResilientExecutor<NoopHook> {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl<H> ResilientExecutor<H> {
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Observe retries with a closure receiving `(attempt, &error)`.
    pub fn on_retry<E, F>(self, hook: F) -> ResilientExecutor<F>
    where
        F: FnMut(u32, &E),
    {
        self.with_hook(hook)
    }

    /// Observe retries with any [`OnRetry`] implementation.
    pub fn with_hook<G>(self, hook: G) -> ResilientExecutor<G> {
        ResilientExecutor {
            policy: self.policy,
            hook,
        }
    }

    /// Run `operation` until it succeeds or the attempts are exhausted.
    ///
    /// Returns the first successful value. On exhaustion returns exactly the
    /// error produced by the last attempt.
    pub async fn execute<F, Fut, T, E>(mut self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        H: OnRetry<E>,
    {
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) if attempt >= max_attempts => return Err(error),
                Err(error) => {
                    let delay = self.policy.delay_for(attempt);
                    self.hook.on_retry(attempt, &error);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Like [`execute`](Self::execute), but stops once `cancel` fires.
    ///
    /// The token is checked before every attempt and interrupts a backoff
    /// wait immediately. An attempt already running is allowed to finish: a
    /// success is still returned, a failure ends the call as cancelled.
    pub async fn execute_until_cancelled<F, Fut, T, E>(
        mut self,
        mut operation: F,
        cancel: &CancellationToken,
    ) -> Result<T, ExecuteError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        H: OnRetry<E>,
    {
        let max_attempts = self.policy.max_attempts();
        let mut attempts = 0;
        let mut last_error = None;

        loop {
            if cancel.is_cancelled() {
                return Err(ExecuteError::Cancelled {
                    attempts,
                    last_error,
                });
            }

            attempts += 1;
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) if attempts >= max_attempts => {
                    return Err(ExecuteError::Operation(error));
                }
                Err(error) => {
                    // cancelled mid-attempt: no retry follows, so no hook either
                    if cancel.is_cancelled() {
                        return Err(ExecuteError::Cancelled {
                            attempts,
                            last_error: Some(error),
                        });
                    }

                    let delay = self.policy.delay_for(attempts);
                    self.hook.on_retry(attempts, &error);
                    last_error = Some(error);

                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => {
                            return Err(ExecuteError::Cancelled { attempts, last_error });
                        }
                        () = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }
}

/// Run `operation` under `policy` without a retry hook.
pub async fn execute<F, Fut, T, E>(operation: F, policy: RetryPolicy) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    ResilientExecutor::new(policy).execute(operation).await
}
