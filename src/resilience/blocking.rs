//! Synchronous execution.
//!
//! Same attempt and delay contract as the async executor, for callers that
//! run on plain threads. The wait blocks the calling thread.

use std::thread;

use crate::resilience::executor::ResilientExecutor;
use crate::resilience::hook::OnRetry;
use crate::resilience::policy::RetryPolicy;

impl<H> ResilientExecutor<H> {
    /// Run a blocking `operation` until it succeeds or attempts run out.
    ///
    /// Do not call this from inside an async runtime worker.
    pub fn execute_blocking<F, T, E>(mut self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
        H: OnRetry<E>,
    {
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 1;

        loop {
            match operation() {
                Ok(value) => return Ok(value),
                Err(error) if attempt >= max_attempts => return Err(error),
                Err(error) => {
                    let delay = self.policy.delay_for(attempt);
                    self.hook.on_retry(attempt, &error);
                    thread::sleep(delay);
                    attempt += 1;
                }
            }
        }
    }
}

/// Run a blocking `operation` under `policy` without a retry hook.
pub fn execute_blocking<F, T, E>(operation: F, policy: RetryPolicy) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
{
    ResilientExecutor::new(policy).execute_blocking(operation)
}
