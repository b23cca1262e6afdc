//! Per-attempt timeout.
//!
//! # Responsibilities
//! - Bound a single attempt with a deadline
//! - Turn an expired deadline into the caller's own error type
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Applied on the operation side; the executor sees a timeout as an
//!   ordinary failed attempt and retries it like any other

use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// A single attempt exceeded its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("attempt timed out after {0:?}")]
pub struct AttemptTimedOut(pub Duration);

/// Await `attempt`, failing with `AttemptTimedOut` once `limit` elapses.
///
/// `None` means no deadline. The attempt future is dropped on expiry.
pub async fn with_attempt_timeout<Fut, T, E>(limit: Option<Duration>, attempt: Fut) -> Result<T, E>
where
    Fut: Future<Output = Result<T, E>>,
    E: From<AttemptTimedOut>,
{
    match limit {
        Some(limit) => match tokio::time::timeout(limit, attempt).await {
            Ok(result) => result,
            Err(_) => Err(AttemptTimedOut(limit).into()),
        },
        None => attempt.await,
    }
}
