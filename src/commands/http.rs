//! Fetch a URL as one attempt.

use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::limits::RateLimiter;
use crate::resilience::timeouts::{with_attempt_timeout, AttemptTimedOut};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited for '{key}', window resets in {reset_after:?}")]
    RateLimited { key: String, reset_after: Duration },

    #[error(transparent)]
    TimedOut(#[from] AttemptTimedOut),
}

/// HTTP GET client. Non-2xx responses count as failures.
pub struct Fetcher {
    client: reqwest::Client,
    limiter: Option<RateLimiter>,
    attempt_timeout: Option<Duration>,
}

impl Fetcher {
    pub fn new(
        client: reqwest::Client,
        limiter: Option<RateLimiter>,
        attempt_timeout: Option<Duration>,
    ) -> Self {
        Self {
            client,
            limiter,
            attempt_timeout,
        }
    }

    /// GET `url` once and return the body text.
    ///
    /// When a limiter is configured it is consulted per host before any
    /// request is sent.
    pub async fn fetch_once(&self, url: &Url) -> Result<String, FetchError> {
        if let Some(limiter) = &self.limiter {
            let key = url.host_str().unwrap_or_default();
            let decision = limiter.check(key);
            if !decision.allowed {
                return Err(FetchError::RateLimited {
                    key: key.to_string(),
                    reset_after: decision.reset_after,
                });
            }
        }

        with_attempt_timeout(self.attempt_timeout, async {
            let response = self
                .client
                .get(url.clone())
                .send()
                .await?
                .error_for_status()?;
            Ok::<_, FetchError>(response.text().await?)
        })
        .await
    }
}
