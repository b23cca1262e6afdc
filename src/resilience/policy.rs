//! Retry policy definition and validation.
//!
//! A [`RetryPolicy`] is a small immutable value built fresh for each call.
//! Every constructor validates, so an executor never sees a policy with zero
//! attempts or a non-positive multiplier.

use std::time::Duration;
use thiserror::Error;

use crate::config::schema::RetryConfig;
use crate::resilience::backoff::calculate_backoff;

/// Default total number of attempts (first try + retries).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Default backoff base in milliseconds.
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 1000;
/// Default growth factor applied after each failed attempt.
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;
/// Default ceiling for any computed delay in milliseconds.
pub const DEFAULT_MAX_DELAY_MS: u64 = 10_000;

/// Reasons a policy is rejected before any attempt is made.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum InvalidPolicy {
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("backoff_multiplier must be greater than 0, got {0}")]
    NonPositiveMultiplier(f64),

    #[error("backoff_multiplier must be finite, got {0}")]
    NonFiniteMultiplier(f64),
}

/// Bounded exponential retry policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_delay: Duration,
    backoff_multiplier: f64,
    max_delay: Duration,
}

impl RetryPolicy {
    /// Start a builder with every field at its default.
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::default()
    }

    /// Total number of attempts, always at least 1.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    pub fn backoff_multiplier(&self) -> f64 {
        self.backoff_multiplier
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Delay to wait after `attempt` fails, before the next attempt starts.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        calculate_backoff(
            attempt,
            self.initial_delay,
            self.backoff_multiplier,
            self.max_delay,
        )
    }

    /// The waits between consecutive attempts, in order.
    ///
    /// Yields `max_attempts - 1` delays; nothing for a single-attempt policy.
    pub fn schedule(&self) -> impl Iterator<Item = Duration> + '_ {
        (1..self.max_attempts).map(move |attempt| self.delay_for(attempt))
    }

    fn validate(self) -> Result<Self, InvalidPolicy> {
        if self.max_attempts == 0 {
            return Err(InvalidPolicy::ZeroAttempts);
        }
        if !self.backoff_multiplier.is_finite() {
            return Err(InvalidPolicy::NonFiniteMultiplier(self.backoff_multiplier));
        }
        if self.backoff_multiplier <= 0.0 {
            return Err(InvalidPolicy::NonPositiveMultiplier(self.backoff_multiplier));
        }
        Ok(self)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
        }
    }
}

impl TryFrom<&RetryConfig> for RetryPolicy {
    type Error = InvalidPolicy;

    fn try_from(config: &RetryConfig) -> Result<Self, Self::Error> {
        RetryPolicy::builder()
            .max_attempts(config.max_attempts)
            .initial_delay(Duration::from_millis(config.initial_delay_ms))
            .backoff_multiplier(config.backoff_multiplier)
            .max_delay(Duration::from_millis(config.max_delay_ms))
            .build()
    }
}

/// Partial policy. Fields left unset keep their defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryPolicyBuilder {
    max_attempts: Option<u32>,
    initial_delay: Option<Duration>,
    backoff_multiplier: Option<f64>,
    max_delay: Option<Duration>,
}

impl RetryPolicyBuilder {
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = Some(initial_delay);
        self
    }

    pub fn backoff_multiplier(mut self, backoff_multiplier: f64) -> Self {
        self.backoff_multiplier = Some(backoff_multiplier);
        self
    }

    pub fn max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    /// Fill in defaults and validate.
    pub fn build(self) -> Result<RetryPolicy, InvalidPolicy> {
        let defaults = RetryPolicy::default();
        RetryPolicy {
            max_attempts: self.max_attempts.unwrap_or(defaults.max_attempts),
            initial_delay: self.initial_delay.unwrap_or(defaults.initial_delay),
            backoff_multiplier: self
                .backoff_multiplier
                .unwrap_or(defaults.backoff_multiplier),
            max_delay: self.max_delay.unwrap_or(defaults.max_delay),
        }
        .validate()
    }
}
