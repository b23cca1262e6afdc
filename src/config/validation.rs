//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (attempts >= 1, multiplier > 0, windows > 0)
//! - Check that the log level names a real level
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ExecutorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::ExecutorConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("retry.max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("retry.backoff_multiplier must be a finite number greater than 0, got {0}")]
    InvalidMultiplier(f64),

    #[error("timeouts.attempt_ms must be greater than 0 when set")]
    ZeroAttemptTimeout,

    #[error("cache.default_ttl_ms must be greater than 0")]
    ZeroCacheTtl,

    #[error("rate_limit.max_requests must be greater than 0")]
    ZeroRateLimit,

    #[error("rate_limit.window_ms must be greater than 0")]
    ZeroRateWindow,

    #[error("observability.log_level '{0}' is not one of trace, debug, info, warn, error")]
    UnknownLogLevel(String),
}

/// Check every semantic rule and collect all violations.
pub fn validate_config(config: &ExecutorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.retry.max_attempts == 0 {
        errors.push(ValidationError::ZeroAttempts);
    }
    let multiplier = config.retry.backoff_multiplier;
    if !multiplier.is_finite() || multiplier <= 0.0 {
        errors.push(ValidationError::InvalidMultiplier(multiplier));
    }

    if config.timeouts.attempt_ms == Some(0) {
        errors.push(ValidationError::ZeroAttemptTimeout);
    }

    if config.cache.default_ttl_ms == 0 {
        errors.push(ValidationError::ZeroCacheTtl);
    }

    if config.rate_limit.enabled {
        if config.rate_limit.max_requests == 0 {
            errors.push(ValidationError::ZeroRateLimit);
        }
        if config.rate_limit.window_ms == 0 {
            errors.push(ValidationError::ZeroRateWindow);
        }
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
