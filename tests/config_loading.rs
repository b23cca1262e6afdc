//! Config file → validated config → policy and collaborators.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use resilient_exec::cache::TtlCache;
use resilient_exec::commands::plan::plan;
use resilient_exec::config::{load_config, ConfigError, LogFormat, ValidationError};
use resilient_exec::limits::RateLimiter;
use resilient_exec::resilience::RetryPolicy;

/// Temporary config file removed on drop.
struct TempConfig(PathBuf);

impl TempConfig {
    fn new(content: &str) -> Self {
        let path = std::env::temp_dir().join(format!("resilient-exec-{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, content).unwrap();
        Self(path)
    }
}

impl Drop for TempConfig {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.0);
    }
}

#[test]
fn test_full_config_file() {
    let file = TempConfig::new(
        r#"
        [retry]
        max_attempts = 4
        initial_delay_ms = 500
        backoff_multiplier = 3.0
        max_delay_ms = 4000

        [timeouts]
        attempt_ms = 2500

        [cache]
        default_ttl_ms = 1000

        [rate_limit]
        enabled = true
        max_requests = 5
        window_ms = 60000

        [observability]
        log_level = "debug"
        log_format = "json"
        "#,
    );

    let config = load_config(&file.0).unwrap();
    assert_eq!(config.timeouts.attempt_ms, Some(2500));
    assert_eq!(config.observability.log_format, LogFormat::Json);

    let policy = RetryPolicy::try_from(&config.retry).unwrap();
    let delays: Vec<u64> = plan(&policy).retries.iter().map(|r| r.delay_ms).collect();
    assert_eq!(delays, vec![500, 1500, 4000]);

    let cache: TtlCache<String, String> = TtlCache::from_config(&config.cache);
    assert_eq!(cache.default_ttl(), Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_rate_limiter_from_config() {
    let file = TempConfig::new(
        r#"
        [rate_limit]
        enabled = true
        max_requests = 2
        window_ms = 1000
        "#,
    );
    let config = load_config(&file.0).unwrap();
    let limiter = RateLimiter::from_config(&config.rate_limit);

    assert!(limiter.check("login:alice").allowed);
    assert!(limiter.check("login:alice").allowed);
    assert!(!limiter.check("login:alice").allowed);
}

#[test]
fn test_invalid_file_is_rejected_before_use() {
    let file = TempConfig::new(
        r#"
        [retry]
        max_attempts = 0

        [cache]
        default_ttl_ms = 0
        "#,
    );

    match load_config(&file.0) {
        Err(ConfigError::Validation(errors)) => assert_eq!(
            errors,
            vec![ValidationError::ZeroAttempts, ValidationError::ZeroCacheTtl]
        ),
        other => panic!("expected validation failure, got {:?}", other),
    }
}
