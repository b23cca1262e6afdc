//! Failure injection tests against a flaky HTTP backend.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use resilient_exec::commands::http::{FetchError, Fetcher};
use resilient_exec::limits::RateLimiter;
use resilient_exec::resilience::{ResilientExecutor, RetryPolicy};
use url::Url;

mod common;

fn test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

fn fast_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::builder()
        .max_attempts(max_attempts)
        .initial_delay(Duration::from_millis(20))
        .max_delay(Duration::from_millis(100))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_retry_on_failure() {
    let call_count = Arc::new(AtomicU32::new(0));
    let cc = call_count.clone();
    let addr = common::start_programmable_backend(move || {
        let cc = cc.clone();
        async move {
            let count = cc.fetch_add(1, Ordering::SeqCst);
            if count < 2 {
                (503, "Service Unavailable".into())
            } else {
                (200, "Success".into())
            }
        }
    })
    .await;

    let url = Url::parse(&format!("http://{}/balance", addr)).unwrap();
    let fetcher = Fetcher::new(test_client(), None, Some(Duration::from_secs(5)));
    let mut statuses = Vec::new();

    let body = ResilientExecutor::new(fast_policy(3))
        .on_retry(|_, err: &FetchError| {
            if let FetchError::Http(e) = err {
                statuses.push(e.status().map(|s| s.as_u16()));
            }
        })
        .execute(|| fetcher.fetch_once(&url))
        .await
        .expect("should eventually succeed after retries");

    assert_eq!(body, "Success");
    assert_eq!(call_count.load(Ordering::SeqCst), 3);
    assert_eq!(statuses, vec![Some(503), Some(503)]);
}

#[tokio::test]
async fn test_persistent_failure_surfaces_last_status() {
    let call_count = Arc::new(AtomicU32::new(0));
    let cc = call_count.clone();
    let addr = common::start_programmable_backend(move || {
        let cc = cc.clone();
        async move {
            cc.fetch_add(1, Ordering::SeqCst);
            (500, "dead".into())
        }
    })
    .await;

    let url = Url::parse(&format!("http://{}/", addr)).unwrap();
    let fetcher = Fetcher::new(test_client(), None, None);

    let err = ResilientExecutor::new(fast_policy(2))
        .execute(|| fetcher.fetch_once(&url))
        .await
        .unwrap_err();

    match err {
        FetchError::Http(e) => assert_eq!(e.status().map(|s| s.as_u16()), Some(500)),
        other => panic!("expected HTTP error, got {:?}", other),
    }
    assert_eq!(call_count.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_rate_limited_attempt_is_retried_after_window() {
    let addr = common::start_programmable_backend(|| async { (200, "ok".into()) }).await;
    let url = Url::parse(&format!("http://{}/", addr)).unwrap();

    let limiter = RateLimiter::new(1, Duration::from_millis(50));
    let fetcher = Fetcher::new(test_client(), Some(limiter), None);

    // first call uses the only slot in the window
    let first = ResilientExecutor::new(fast_policy(1))
        .execute(|| fetcher.fetch_once(&url))
        .await;
    assert_eq!(first.unwrap(), "ok");

    let mut denied = 0;
    let policy = RetryPolicy::builder()
        .max_attempts(3)
        .initial_delay(Duration::from_millis(60))
        .build()
        .unwrap();
    let second = ResilientExecutor::new(policy)
        .on_retry(|_, err: &FetchError| {
            if matches!(err, FetchError::RateLimited { .. }) {
                denied += 1;
            }
        })
        .execute(|| fetcher.fetch_once(&url))
        .await;

    assert_eq!(second.unwrap(), "ok");
    assert_eq!(denied, 1);
}

#[tokio::test]
async fn test_unreachable_backend_times_out_each_attempt() {
    // nothing listens on this port once the probe socket is dropped
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let url = Url::parse(&format!("http://{}/", addr)).unwrap();
    let fetcher = Fetcher::new(test_client(), None, Some(Duration::from_millis(200)));

    let mut attempts = 0;
    let result = ResilientExecutor::new(fast_policy(2))
        .execute(|| {
            attempts += 1;
            fetcher.fetch_once(&url)
        })
        .await;

    assert!(matches!(
        result,
        Err(FetchError::Http(_)) | Err(FetchError::TimedOut(_))
    ));
    assert_eq!(attempts, 2);
}
