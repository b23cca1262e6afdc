//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::time::Instant;

/// Error produced by scripted operations; carries the failing attempt number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailed(pub u32);

impl fmt::Display for AttemptFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attempt {} failed", self.0)
    }
}

impl std::error::Error for AttemptFailed {}

/// Start times of every attempt an operation has seen.
#[derive(Clone, Default)]
pub struct AttemptLog {
    starts: Arc<Mutex<Vec<Instant>>>,
}

impl AttemptLog {
    pub fn record(&self) -> u32 {
        let mut starts = self.starts.lock().unwrap();
        starts.push(Instant::now());
        starts.len() as u32
    }

    pub fn count(&self) -> usize {
        self.starts.lock().unwrap().len()
    }

    /// Time between consecutive attempt starts.
    pub fn gaps(&self) -> Vec<Duration> {
        let starts = self.starts.lock().unwrap();
        starts.windows(2).map(|w| w[1] - w[0]).collect()
    }
}

/// Operation that fails until attempt `succeed_on`, then returns that attempt
/// number. `None` fails forever.
pub fn scripted(
    log: &AttemptLog,
    succeed_on: Option<u32>,
) -> impl FnMut() -> BoxFuture<'static, Result<u32, AttemptFailed>> {
    let log = log.clone();
    move || {
        let attempt = log.record();
        async move {
            match succeed_on {
                Some(n) if attempt >= n => Ok(attempt),
                _ => Err(AttemptFailed(attempt)),
            }
        }
        .boxed()
    }
}

/// Assert a measured wait matches a scheduled delay, allowing timer rounding.
pub fn assert_delay(actual: Duration, expected: Duration) {
    assert!(
        actual >= expected && actual < expected + Duration::from_millis(5),
        "expected a delay of {:?}, measured {:?}",
        expected,
        actual
    );
}

/// Start a programmable mock HTTP backend on an ephemeral port.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        // drain the request head before answering
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;

                        let (status, body) = f().await;
                        let status_text = match status {
                            200 => "200 OK",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}
