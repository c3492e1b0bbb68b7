//! Bounded retry with exponential backoff for transient failures.
//!
//! # Design
//! Retries are sequential per logical call — no fan-out — and only errors
//! classified transient by [`HubError::is_transient`] (connection failures
//! and 5xx responses) are retried. Deterministic failures return on the
//! first occurrence. The delay doubles per attempt from `base_delay` up to
//! `max_delay`; once `max_attempts` are spent the last transient error is
//! wrapped in [`HubError::RetryExhausted`].

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use crate::error::{HubError, Result};

/// Attempt ceiling and backoff parameters for one logical send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, counting the first. At least one attempt is always
    /// made.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles per attempt thereafter.
    pub base_delay: Duration,
    /// Cap on the per-attempt delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Drive `op` to completion under this policy.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut delay = self.base_delay;
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() => {
                    if attempt >= self.max_attempts {
                        return Err(HubError::RetryExhausted {
                            attempts: attempt,
                            last: Box::new(err),
                        });
                    }
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient failure, retrying"
                    );
                    sleep(delay).await;
                    delay = (delay * 2).min(self.max_delay);
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn fast(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
        }
    }

    #[tokio::test]
    async fn succeeds_after_two_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = fast(3)
            .run(|| async {
                match calls.fetch_add(1, Ordering::SeqCst) {
                    0 | 1 => Err(HubError::transport(std::io::Error::new(
                        std::io::ErrorKind::ConnectionReset,
                        "connection reset",
                    ))),
                    _ => Ok(7u32),
                }
            })
            .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausts_after_the_attempt_ceiling() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = fast(3)
            .run(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(HubError::Device {
                    status: 503,
                    body: "hub busy".into(),
                })
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match result.unwrap_err() {
            HubError::RetryExhausted { attempts, last } => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, HubError::Device { status: 503, .. }));
            }
            other => panic!("expected RetryExhausted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn terminal_errors_get_a_single_attempt() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = fast(5)
            .run(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(HubError::Device {
                    status: 404,
                    body: "{}".into(),
                })
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(
            result.unwrap_err(),
            HubError::Device { status: 404, .. }
        ));
    }

    #[tokio::test]
    async fn first_success_returns_immediately() {
        let calls = AtomicU32::new(0);
        let result = fast(3)
            .run(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok("snapshot")
            })
            .await;
        assert_eq!(result.unwrap(), "snapshot");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
