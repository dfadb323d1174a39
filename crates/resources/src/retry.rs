//! Bounded retry for idempotent reads

use crate::error::{ResourceError, Result};
use log::{debug, warn};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// Retry settings for reads
///
/// A read is attempted once and then retried up to `max_retries` times,
/// waiting `delay` before each retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_millis(2000),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// A policy that never retries
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Total number of attempts this policy allows
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Run `op` until it succeeds, fails permanently, runs out of retries or
    /// `cancel` is raised
    pub async fn run<T, F, Fut>(&self, label: &str, cancel: Option<&CancelFlag>, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0u32;
        loop {
            if cancel.map_or(false, CancelFlag::is_cancelled) {
                debug!("{}: cancelled before attempt {}", label, attempt + 1);
                return Err(ResourceError::Cancelled);
            }

            attempt += 1;
            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_transient() => return Err(err),
                Err(err) => err,
            };

            if attempt > self.max_retries {
                warn!("{}: giving up after {} attempts: {}", label, attempt, err);
                return Err(ResourceError::Unreachable {
                    attempts: attempt,
                    last_error: err.to_string(),
                });
            }

            warn!(
                "{}: attempt {} failed ({}), retrying ({} attempts left)",
                label,
                attempt,
                err,
                self.max_retries + 1 - attempt
            );
            sleep(self.delay).await;
        }
    }
}

/// Shared flag that stops pending retries
///
/// Clones share the same flag. Once raised it stays raised.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::sync::atomic::AtomicU32;

    fn fast(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries, Duration::from_millis(1))
    }

    fn server_error() -> ResourceError {
        ResourceError::from_status(StatusCode::SERVICE_UNAVAILABLE, "")
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = fast(3)
            .run("test", None, || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 3 {
                        Err(server_error())
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_exhausted_retries_are_unreachable() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = fast(2)
            .run("test", None, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(server_error()) }
            })
            .await;

        match result {
            Err(ResourceError::Unreachable { attempts, .. }) => assert_eq!(attempts, 3),
            other => panic!("expected Unreachable, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_failure_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = fast(3)
            .run("test", None, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(ResourceError::Unauthorized) }
            })
            .await;

        assert!(matches!(result, Err(ResourceError::Unauthorized)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancel_stops_retries() {
        let cancel = CancelFlag::new();
        let calls = AtomicU32::new(0);
        let result: Result<()> = fast(5)
            .run("test", Some(&cancel), || {
                calls.fetch_add(1, Ordering::SeqCst);
                cancel.cancel();
                async { Err(server_error()) }
            })
            .await;

        assert!(matches!(result, Err(ResourceError::Cancelled)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
