//! Retry policy for transient transaction conflicts.
//!
//! Only errors whose [`ErrorKind`] is `Conflict` are retried; everything else
//! is returned on the first occurrence.

use std::{future::Future, time::Duration};

use crate::{EngineError, ErrorKind, ResultEngine};

/// Capped exponential backoff.
///
/// Attempt `n` (0-based) that fails with a conflict waits
/// `min(base_delay * 2^n, max_delay)` before attempt `n + 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, the first one included. `0` behaves as `1`.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    /// Run `op` until it succeeds, fails with a non-conflict error, or the
    /// attempt budget is spent. `op` receives the 0-based attempt number.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> ResultEngine<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = ResultEngine<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            let err = match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            if err.kind() != ErrorKind::Conflict {
                return Err(err);
            }
            if attempt + 1 >= max_attempts {
                tracing::error!(
                    "{label}: giving up after {max_attempts} attempts, last error: {err}"
                );
                return Err(EngineError::Conflict(format!(
                    "{label}: gave up after {max_attempts} attempts"
                )));
            }
            let delay = self.delay_for(attempt);
            tracing::warn!(
                "{label}: conflict on attempt {}/{max_attempts}, retrying in {}ms: {err}",
                attempt + 1,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn fast() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 4,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        }
    }

    #[test]
    fn delay_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 10,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(50),
        };
        assert_eq!(policy.delay_for(0), Duration::from_millis(10));
        assert_eq!(policy.delay_for(1), Duration::from_millis(20));
        assert_eq!(policy.delay_for(2), Duration::from_millis(40));
        assert_eq!(policy.delay_for(3), Duration::from_millis(50));
        assert_eq!(policy.delay_for(64), Duration::from_millis(50));
    }

    #[tokio::test]
    async fn retries_conflicts_until_success() {
        let calls = &AtomicU32::new(0);
        let res = fast()
            .run("test", move |_| async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(EngineError::Conflict("busy".to_string()))
                } else {
                    Ok(42)
                }
            })
            .await;
        assert_eq!(res, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_with_conflict_after_budget() {
        let calls = &AtomicU32::new(0);
        let res: ResultEngine<()> = fast()
            .run("test", move |_| async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(EngineError::Conflict("busy".to_string()))
            })
            .await;
        assert_eq!(
            res,
            Err(EngineError::Conflict(
                "test: gave up after 4 attempts".to_string()
            ))
        );
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn does_not_retry_other_errors() {
        let calls = &AtomicU32::new(0);
        let res: ResultEngine<()> = fast()
            .run("test", move |_| async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(EngineError::KeyNotFound("account 999".to_string()))
            })
            .await;
        assert_eq!(res, Err(EngineError::KeyNotFound("account 999".to_string())));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_attempts_still_runs_once() {
        let policy = RetryPolicy {
            max_attempts: 0,
            ..fast()
        };
        let res = policy.run("test", |attempt| async move { Ok(attempt) }).await;
        assert_eq!(res, Ok(0));
    }
}
