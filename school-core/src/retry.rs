//! Retry utilities for calls to external data sources.
//!
//! Every error is retried the same way. Backoff is linear: the wait after
//! attempt `n` is `base_delay * n`, so the defaults wait 1s then 2s.

use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Configuration for retry behavior.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    /// Unit of the linear backoff.
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryConfig {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// A single attempt, no waiting.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Attempts actually made; zero is treated as one.
    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Wait between attempt `attempt` and `attempt + 1` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

/// Failure after the last permitted attempt.
#[derive(Debug)]
pub struct RetryError<E> {
    pub attempts: u32,
    pub last_error: E,
}

impl<E> RetryError<E> {
    pub fn into_inner(self) -> E {
        self.last_error
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "operation failed after {} attempts: {}",
            self.attempts, self.last_error
        )
    }
}

impl<E> std::error::Error for RetryError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.last_error)
    }
}

/// Run `f` until it succeeds or `config.max_attempts` attempts have failed.
///
/// # Example
/// ```ignore
/// let rows = with_retry(&RetryConfig::default(), "fetch_sheet", || async {
///     client.fetch("Enseignants").await
/// })
/// .await?;
/// ```
pub async fn with_retry<F, Fut, T, E>(
    config: &RetryConfig,
    operation_name: &str,
    mut f: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let max_attempts = config.attempts();
    let mut attempt = 1;

    loop {
        match f().await {
            Ok(result) => {
                if attempt > 1 {
                    info!(
                        operation = operation_name,
                        attempt, "Call succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(error) => {
                if attempt >= max_attempts {
                    warn!(
                        operation = operation_name,
                        attempt,
                        error = %error,
                        "Call failed after max attempts"
                    );
                    return Err(RetryError {
                        attempts: attempt,
                        last_error: error,
                    });
                }

                let backoff = config.delay_after(attempt);
                warn!(
                    operation = operation_name,
                    attempt,
                    error = %error,
                    backoff_ms = backoff.as_millis() as u64,
                    "Call failed, retrying after backoff"
                );

                sleep(backoff).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[test]
    fn test_retry_config_default() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.base_delay, Duration::from_millis(1000));
    }

    #[test]
    fn test_backoff_is_linear() {
        let config = RetryConfig::default();
        assert_eq!(config.delay_after(1), Duration::from_millis(1000));
        assert_eq!(config.delay_after(2), Duration::from_millis(2000));
        assert_eq!(config.delay_after(3), Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_first_attempt() {
        let mut calls = 0;
        let result = with_retry(&RetryConfig::default(), "test_op", || {
            calls += 1;
            async { Ok::<_, String>(42) }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fails_twice_then_succeeds() {
        let mut calls = 0;
        let started = Instant::now();

        let result = with_retry(&RetryConfig::default(), "test_op", || {
            calls += 1;
            let n = calls;
            async move {
                if n < 3 {
                    Err(format!("transient failure {}", n))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls, 3);
        // 1s after the first failure, 2s after the second.
        let waited = started.elapsed();
        assert!(waited >= Duration::from_millis(3000));
        assert!(waited < Duration::from_millis(3100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_reports_last_error() {
        let mut calls = 0;
        let result = with_retry(&RetryConfig::default(), "test_op", || {
            calls += 1;
            let n = calls;
            async move { Err::<(), _>(format!("failure {}", n)) }
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(calls, 3);
        assert_eq!(err.attempts, 3);
        assert_eq!(err.last_error, "failure 3");
        assert_eq!(
            err.to_string(),
            "operation failed after 3 attempts: failure 3"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_still_calls_once() {
        let mut calls = 0;
        let config = RetryConfig::new(0, Duration::from_millis(10));
        let result = with_retry(&config, "test_op", || {
            calls += 1;
            async { Err::<(), _>("nope") }
        })
        .await;

        assert_eq!(calls, 1);
        assert_eq!(result.unwrap_err().attempts, 1);
    }
}
