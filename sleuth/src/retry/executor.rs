use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::config::RetryConfig;

/// Bounded exponential backoff policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }
}

impl RetryPolicy {
    /// Total attempts allowed. A configured value of 0 still makes one attempt.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay slept after the failure of attempt `attempt_index` (0-based):
    /// `min(max_delay, base_delay * 2^attempt_index)`.
    pub fn delay_for(&self, attempt_index: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt_index);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

#[derive(Debug, Error)]
pub enum RetryError<E> {
    #[error("gave up after {attempts} attempt(s): {last}")]
    Exhausted { attempts: u32, last: E },

    #[error("cancelled after {attempts} attempt(s)")]
    Cancelled { attempts: u32, last: Option<E> },
}

impl<E> RetryError<E> {
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. } | Self::Cancelled { attempts, .. } => *attempts,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Runs fallible async operations under a [`RetryPolicy`].
///
/// Every failure is retried; classification is left to the operation. The
/// cancellation token is checked before each attempt and raced against each
/// backoff sleep, so a cancelled caller never triggers another attempt.
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub async fn execute<T, E, F, Fut>(
        &self,
        label: &str,
        cancel: &CancellationToken,
        mut operation: F,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let max_attempts = self.policy.attempts();
        let mut attempts = 0;
        let mut last: Option<E> = None;

        loop {
            if cancel.is_cancelled() {
                tracing::debug!(operation = label, attempts, "Cancelled before attempt");
                return Err(RetryError::Cancelled { attempts, last });
            }

            attempts += 1;
            let error = match operation().await {
                Ok(value) => {
                    if attempts > 1 {
                        tracing::info!(operation = label, attempts, "Succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            if attempts >= max_attempts {
                tracing::error!(
                    operation = label,
                    attempts,
                    error = %error,
                    "Retry attempts exhausted"
                );
                return Err(RetryError::Exhausted {
                    attempts,
                    last: error,
                });
            }

            let delay = self.policy.delay_for(attempts - 1);
            tracing::warn!(
                operation = label,
                attempt = attempts,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Attempt failed, backing off"
            );
            last = Some(error);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!(operation = label, attempts, "Cancelled during backoff");
                    return Err(RetryError::Cancelled { attempts, last });
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}
