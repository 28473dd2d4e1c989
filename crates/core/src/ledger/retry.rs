//! Retry coordination for transient store conflicts.

use std::future::Future;
use std::time::Duration;

use ledgerline_shared::config::{BackoffKind, LedgerConfig};
use tokio::time::Instant;
use tracing::warn;

use super::error::LedgerError;

/// Backoff growth between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backoff {
    /// `base * attempt`.
    #[default]
    Linear,
    /// `base * 2^(attempt - 1)`.
    Exponential,
}

impl From<BackoffKind> for Backoff {
    fn from(kind: BackoffKind) -> Self {
        match kind {
            BackoffKind::Linear => Self::Linear,
            BackoffKind::Exponential => Self::Exponential,
        }
    }
}

/// How often and how patiently a unit of work is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts including the first one. Values below 1 behave like 1.
    pub max_attempts: u32,
    /// Delay unit.
    pub base_delay: Duration,
    /// Growth of the delay.
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            backoff: Backoff::Linear,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy.
    #[must_use]
    pub const fn new(max_attempts: u32, base_delay: Duration, backoff: Backoff) -> Self {
        Self {
            max_attempts,
            base_delay,
            backoff,
        }
    }

    /// A policy that never retries.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self::new(1, Duration::ZERO, Backoff::Linear)
    }

    /// Builds the policy from the `ledger` config section.
    #[must_use]
    pub fn from_config(config: &LedgerConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.backoff_base_ms),
            config.backoff.into(),
        )
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let attempt = attempt.max(1);
        match self.backoff {
            Backoff::Linear => self.base_delay.saturating_mul(attempt),
            Backoff::Exponential => {
                let factor = 1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX);
                self.base_delay.saturating_mul(factor)
            }
        }
    }

    /// Runs `attempt` until it succeeds, fails permanently, or the attempts
    /// are used up.
    ///
    /// Only errors for which [`LedgerError::is_retryable`] holds are retried.
    /// When `deadline` is set, no retry is scheduled whose delay would end
    /// after it; the last error is returned instead.
    ///
    /// # Errors
    ///
    /// Returns the error of the last attempt made.
    pub async fn run<T, F, Fut>(
        &self,
        deadline: Option<Instant>,
        mut attempt: F,
    ) -> Result<T, LedgerError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, LedgerError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut current = 1;

        loop {
            let err = match attempt(current).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_retryable() || current >= max_attempts {
                return Err(err);
            }

            let delay = self.delay_for(current);
            if deadline.is_some_and(|deadline| Instant::now() + delay > deadline) {
                warn!(
                    attempt = current,
                    error = %err,
                    "Deadline reached, not retrying"
                );
                return Err(err);
            }

            warn!(
                attempt = current,
                max_attempts,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "Transient conflict, retrying"
            );
            tokio::time::sleep(delay).await;
            current += 1;
        }
    }
}
