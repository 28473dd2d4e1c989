//! Parallel write harness.
//!
//! Fires the same transaction request several times at once to exercise the
//! store under contention. Every branch goes through the full service path,
//! retries included, after a random start delay.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use ledgerline_shared::types::TransactionId;
use tracing::{info, warn};

use super::error::LedgerError;
use super::service::TransactionService;
use super::store::LedgerStore;
use super::types::TransactionRequest;

/// Result of a fan-out.
#[derive(Debug, Default)]
pub struct FanOutOutcome {
    /// IDs of the branches that committed, in branch order.
    pub ids: Vec<TransactionId>,
    /// Errors of the branches that failed, in branch order.
    pub failures: Vec<LedgerError>,
}

impl FanOutOutcome {
    /// Number of branches that ran.
    pub fn attempted(&self) -> usize {
        self.ids.len() + self.failures.len()
    }

    /// Summarizes the failures when some, but not all, branches failed.
    pub fn partial_failure(&self) -> Option<LedgerError> {
        let first = self.failures.first()?;
        Some(LedgerError::PartialFanOutFailure {
            succeeded: self.ids.len(),
            failed: self.failures.len(),
            source: Box::new(first.clone()),
        })
    }
}

impl<S: LedgerStore + 'static> TransactionService<S> {
    /// Records `template` `count` times in parallel.
    ///
    /// Branches do not share state and one failing does not cancel the
    /// others. Each starts after a random delay of up to the configured
    /// jitter.
    ///
    /// # Errors
    ///
    /// Returns `PartialFanOutFailure` when `count > 0` and no branch
    /// succeeded. Partial success is reported through the outcome.
    pub async fn create_transactions_concurrently(
        self: &Arc<Self>,
        template: TransactionRequest,
        count: usize,
    ) -> Result<FanOutOutcome, LedgerError> {
        let max_jitter_ms = u64::try_from(self.max_jitter.as_millis()).unwrap_or(u64::MAX);

        let handles: Vec<_> = (0..count)
            .map(|branch| {
                let service = Arc::clone(self);
                let jitter = Duration::from_millis(rand::random_range(0..=max_jitter_ms));
                tokio::spawn(async move {
                    tokio::time::sleep(jitter).await;
                    let result = service.create_transaction(template).await;
                    if let Err(e) = &result {
                        warn!(branch, error = %e, "Parallel write failed");
                    }
                    result
                })
            })
            .collect();

        let mut outcome = FanOutOutcome::default();
        for joined in join_all(handles).await {
            match joined {
                Ok(Ok(id)) => outcome.ids.push(id),
                Ok(Err(e)) => outcome.failures.push(e),
                Err(e) => outcome
                    .failures
                    .push(LedgerError::Internal(format!("write task failed: {e}"))),
            }
        }

        info!(
            account_id = %template.account_id,
            attempted = count,
            succeeded = outcome.ids.len(),
            failed = outcome.failures.len(),
            "Parallel writes finished"
        );

        if outcome.ids.is_empty()
            && let Some(error) = outcome.partial_failure()
        {
            return Err(error);
        }

        Ok(outcome)
    }
}
