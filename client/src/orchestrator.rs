//! The transaction pipeline.
//!
//! Every state-changing operation flows through the same stages, in order:
//! session precondition, network check, local validation, submission,
//! finality wait, then notification and an optional data refresh. A stage
//! failure stops the pipeline; stages before submission cost zero chain
//! calls beyond the single network read.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;

use codestake_chain::{ChainAdapter, Operation};
use codestake_types::{TxId, TxStatus};

use crate::error::{Precondition, StakeError};
use crate::guard::NetworkGuard;
use crate::notify::Notifier;
use crate::session::WalletSession;

/// Async callback run once after each confirmed operation, typically to
/// re-fetch challenge lists and balances.
pub type RefreshHook = Box<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

const DEFAULT_FINALITY_TIMEOUT: Duration = Duration::from_secs(60);

/// Runs operations through the submission pipeline.
pub struct TransactionOrchestrator {
    session: Arc<WalletSession>,
    guard: Arc<NetworkGuard>,
    adapter: Arc<dyn ChainAdapter>,
    notifier: Arc<dyn Notifier>,
    refresh: Option<RefreshHook>,
    finality_timeout: Duration,
}

impl TransactionOrchestrator {
    pub fn new(
        session: Arc<WalletSession>,
        guard: Arc<NetworkGuard>,
        adapter: Arc<dyn ChainAdapter>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            session,
            guard,
            adapter,
            notifier,
            refresh: None,
            finality_timeout: DEFAULT_FINALITY_TIMEOUT,
        }
    }

    /// Override how long to wait for finality before giving up with an
    /// unknown outcome.
    pub fn with_finality_timeout(mut self, timeout: Duration) -> Self {
        self.finality_timeout = timeout;
        self
    }

    /// Install a hook to run once after every confirmed operation.
    pub fn with_refresh(mut self, hook: RefreshHook) -> Self {
        self.refresh = Some(hook);
        self
    }

    /// Run one operation through the pipeline.
    ///
    /// Returns the transaction id once the chain confirms it. An error
    /// after submission but before confirmation is reported as
    /// [`StakeError::UnknownOutcome`]; the operation may still land.
    pub async fn submit(&self, operation: Operation) -> Result<TxId, StakeError> {
        let snapshot = self.session.snapshot();
        let Some(from) = snapshot.address.clone() else {
            self.notifier.error("Please connect your wallet first");
            return Err(Precondition::NotConnected.into());
        };

        let status = self.guard.check().await;
        if !status.is_correct {
            self.notifier.error(&format!(
                "Please switch to the {} network",
                status.required.display_name()
            ));
            return Err(Precondition::WrongNetwork {
                required: status.required,
            }
            .into());
        }

        crate::validate::validate_operation(&operation, snapshot.balance)?;

        tracing::info!(
            operation = operation.name(),
            from = %from.short(),
            "submitting transaction"
        );

        let pending = match self.adapter.submit(&operation, &from).await {
            Ok(pending) => pending,
            Err(err) => {
                let classified = StakeError::write(err);
                self.notifier.error(&classified.to_string());
                return Err(classified);
            }
        };

        let receipt = match self
            .adapter
            .await_finality(&pending, self.finality_timeout)
            .await
        {
            Ok(receipt) => receipt,
            Err(err) => {
                tracing::warn!(
                    tx_id = %pending.tx_id,
                    error = %err,
                    "lost track of a submitted transaction"
                );
                self.notifier
                    .error("Transaction submitted but its outcome is unknown");
                return Err(StakeError::UnknownOutcome {
                    tx_id: pending.tx_id.clone(),
                });
            }
        };

        match receipt.status {
            TxStatus::Sealed => {
                tracing::info!(tx_id = %receipt.tx_id, "transaction sealed");
                self.notifier.success(operation.success_message());
                if let Some(refresh) = &self.refresh {
                    refresh().await;
                }
                self.session.refresh_balance().await;
                Ok(receipt.tx_id)
            }
            TxStatus::Failed => {
                let reason = receipt
                    .error
                    .unwrap_or_else(|| "transaction reverted".to_string());
                tracing::warn!(tx_id = %receipt.tx_id, %reason, "transaction failed");
                self.notifier.error(&reason);
                Err(StakeError::RemoteWrite(reason))
            }
        }
    }
}
