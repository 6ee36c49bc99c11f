//! The uniform chain backend interface.

use std::time::Duration;

use async_trait::async_trait;
use codestake_types::{Address, NetworkId, TokenAmount, TxId, TxReceipt};

use crate::catalog::{Operation, Query};
use crate::error::ChainError;

/// Handle to a submitted, not-yet-finalized transaction.
///
/// Dropping the handle does not retract the submission; the transaction may
/// still land on chain.
#[derive(Clone, Debug)]
pub struct PendingTx {
    pub tx_id: TxId,
}

/// Uniform async interface over the two chain backends.
///
/// Read queries may be retried freely. Submissions must never be retried
/// automatically: without idempotency keys a retry can double-spend.
#[async_trait]
pub trait ChainAdapter: Send + Sync {
    /// The network the wallet/backend is actually talking to right now.
    async fn active_network(&self) -> Result<NetworkId, ChainError>;

    /// Ask the wallet to switch networks. Fire-and-forget: success is never
    /// assumed, the next `active_network` call is authoritative.
    async fn request_network_switch(&self, target: NetworkId) -> Result<(), ChainError>;

    /// Native token balance of an account.
    async fn token_balance(&self, address: &Address) -> Result<TokenAmount, ChainError>;

    /// Execute a read-only query and return its result as plain JSON in
    /// the canonical wire shape (see [`crate::cadence::flatten`]).
    async fn execute_query(&self, query: &Query) -> Result<serde_json::Value, ChainError>;

    /// Encode and submit a state-mutating operation on behalf of `from`.
    async fn submit(&self, operation: &Operation, from: &Address) -> Result<PendingTx, ChainError>;

    /// Wait until the chain reports the transaction finalized or failed.
    ///
    /// `ChainError::Timeout` after `deadline` means the outcome is unknown,
    /// not that the transaction failed.
    async fn await_finality(
        &self,
        pending: &PendingTx,
        deadline: Duration,
    ) -> Result<TxReceipt, ChainError>;
}
