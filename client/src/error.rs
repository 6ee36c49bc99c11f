//! Error taxonomy for the orchestration layer.
//!
//! Chain transport errors ([`ChainError`]) are classified at this boundary
//! into caller-facing categories: the caller of a read wants to know the
//! read failed, the caller of a write needs to know whether the write
//! definitely failed or merely has an unknown outcome.

use codestake_chain::ChainError;
use codestake_types::{NetworkId, TxId};

/// A condition that must hold before an operation is even attempted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Precondition {
    /// No wallet is connected.
    #[error("no wallet connected")]
    NotConnected,
    /// The wallet is on a different network than the deployment requires.
    #[error("wrong network, {required} required")]
    WrongNetwork { required: NetworkId },
}

/// Errors surfaced by the orchestration layer.
#[derive(Debug, thiserror::Error)]
pub enum StakeError {
    #[error(transparent)]
    Precondition(#[from] Precondition),

    /// A field of the request failed validation. Nothing was sent.
    #[error("invalid {field}: {reason}")]
    Validation {
        field: &'static str,
        reason: String,
    },

    /// A read-only query failed. Safe to retry.
    #[error("query failed: {0}")]
    RemoteRead(String),

    /// A state-changing operation definitely did not take effect.
    #[error("transaction failed: {0}")]
    RemoteWrite(String),

    /// A state-changing operation was submitted but its outcome could not
    /// be confirmed. It may or may not have taken effect.
    #[error("outcome of transaction {tx_id} unknown")]
    UnknownOutcome { tx_id: TxId },
}

impl StakeError {
    /// Classify a chain error raised by a read-only query.
    pub fn read(err: ChainError) -> Self {
        Self::RemoteRead(err.to_string())
    }

    /// Classify a chain error raised before a transaction was accepted.
    ///
    /// A wallet rejection carries the user's reason verbatim so the UI can
    /// show exactly what the wallet reported.
    pub fn write(err: ChainError) -> Self {
        match err {
            ChainError::Rejected(message) => Self::RemoteWrite(message),
            other => Self::RemoteWrite(other.to_string()),
        }
    }
}
