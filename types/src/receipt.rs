//! Transaction identifiers and finalized results.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A submitted transaction's chain-assigned identifier.
///
/// A 64-hex-char Flow transaction id or a 66-char EVM transaction hash;
/// opaque to this layer beyond display.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxId(String);

impl TxId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Final status of a transaction once the chain reports it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxStatus {
    /// Finalized successfully (Flow SEALED / EVM status 0x1).
    Sealed,
    /// Finalized but failed during execution.
    Failed,
}

/// The finalized result of a single submit-and-await call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_id: TxId,
    pub status: TxStatus,
    /// Execution error detail, when the chain reports one.
    pub error: Option<String>,
}

impl TxReceipt {
    pub fn is_success(&self) -> bool {
        self.status == TxStatus::Sealed
    }
}
