//! Fundamental types for the CodeStake client.
//!
//! This crate defines the types shared across the chain and client crates:
//! addresses, fixed-point token amounts, timestamps, network identifiers,
//! and the challenge/milestone domain entities.

pub mod address;
pub mod amount;
pub mod challenge;
pub mod error;
pub mod network;
pub mod receipt;
pub mod time;

pub use address::{Address, AddressKind};
pub use amount::TokenAmount;
pub use challenge::{
    Challenge, Milestone, MilestoneCompletion, TransactionKind, TransactionRecord, WalletSummary,
};
pub use error::DomainError;
pub use network::NetworkId;
pub use receipt::{TxId, TxReceipt, TxStatus};
pub use time::Timestamp;
