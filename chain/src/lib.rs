//! Chain access layer for the CodeStake client.
//!
//! Everything the client needs to talk to a deployed CodeStake contract:
//! - The [`ChainAdapter`] trait — one uniform async interface over both
//!   supported backends.
//! - [`FlowAdapter`] — Cadence scripts and transactions over the Flow
//!   Access REST API plus the wallet bridge.
//! - [`EvmAdapter`] — ABI-encoded contract calls over a wallet provider's
//!   JSON-RPC endpoint.
//! - The call catalog ([`Operation`], [`Query`]) — the contract surface as
//!   data, with per-backend encodings.
//! - [`NullAdapter`] — a deterministic, programmable test double.

pub mod abi;
pub mod adapter;
pub mod arg;
pub mod cadence;
pub mod catalog;
pub mod config;
pub mod error;
pub mod evm;
pub mod flow;
pub mod null;

pub use adapter::{ChainAdapter, PendingTx};
pub use arg::CallArg;
pub use catalog::{Operation, Query};
pub use config::ChainConfig;
pub use error::ChainError;
pub use evm::EvmAdapter;
pub use flow::FlowAdapter;
pub use null::NullAdapter;
