//! Client orchestration for the CodeStake platform.
//!
//! This crate ties a wallet provider and a chain adapter together into the
//! surface an application embeds:
//! - [`WalletSession`] — connection lifecycle, active address, balance.
//! - [`NetworkGuard`] — enforces the deployment's network requirement.
//! - [`TransactionOrchestrator`] — the validate/submit/confirm pipeline
//!   every state-changing operation goes through.
//! - [`DomainQueries`] — typed read access to challenges, wallet
//!   summaries, and transaction history.

pub mod error;
pub mod guard;
pub mod logging;
pub mod notify;
pub mod orchestrator;
pub mod provider;
pub mod queries;
pub mod session;
pub mod validate;

pub use error::{Precondition, StakeError};
pub use guard::{NetworkGuard, NetworkStatus};
pub use notify::{Notifier, RecordingNotifier, TracingNotifier};
pub use orchestrator::{RefreshHook, TransactionOrchestrator};
pub use provider::{AccountEvent, NullWalletProvider, ProviderError, WalletProvider};
pub use queries::DomainQueries;
pub use session::{ConnectionState, SessionSnapshot, WalletSession};
pub use validate::validate_operation;
