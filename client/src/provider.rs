//! Wallet provider abstraction.
//!
//! The provider owns the relationship with the user's wallet software:
//! authentication, deauthentication, and the stream of account changes the
//! wallet pushes (user switched accounts, user logged out elsewhere).

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::broadcast;

use codestake_types::Address;

/// Account lifecycle events pushed by the wallet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccountEvent {
    /// The wallet's active account changed.
    Changed(Address),
    /// The wallet logged out.
    LoggedOut,
}

/// Error raised by a wallet provider during authentication.
#[derive(Debug, Clone, thiserror::Error)]
#[error("wallet provider error: {0}")]
pub struct ProviderError(pub String);

/// Interface to the user's wallet software.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Prompt the wallet for authentication and return the active address.
    async fn authenticate(&self) -> Result<Address, ProviderError>;

    /// Drop the wallet authorization.
    async fn unauthenticate(&self);

    /// Subscribe to account events pushed by the wallet.
    fn subscribe_accounts(&self) -> broadcast::Receiver<AccountEvent>;
}

// ── Test double ─────────────────────────────────────────────────────────

struct NullProviderState {
    auth_outcomes: VecDeque<Result<Address, ProviderError>>,
    authenticate_calls: usize,
    unauthenticate_calls: usize,
}

/// A programmable [`WalletProvider`] for tests. Authentication outcomes
/// are scripted; account events are emitted on demand.
pub struct NullWalletProvider {
    state: Mutex<NullProviderState>,
    events: broadcast::Sender<AccountEvent>,
}

impl NullWalletProvider {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            state: Mutex::new(NullProviderState {
                auth_outcomes: VecDeque::new(),
                authenticate_calls: 0,
                unauthenticate_calls: 0,
            }),
            events,
        }
    }

    /// Queue the outcome of the next `authenticate` call.
    pub fn push_auth_outcome(&self, outcome: Result<Address, ProviderError>) {
        self.state.lock().unwrap().auth_outcomes.push_back(outcome);
    }

    /// Emit an account event to all subscribers.
    pub fn emit(&self, event: AccountEvent) {
        let _ = self.events.send(event);
    }

    pub fn authenticate_calls(&self) -> usize {
        self.state.lock().unwrap().authenticate_calls
    }

    pub fn unauthenticate_calls(&self) -> usize {
        self.state.lock().unwrap().unauthenticate_calls
    }
}

impl Default for NullWalletProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WalletProvider for NullWalletProvider {
    async fn authenticate(&self) -> Result<Address, ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.authenticate_calls += 1;
        match state.auth_outcomes.pop_front() {
            Some(outcome) => outcome,
            None => Err(ProviderError("no scripted authentication".into())),
        }
    }

    async fn unauthenticate(&self) {
        self.state.lock().unwrap().unauthenticate_calls += 1;
    }

    fn subscribe_accounts(&self) -> broadcast::Receiver<AccountEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> Address {
        Address::parse("0x151494e9e083c718").unwrap()
    }

    #[tokio::test]
    async fn scripted_outcomes_pop_in_order() {
        let provider = NullWalletProvider::new();
        provider.push_auth_outcome(Ok(addr()));
        provider.push_auth_outcome(Err(ProviderError("declined".into())));

        assert_eq!(provider.authenticate().await.unwrap(), addr());
        assert!(provider.authenticate().await.is_err());
        assert_eq!(provider.authenticate_calls(), 2);
    }

    #[tokio::test]
    async fn emitted_events_reach_subscribers() {
        let provider = NullWalletProvider::new();
        let mut rx = provider.subscribe_accounts();
        provider.emit(AccountEvent::LoggedOut);
        assert_eq!(rx.recv().await.unwrap(), AccountEvent::LoggedOut);
    }
}
