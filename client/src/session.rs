//! Wallet session lifecycle.
//!
//! A [`WalletSession`] tracks the connection state, the active address,
//! and the on-chain token balance, and publishes every change through a
//! `tokio::sync::watch` channel so UI layers can re-render on updates.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use codestake_chain::ChainAdapter;
use codestake_types::{Address, TokenAmount};

use crate::notify::Notifier;
use crate::provider::{AccountEvent, ProviderError, WalletProvider};

/// Where the session is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    /// Authentication is in flight.
    Connecting,
    Connected,
}

/// Point-in-time view of the session, published on every change.
#[derive(Clone, Debug, Default)]
pub struct SessionSnapshot {
    pub state: ConnectionState,
    pub address: Option<Address>,
    pub balance: TokenAmount,
}

impl SessionSnapshot {
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }
}

/// Tracks the wallet connection and keeps the balance current.
pub struct WalletSession {
    provider: Arc<dyn WalletProvider>,
    adapter: Arc<dyn ChainAdapter>,
    notifier: Arc<dyn Notifier>,
    tx: watch::Sender<SessionSnapshot>,
}

impl WalletSession {
    pub fn new(
        provider: Arc<dyn WalletProvider>,
        adapter: Arc<dyn ChainAdapter>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (tx, _) = watch::channel(SessionSnapshot::default());
        Self {
            provider,
            adapter,
            notifier,
            tx,
        }
    }

    /// Subscribe to session snapshots. The receiver immediately holds the
    /// current snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.tx.borrow().clone()
    }

    /// Prompt the wallet and establish a session.
    ///
    /// On failure the session returns to `Disconnected` and the error is
    /// reported through the notifier.
    pub async fn connect(&self) -> Result<Address, ProviderError> {
        self.tx.send_modify(|snapshot| {
            snapshot.state = ConnectionState::Connecting;
        });

        match self.provider.authenticate().await {
            Ok(address) => {
                tracing::info!(address = %address.short(), "wallet connected");
                self.tx.send_modify(|snapshot| {
                    snapshot.state = ConnectionState::Connected;
                    snapshot.address = Some(address.clone());
                });
                self.refresh_balance().await;
                self.notifier.success("Wallet connected");
                Ok(address)
            }
            Err(err) => {
                tracing::warn!(error = %err, "wallet connection failed");
                self.tx.send_replace(SessionSnapshot::default());
                self.notifier.error(&format!("Failed to connect wallet: {err}"));
                Err(err)
            }
        }
    }

    /// Drop the wallet authorization and reset the session.
    pub async fn disconnect(&self) {
        self.provider.unauthenticate().await;
        self.tx.send_replace(SessionSnapshot::default());
        tracing::info!("wallet disconnected");
    }

    /// Re-read the token balance for the active address.
    ///
    /// A failed read keeps the previously published balance; a stale value
    /// beats flashing zero at the user.
    pub async fn refresh_balance(&self) {
        let Some(address) = self.tx.borrow().address.clone() else {
            return;
        };
        match self.adapter.token_balance(&address).await {
            Ok(balance) => {
                self.tx.send_modify(|snapshot| {
                    snapshot.balance = balance;
                });
            }
            Err(err) => {
                tracing::warn!(error = %err, "balance refresh failed, keeping previous value");
            }
        }
    }

    /// Spawn a task that follows wallet-pushed account events until the
    /// wallet's event channel closes.
    pub fn run_account_watcher(self: Arc<Self>) -> JoinHandle<()> {
        let mut events = self.provider.subscribe_accounts();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(AccountEvent::Changed(address)) => {
                        tracing::info!(address = %address.short(), "wallet account changed");
                        self.tx.send_modify(|snapshot| {
                            snapshot.state = ConnectionState::Connected;
                            snapshot.address = Some(address.clone());
                            snapshot.balance = TokenAmount::ZERO;
                        });
                        self.refresh_balance().await;
                    }
                    Ok(AccountEvent::LoggedOut) => {
                        tracing::info!("wallet logged out");
                        self.tx.send_replace(SessionSnapshot::default());
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "account event stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// The connected address, if any.
    pub fn address(&self) -> Option<Address> {
        self.tx.borrow().address.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codestake_chain::{ChainError, NullAdapter};
    use codestake_types::NetworkId;

    use crate::notify::RecordingNotifier;
    use crate::provider::NullWalletProvider;

    fn addr() -> Address {
        Address::parse("0x151494e9e083c718").unwrap()
    }

    fn fixture() -> (
        Arc<NullWalletProvider>,
        Arc<NullAdapter>,
        Arc<RecordingNotifier>,
        WalletSession,
    ) {
        let provider = Arc::new(NullWalletProvider::new());
        let adapter = Arc::new(NullAdapter::new(NetworkId::FlowTestnet));
        let notifier = Arc::new(RecordingNotifier::new());
        let session = WalletSession::new(
            provider.clone(),
            adapter.clone(),
            notifier.clone(),
        );
        (provider, adapter, notifier, session)
    }

    #[tokio::test]
    async fn connect_publishes_address_and_balance() {
        let (provider, adapter, notifier, session) = fixture();
        provider.push_auth_outcome(Ok(addr()));
        adapter.set_balance(TokenAmount::from_whole(42));

        let connected = session.connect().await.unwrap();
        assert_eq!(connected, addr());

        let snapshot = session.snapshot();
        assert!(snapshot.is_connected());
        assert_eq!(snapshot.address, Some(addr()));
        assert_eq!(snapshot.balance, TokenAmount::from_whole(42));
        assert_eq!(notifier.successes(), vec!["Wallet connected"]);
    }

    #[tokio::test]
    async fn failed_connect_returns_to_disconnected() {
        let (provider, _adapter, notifier, session) = fixture();
        provider.push_auth_outcome(Err(ProviderError("declined".into())));

        assert!(session.connect().await.is_err());

        let snapshot = session.snapshot();
        assert_eq!(snapshot.state, ConnectionState::Disconnected);
        assert!(snapshot.address.is_none());
        assert_eq!(notifier.errors().len(), 1);
        assert!(notifier.errors()[0].contains("declined"));
    }

    #[tokio::test]
    async fn failed_balance_refresh_keeps_previous_value() {
        let (provider, adapter, _notifier, session) = fixture();
        provider.push_auth_outcome(Ok(addr()));
        adapter.set_balance(TokenAmount::from_whole(10));
        session.connect().await.unwrap();

        adapter.push_balance_outcome(Err(ChainError::Http("502".into())));
        session.refresh_balance().await;

        assert_eq!(session.snapshot().balance, TokenAmount::from_whole(10));
    }

    #[tokio::test]
    async fn disconnect_resets_snapshot_and_drops_wallet_auth() {
        let (provider, adapter, _notifier, session) = fixture();
        provider.push_auth_outcome(Ok(addr()));
        adapter.set_balance(TokenAmount::from_whole(5));
        session.connect().await.unwrap();

        session.disconnect().await;

        let snapshot = session.snapshot();
        assert_eq!(snapshot.state, ConnectionState::Disconnected);
        assert!(snapshot.address.is_none());
        assert_eq!(snapshot.balance, TokenAmount::ZERO);
        assert_eq!(provider.unauthenticate_calls(), 1);
    }

    #[tokio::test]
    async fn account_watcher_follows_wallet_events() {
        let (provider, adapter, _notifier, session) = fixture();
        let session = Arc::new(session);
        adapter.set_balance(TokenAmount::from_whole(7));

        let mut updates = session.subscribe();
        let handle = session.clone().run_account_watcher();

        provider.emit(AccountEvent::Changed(addr()));
        loop {
            updates.changed().await.unwrap();
            if updates.borrow().address == Some(addr()) {
                break;
            }
        }

        provider.emit(AccountEvent::LoggedOut);
        loop {
            updates.changed().await.unwrap();
            if updates.borrow().address.is_none() {
                break;
            }
        }

        handle.abort();
    }
}
