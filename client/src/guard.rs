//! Network requirement enforcement.
//!
//! A deployment targets exactly one network. Before any state-changing
//! operation the [`NetworkGuard`] reads the wallet's active network and
//! compares it against the requirement; a mismatch blocks the operation.

use std::sync::{Arc, Mutex};

use codestake_chain::ChainAdapter;
use codestake_types::NetworkId;

/// Result of a network check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NetworkStatus {
    pub is_correct: bool,
    pub required: NetworkId,
}

/// Compares the wallet's active network against the configured requirement.
pub struct NetworkGuard {
    adapter: Arc<dyn ChainAdapter>,
    required: NetworkId,
    last_observed: Mutex<Option<NetworkId>>,
}

impl NetworkGuard {
    pub fn new(adapter: Arc<dyn ChainAdapter>, required: NetworkId) -> Self {
        Self {
            adapter,
            required,
            last_observed: Mutex::new(None),
        }
    }

    pub fn required(&self) -> NetworkId {
        self.required
    }

    /// The network seen on the most recent successful check.
    pub fn last_observed(&self) -> Option<NetworkId> {
        *self.last_observed.lock().unwrap()
    }

    /// Read the wallet's active network and compare it to the requirement.
    ///
    /// An unreadable network is treated as wrong; state-changing operations
    /// must not proceed on an unverified network.
    pub async fn check(&self) -> NetworkStatus {
        match self.adapter.active_network().await {
            Ok(active) => {
                *self.last_observed.lock().unwrap() = Some(active);
                if active != self.required {
                    tracing::warn!(
                        active = %active,
                        required = %self.required,
                        "wallet is on the wrong network"
                    );
                }
                NetworkStatus {
                    is_correct: active == self.required,
                    required: self.required,
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "could not read active network");
                NetworkStatus {
                    is_correct: false,
                    required: self.required,
                }
            }
        }
    }

    /// Ask the wallet to switch to the required network.
    ///
    /// Fire-and-forget: the user decides in their wallet, and the next
    /// [`check`] observes whatever they chose. The cached observation is
    /// never updated here.
    ///
    /// [`check`]: NetworkGuard::check
    pub async fn request_switch(&self) {
        if let Err(err) = self.adapter.request_network_switch(self.required).await {
            tracing::warn!(error = %err, "network switch request failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codestake_chain::NullAdapter;

    #[tokio::test]
    async fn matching_network_passes() {
        let adapter = Arc::new(NullAdapter::new(NetworkId::FlowTestnet));
        let guard = NetworkGuard::new(adapter.clone(), NetworkId::FlowTestnet);

        let status = guard.check().await;
        assert!(status.is_correct);
        assert_eq!(guard.last_observed(), Some(NetworkId::FlowTestnet));
    }

    #[tokio::test]
    async fn mismatched_network_fails_and_records_observation() {
        let adapter = Arc::new(NullAdapter::new(NetworkId::FlowMainnet));
        let guard = NetworkGuard::new(adapter, NetworkId::FlowTestnet);

        let status = guard.check().await;
        assert!(!status.is_correct);
        assert_eq!(status.required, NetworkId::FlowTestnet);
        assert_eq!(guard.last_observed(), Some(NetworkId::FlowMainnet));
    }

    #[tokio::test]
    async fn switch_request_does_not_touch_the_cache() {
        let adapter = Arc::new(NullAdapter::new(NetworkId::Evm(1)));
        let guard = NetworkGuard::new(adapter.clone(), NetworkId::Evm(11155111));

        guard.request_switch().await;

        assert_eq!(guard.last_observed(), None);
        assert_eq!(
            adapter.recorded_switch_requests(),
            vec![NetworkId::Evm(11155111)]
        );
    }
}
