//! Network identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies which chain network the client is configured against.
///
/// Flow networks are named; EVM networks are identified by chain id, the
/// value `eth_chainId` reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkId {
    /// Flow production network.
    FlowMainnet,
    /// Flow public test network.
    FlowTestnet,
    /// An EVM network, by chain id.
    Evm(u64),
}

impl NetworkId {
    /// Human-readable name, used in wrong-network prompts.
    pub fn display_name(&self) -> String {
        match self {
            Self::FlowMainnet => "Flow Mainnet".to_string(),
            Self::FlowTestnet => "Flow Testnet".to_string(),
            Self::Evm(1) => "Ethereum Mainnet".to_string(),
            Self::Evm(11155111) => "Sepolia".to_string(),
            Self::Evm(id) => format!("EVM chain {id}"),
        }
    }

    /// Whether this is a Flow-family network.
    pub fn is_flow(&self) -> bool {
        matches!(self, Self::FlowMainnet | Self::FlowTestnet)
    }

    /// Default access-node endpoint for Flow networks.
    pub fn default_access_node(&self) -> Option<&'static str> {
        match self {
            Self::FlowMainnet => Some("https://rest-mainnet.onflow.org"),
            Self::FlowTestnet => Some("https://rest-testnet.onflow.org"),
            Self::Evm(_) => None,
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
