//! Chain configuration with TOML file support.

use std::path::Path;

use serde::{Deserialize, Serialize};

use codestake_types::NetworkId;

use crate::error::ChainError;

/// Configuration for the chain access layer.
///
/// Can be loaded from a TOML file via [`ChainConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Environment selection is
/// deliberately small: which network to target and where the deployed
/// contract lives.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Which network the deployment targets.
    #[serde(default = "default_network")]
    pub network: NetworkId,

    /// Deployed CodeStake contract address on that network.
    pub contract_address: String,

    /// Flow Access REST endpoint. Defaults per network for Flow targets.
    #[serde(default)]
    pub access_node_url: Option<String>,

    /// Wallet bridge endpoint (Flow) or wallet JSON-RPC endpoint (EVM).
    pub wallet_url: String,

    /// Per-request HTTP timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// How long to wait for finality before reporting an unknown outcome.
    #[serde(default = "default_finality_timeout_secs")]
    pub finality_timeout_secs: u64,

    /// Interval between finality polls.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl ChainConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ChainError> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ChainError::Decode(format!("cannot read config file: {e}")))?;
        toml::from_str(&raw).map_err(|e| ChainError::Decode(format!("invalid config: {e}")))
    }

    /// The Flow access node to use: explicit setting, else the network
    /// default.
    pub fn access_node(&self) -> Result<String, ChainError> {
        if let Some(url) = &self.access_node_url {
            return Ok(url.clone());
        }
        self.network
            .default_access_node()
            .map(str::to_string)
            .ok_or_else(|| {
                ChainError::Unsupported(format!(
                    "no access node for network {}",
                    self.network.display_name()
                ))
            })
    }
}

fn default_network() -> NetworkId {
    NetworkId::FlowTestnet
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_finality_timeout_secs() -> u64 {
    60
}

fn default_poll_interval_ms() -> u64 {
    1500
}

fn default_log_format() -> String {
    "human".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_toml() {
        let cfg: ChainConfig = toml::from_str(
            r#"
            contract_address = "0x151494e9e083c718"
            wallet_url = "http://127.0.0.1:8701"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.network, NetworkId::FlowTestnet);
        assert_eq!(cfg.finality_timeout_secs, 60);
        assert_eq!(cfg.access_node().unwrap(), "https://rest-testnet.onflow.org");
    }

    #[test]
    fn evm_network_requires_explicit_access_node_only_for_flow() {
        let cfg: ChainConfig = toml::from_str(
            r#"
            network = { Evm = 11155111 }
            contract_address = "0x358aa13c52544eccef6b0add0f801012adad5ee3"
            wallet_url = "http://127.0.0.1:8545"
            "#,
        )
        .unwrap();
        assert!(cfg.access_node().is_err());
    }

    #[test]
    fn explicit_access_node_wins() {
        let cfg: ChainConfig = toml::from_str(
            r#"
            contract_address = "0x151494e9e083c718"
            wallet_url = "http://127.0.0.1:8701"
            access_node_url = "http://localhost:8888"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.access_node().unwrap(), "http://localhost:8888");
    }
}
