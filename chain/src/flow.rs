//! Flow backend — Cadence scripts over the Access REST API, transactions
//! through the wallet bridge.
//!
//! Scripts run directly against the access node. State-mutating
//! transactions cannot be signed here (keys live in the user's wallet), so
//! they are handed to the wallet bridge — the local endpoint the wallet
//! provider exposes for building, signing and broadcasting a transaction on
//! the user's behalf — which returns the transaction id to poll.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::time::{sleep, Instant};

use codestake_types::{Address, AddressKind, NetworkId, TokenAmount, TxId, TxReceipt, TxStatus};

use crate::adapter::{ChainAdapter, PendingTx};
use crate::cadence;
use crate::catalog::{Operation, Query};
use crate::config::ChainConfig;
use crate::error::ChainError;

/// FLOW token balance read, run outside the contract catalog.
const BALANCE_SCRIPT: &str = r#"
import FlowToken from 0xFlowToken
import FungibleToken from 0xFungibleToken

access(all) fun main(address: Address): UFix64 {
    let account = getAccount(address)
    let vaultRef = account.capabilities.get<&{FungibleToken.Balance}>(/public/flowTokenBalance)
        .borrow()
        ?? panic("Could not borrow Balance reference to the Vault")
    return vaultRef.balance
}
"#;

/// Standard token contract addresses per Flow network.
fn token_imports(network: NetworkId) -> (&'static str, &'static str) {
    match network {
        NetworkId::FlowMainnet => ("0x1654653399040a61", "0xf233dcee88fe0abe"),
        _ => ("0x7e60df042a9c0868", "0x9a0766d93b6608b7"),
    }
}

/// Flow chain backend.
pub struct FlowAdapter {
    http: reqwest::Client,
    access_node: String,
    wallet_url: String,
    network: NetworkId,
    contract_address: String,
    poll_interval: Duration,
}

impl FlowAdapter {
    pub fn new(config: &ChainConfig) -> Result<Self, ChainError> {
        if !config.network.is_flow() {
            return Err(ChainError::Unsupported(format!(
                "FlowAdapter cannot target {}",
                config.network.display_name()
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ChainError::Http(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            access_node: config.access_node()?,
            wallet_url: config.wallet_url.clone(),
            network: config.network,
            contract_address: config.contract_address.clone(),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        })
    }

    /// Substitute import placeholders into a Cadence source.
    fn prepare_source(&self, source: &str) -> String {
        let (flow_token, fungible_token) = token_imports(self.network);
        source
            .replace("0xCodeStake", &self.contract_address)
            .replace("0xFlowToken", flow_token)
            .replace("0xFungibleToken", fungible_token)
    }

    /// Base64 script + base64 JSON-Cadence arguments, the Access API wire
    /// form.
    fn encode_request(&self, source: &str, args: &[crate::arg::CallArg]) -> Value {
        let script = BASE64.encode(self.prepare_source(source));
        let arguments: Vec<String> = args
            .iter()
            .map(|a| BASE64.encode(cadence::encode_arg(a).to_string()))
            .collect();
        json!({ "script": script, "arguments": arguments })
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, ChainError> {
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ChainError::Http(format!("request failed: {e}")))?;

        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|e| ChainError::Decode(format!("invalid JSON response: {e}")))?;

        if !status.is_success() {
            let message = payload
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("request refused")
                .to_string();
            if status.is_client_error() {
                return Err(ChainError::Rejected(message));
            }
            return Err(ChainError::Rpc {
                code: status.as_u16() as i64,
                message,
            });
        }

        Ok(payload)
    }

    /// Run a Cadence script and return its flattened result.
    async fn run_script(
        &self,
        source: &str,
        args: &[crate::arg::CallArg],
    ) -> Result<Value, ChainError> {
        let url = format!("{}/v1/scripts?block_height=sealed", self.access_node);
        let body = self.encode_request(source, args);
        let payload = self.post_json(&url, &body).await?;

        // The access node wraps the JSON-Cadence result in base64.
        let encoded = payload
            .as_str()
            .ok_or_else(|| ChainError::Decode("script result is not a string".into()))?;
        let raw = BASE64
            .decode(encoded)
            .map_err(|e| ChainError::Decode(format!("script result is not base64: {e}")))?;
        let value: Value = serde_json::from_slice(&raw)
            .map_err(|e| ChainError::Decode(format!("script result is not JSON: {e}")))?;
        cadence::flatten(&value)
    }
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct TransactionResult {
    status: String,
    #[serde(default)]
    error_message: String,
}

#[derive(Debug, Deserialize)]
struct NetworkResponse {
    network: String,
}

#[async_trait]
impl ChainAdapter for FlowAdapter {
    async fn active_network(&self) -> Result<NetworkId, ChainError> {
        let url = format!("{}/v1/network", self.wallet_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ChainError::Http(format!("request failed: {e}")))?;
        let payload: NetworkResponse = response
            .json()
            .await
            .map_err(|e| ChainError::Decode(format!("invalid network response: {e}")))?;

        match payload.network.as_str() {
            "mainnet" => Ok(NetworkId::FlowMainnet),
            "testnet" => Ok(NetworkId::FlowTestnet),
            other => Err(ChainError::Decode(format!("unknown flow network: {other}"))),
        }
    }

    async fn request_network_switch(&self, target: NetworkId) -> Result<(), ChainError> {
        // Flow wallets pick their network in the wallet UI; there is no
        // programmatic switch request.
        Err(ChainError::Unsupported(format!(
            "switch to {} in your wallet",
            target.display_name()
        )))
    }

    async fn token_balance(&self, address: &Address) -> Result<TokenAmount, ChainError> {
        if address.kind() != AddressKind::Flow {
            return Err(ChainError::Unsupported(format!(
                "not a Flow address: {address}"
            )));
        }
        let result = self
            .run_script(
                BALANCE_SCRIPT,
                &[crate::arg::CallArg::Address(address.clone())],
            )
            .await?;
        let decimal = result
            .as_str()
            .ok_or_else(|| ChainError::Decode("balance is not a UFix64 string".into()))?;
        TokenAmount::parse_decimal(decimal)
            .map_err(|e| ChainError::Decode(format!("invalid balance value: {e}")))
    }

    async fn execute_query(&self, query: &Query) -> Result<Value, ChainError> {
        self.run_script(query.cadence_source(), &query.args()).await
    }

    async fn submit(&self, operation: &Operation, from: &Address) -> Result<PendingTx, ChainError> {
        if from.kind() != AddressKind::Flow {
            return Err(ChainError::Unsupported(format!(
                "not a Flow address: {from}"
            )));
        }

        let url = format!("{}/v1/transactions", self.wallet_url);
        let mut body = self.encode_request(operation.cadence_source(), &operation.args());
        body.as_object_mut()
            .expect("encode_request builds an object")
            .insert("proposer".to_string(), json!(from.as_str()));

        let payload = self.post_json(&url, &body).await?;
        let response: SubmitResponse = serde_json::from_value(payload)
            .map_err(|e| ChainError::Decode(format!("invalid submit response: {e}")))?;

        tracing::debug!(op = operation.name(), tx_id = %response.id, "transaction submitted");
        Ok(PendingTx {
            tx_id: TxId::new(response.id),
        })
    }

    async fn await_finality(
        &self,
        pending: &PendingTx,
        deadline: Duration,
    ) -> Result<TxReceipt, ChainError> {
        let url = format!(
            "{}/v1/transaction_results/{}",
            self.access_node,
            pending.tx_id.as_str()
        );
        let started = Instant::now();

        loop {
            if started.elapsed() >= deadline {
                return Err(ChainError::Timeout);
            }

            let response = self
                .http
                .get(&url)
                .send()
                .await
                .map_err(|e| ChainError::Http(format!("request failed: {e}")))?;
            let result: TransactionResult = response
                .json()
                .await
                .map_err(|e| ChainError::Decode(format!("invalid result response: {e}")))?;

            match result.status.to_ascii_uppercase().as_str() {
                "SEALED" => {
                    let status = if result.error_message.is_empty() {
                        TxStatus::Sealed
                    } else {
                        TxStatus::Failed
                    };
                    return Ok(TxReceipt {
                        tx_id: pending.tx_id.clone(),
                        status,
                        error: (!result.error_message.is_empty())
                            .then(|| result.error_message.clone()),
                    });
                }
                "EXPIRED" => {
                    return Ok(TxReceipt {
                        tx_id: pending.tx_id.clone(),
                        status: TxStatus::Failed,
                        error: Some("transaction expired before sealing".into()),
                    });
                }
                // PENDING / FINALIZED / EXECUTED: keep polling.
                _ => sleep(self.poll_interval).await,
            }
        }
    }
}
