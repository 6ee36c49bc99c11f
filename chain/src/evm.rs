//! EVM backend — ABI-encoded contract calls over the wallet provider's
//! JSON-RPC endpoint.
//!
//! Reads go through `eth_call`; writes through `eth_sendTransaction`, which
//! the wallet signs (this layer never holds keys). Decoded results are
//! normalized into the same wire JSON the Flow backend produces, so the
//! client decodes one shape regardless of backend.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy_primitives::{Address as EvmAddress, U256};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::time::{sleep, Instant};

use codestake_types::{Address, AddressKind, NetworkId, TokenAmount, TxId, TxReceipt, TxStatus};

use crate::abi::{self, AbiValue};
use crate::adapter::{ChainAdapter, PendingTx};
use crate::arg::CallArg;
use crate::catalog::{Operation, Query};
use crate::config::ChainConfig;
use crate::error::ChainError;

/// EIP-1193 error code for a user-rejected request.
const USER_REJECTED: i64 = 4001;

/// EVM chain backend.
pub struct EvmAdapter {
    http: reqwest::Client,
    rpc_url: String,
    contract: EvmAddress,
    poll_interval: Duration,
    request_id: AtomicU64,
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope {
    result: Option<Value>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

impl EvmAdapter {
    pub fn new(config: &ChainConfig) -> Result<Self, ChainError> {
        if config.network.is_flow() {
            return Err(ChainError::Unsupported(format!(
                "EvmAdapter cannot target {}",
                config.network.display_name()
            )));
        }

        let contract: EvmAddress = config
            .contract_address
            .parse()
            .map_err(|e| ChainError::Decode(format!("invalid contract address: {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ChainError::Http(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            rpc_url: config.wallet_url.clone(),
            contract,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            request_id: AtomicU64::new(1),
        })
    }

    /// Send a JSON-RPC request and return the `result` field.
    async fn rpc_call(&self, method: &str, params: Value) -> Result<Value, ChainError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": self.request_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChainError::Http(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ChainError::Http(format!(
                "rpc endpoint returned HTTP {}",
                response.status()
            )));
        }

        let envelope: RpcEnvelope = response
            .json()
            .await
            .map_err(|e| ChainError::Decode(format!("invalid JSON-RPC response: {e}")))?;

        if let Some(err) = envelope.error {
            if err.code == USER_REJECTED {
                return Err(ChainError::Rejected(err.message));
            }
            return Err(ChainError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        envelope
            .result
            .ok_or_else(|| ChainError::Decode("JSON-RPC response missing result".into()))
    }

    fn hex_quantity(value: &Value) -> Result<u128, ChainError> {
        let raw = value
            .as_str()
            .and_then(|s| s.strip_prefix("0x"))
            .ok_or_else(|| ChainError::Decode(format!("expected hex quantity, got {value}")))?;
        u128::from_str_radix(raw, 16)
            .map_err(|e| ChainError::Decode(format!("invalid hex quantity: {e}")))
    }

    fn hex_bytes(value: &Value) -> Result<Vec<u8>, ChainError> {
        let raw = value
            .as_str()
            .and_then(|s| s.strip_prefix("0x"))
            .ok_or_else(|| ChainError::Decode(format!("expected hex data, got {value}")))?;
        hex::decode(raw).map_err(|e| ChainError::Decode(format!("invalid hex data: {e}")))
    }
}

/// Convert catalog arguments into ABI values. Amounts widen to wei.
fn abi_args(args: &[CallArg]) -> Result<Vec<AbiValue>, ChainError> {
    args.iter().map(abi_arg).collect()
}

fn abi_arg(arg: &CallArg) -> Result<AbiValue, ChainError> {
    Ok(match arg {
        CallArg::String(s) => AbiValue::String(s.clone()),
        CallArg::Id(n) | CallArg::Seconds(n) => AbiValue::Uint(U256::from(*n)),
        CallArg::Amount(a) => AbiValue::Uint(U256::from(a.to_wei())),
        CallArg::Address(a) => AbiValue::Address(evm_address(a)?),
        CallArg::AddressList(items) => AbiValue::Array(
            items
                .iter()
                .map(|a| evm_address(a).map(AbiValue::Address))
                .collect::<Result<_, _>>()?,
        ),
        CallArg::StringList(items) => {
            AbiValue::Array(items.iter().cloned().map(AbiValue::String).collect())
        }
        CallArg::AmountList(items) => AbiValue::Array(
            items
                .iter()
                .map(|a| AbiValue::Uint(U256::from(a.to_wei())))
                .collect(),
        ),
    })
}

fn evm_address(address: &Address) -> Result<EvmAddress, ChainError> {
    if address.kind() != AddressKind::Evm {
        return Err(ChainError::Unsupported(format!(
            "not an EVM address: {address}"
        )));
    }
    address
        .as_str()
        .parse()
        .map_err(|e| ChainError::Decode(format!("invalid EVM address: {e}")))
}

// ── Wire mapping ────────────────────────────────────────────────────────
//
// Decoded ABI values become the canonical wire JSON (camelCase keys,
// amounts as 8-decimal strings, addresses as lowercase hex).

fn to_wire(query: &Query, values: &[AbiValue]) -> Result<Value, ChainError> {
    match query {
        Query::GetChallenge { .. } => {
            let [exists, challenge] = values else {
                return Err(ChainError::Decode("getChallenge arity mismatch".into()));
            };
            if !exists.as_bool()? {
                return Ok(Value::Null);
            }
            challenge_wire(challenge)
        }
        Query::GetAllChallenges => {
            let [list] = values else {
                return Err(ChainError::Decode("getAllChallenges arity mismatch".into()));
            };
            list.as_slice()?
                .iter()
                .map(challenge_wire)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        Query::GetWalletSummary { .. } => {
            let [balance, earned, staked] = values else {
                return Err(ChainError::Decode("getWalletSummary arity mismatch".into()));
            };
            Ok(json!({
                "balance": amount_wire(balance)?,
                "totalEarned": amount_wire(earned)?,
                "totalStaked": amount_wire(staked)?,
            }))
        }
        Query::GetUserTransactions { .. } => {
            let [list] = values else {
                return Err(ChainError::Decode(
                    "getUserTransactions arity mismatch".into(),
                ));
            };
            list.as_slice()?
                .iter()
                .map(record_wire)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        Query::HasUserJoined { .. } => {
            let [joined] = values else {
                return Err(ChainError::Decode("hasUserJoined arity mismatch".into()));
            };
            Ok(Value::Bool(joined.as_bool()?))
        }
    }
}

fn challenge_wire(value: &AbiValue) -> Result<Value, ChainError> {
    let fields = value.as_slice()?;
    let [id, name, track, creator, start, end, stake, needed, collected, active, milestones, participants] =
        fields
    else {
        return Err(ChainError::Decode("challenge tuple arity mismatch".into()));
    };

    Ok(json!({
        "id": id.as_u64()?,
        "name": name.as_str()?,
        "track": track.as_str()?,
        "creator": address_wire(creator)?,
        "startDate": start.as_u64()?,
        "endDate": end.as_u64()?,
        "stakeAmount": amount_wire(stake)?,
        "totalStakeNeeded": amount_wire(needed)?,
        "totalStakeCollected": amount_wire(collected)?,
        "isActive": active.as_bool()?,
        "milestones": milestones
            .as_slice()?
            .iter()
            .map(milestone_wire)
            .collect::<Result<Vec<_>, _>>()?,
        "participants": participants
            .as_slice()?
            .iter()
            .map(address_wire)
            .collect::<Result<Vec<_>, _>>()?,
    }))
}

fn milestone_wire(value: &AbiValue) -> Result<Value, ChainError> {
    let fields = value.as_slice()?;
    let [id, name, reward, unlock, unlocked, completed, first_completer, first_at] = fields else {
        return Err(ChainError::Decode("milestone tuple arity mismatch".into()));
    };

    let completer = first_completer.as_address()?;
    let first_completed_by = if completer == EvmAddress::ZERO {
        Value::Null
    } else {
        json!({
            "participant": address_wire(first_completer)?,
            "timestamp": first_at.as_u64()?,
        })
    };

    Ok(json!({
        "id": id.as_u64()?,
        "name": name.as_str()?,
        "reward": amount_wire(reward)?,
        "unlockDate": unlock.as_u64()?,
        "isUnlocked": unlocked.as_bool()?,
        "isCompleted": completed.as_bool()?,
        "firstCompletedBy": first_completed_by,
    }))
}

fn record_wire(value: &AbiValue) -> Result<Value, ChainError> {
    let fields = value.as_slice()?;
    let [id, kind, amount, timestamp, description, challenge] = fields else {
        return Err(ChainError::Decode("transaction tuple arity mismatch".into()));
    };

    let kind = match kind.as_u64()? {
        0 => "deposit",
        1 => "withdraw",
        2 => "stake",
        3 => "reward",
        other => {
            return Err(ChainError::Decode(format!(
                "unknown transaction kind: {other}"
            )))
        }
    };

    Ok(json!({
        "id": id.as_str()?,
        "kind": kind,
        "amount": amount_wire(amount)?,
        "timestamp": timestamp.as_u64()?,
        "description": description.as_str()?,
        "challenge": challenge.as_str()?,
    }))
}

fn amount_wire(value: &AbiValue) -> Result<Value, ChainError> {
    let wei = value.as_u128()?;
    Ok(Value::String(TokenAmount::from_wei(wei).to_decimal_string()))
}

fn address_wire(value: &AbiValue) -> Result<Value, ChainError> {
    let addr = value.as_address()?;
    Ok(Value::String(format!("0x{}", hex::encode(addr.as_slice()))))
}

#[async_trait]
impl ChainAdapter for EvmAdapter {
    async fn active_network(&self) -> Result<NetworkId, ChainError> {
        let result = self.rpc_call("eth_chainId", json!([])).await?;
        let chain_id = Self::hex_quantity(&result)? as u64;
        Ok(NetworkId::Evm(chain_id))
    }

    async fn request_network_switch(&self, target: NetworkId) -> Result<(), ChainError> {
        let NetworkId::Evm(chain_id) = target else {
            return Err(ChainError::Unsupported(format!(
                "cannot switch an EVM wallet to {}",
                target.display_name()
            )));
        };
        // Fire-and-forget: the wallet shows its own prompt. Callers re-check
        // via active_network rather than trusting this result.
        self.rpc_call(
            "wallet_switchEthereumChain",
            json!([{ "chainId": format!("0x{chain_id:x}") }]),
        )
        .await?;
        Ok(())
    }

    async fn token_balance(&self, address: &Address) -> Result<TokenAmount, ChainError> {
        let addr = evm_address(address)?;
        let result = self
            .rpc_call(
                "eth_getBalance",
                json!([format!("0x{}", hex::encode(addr.as_slice())), "latest"]),
            )
            .await?;
        Ok(TokenAmount::from_wei(Self::hex_quantity(&result)?))
    }

    async fn execute_query(&self, query: &Query) -> Result<Value, ChainError> {
        let data = abi::encode_call(query.evm_signature(), &abi_args(&query.args())?);
        let result = self
            .rpc_call(
                "eth_call",
                json!([
                    {
                        "to": format!("0x{}", hex::encode(self.contract.as_slice())),
                        "data": format!("0x{}", hex::encode(&data)),
                    },
                    "latest"
                ]),
            )
            .await?;

        let payload = Self::hex_bytes(&result)?;
        let values = abi::decode(&query.evm_return_types(), &payload)?;
        to_wire(query, &values)
    }

    async fn submit(&self, operation: &Operation, from: &Address) -> Result<PendingTx, ChainError> {
        let sender = evm_address(from)?;
        let data = abi::encode_call(operation.evm_signature(), &abi_args(&operation.args())?);

        let result = self
            .rpc_call(
                "eth_sendTransaction",
                json!([{
                    "from": format!("0x{}", hex::encode(sender.as_slice())),
                    "to": format!("0x{}", hex::encode(self.contract.as_slice())),
                    "data": format!("0x{}", hex::encode(&data)),
                }]),
            )
            .await?;

        let tx_hash = result
            .as_str()
            .ok_or_else(|| ChainError::Decode("transaction hash is not a string".into()))?;

        tracing::debug!(op = operation.name(), tx_id = tx_hash, "transaction submitted");
        Ok(PendingTx {
            tx_id: TxId::new(tx_hash),
        })
    }

    async fn await_finality(
        &self,
        pending: &PendingTx,
        deadline: Duration,
    ) -> Result<TxReceipt, ChainError> {
        let started = Instant::now();

        loop {
            if started.elapsed() >= deadline {
                return Err(ChainError::Timeout);
            }

            let result = self
                .rpc_call(
                    "eth_getTransactionReceipt",
                    json!([pending.tx_id.as_str()]),
                )
                .await;

            match result {
                Ok(Value::Null) => sleep(self.poll_interval).await,
                Ok(receipt) => {
                    let mined_ok = receipt
                        .get("status")
                        .and_then(Value::as_str)
                        .map(|s| s == "0x1")
                        .ok_or_else(|| {
                            ChainError::Decode("receipt missing status field".into())
                        })?;
                    return Ok(TxReceipt {
                        tx_id: pending.tx_id.clone(),
                        status: if mined_ok {
                            TxStatus::Sealed
                        } else {
                            TxStatus::Failed
                        },
                        error: (!mined_ok).then(|| "execution reverted".to_string()),
                    });
                }
                Err(ChainError::Http(_)) => sleep(self.poll_interval).await,
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abi_args_reject_flow_addresses() {
        let flow = Address::parse("0x151494e9e083c718").unwrap();
        assert!(matches!(
            abi_args(&[CallArg::Address(flow)]),
            Err(ChainError::Unsupported(_))
        ));
    }

    #[test]
    fn amounts_widen_to_wei() {
        let arg = abi_arg(&CallArg::Amount(TokenAmount::parse_decimal("1.5").unwrap())).unwrap();
        assert_eq!(arg, AbiValue::Uint(U256::from(1_500_000_000_000_000_000u128)));
    }

    #[test]
    fn wallet_summary_wire_shape() {
        let q = Query::GetWalletSummary {
            address: Address::parse("0x358aa13c52544eccef6b0add0f801012adad5ee3").unwrap(),
        };
        let values = vec![
            AbiValue::Uint(U256::from(10_000_000_000_000_000_000u128)),
            AbiValue::Uint(U256::from(2_000_000_000_000_000_000u128)),
            AbiValue::Uint(U256::from(5_000_000_000_000_000_000u128)),
        ];
        assert_eq!(
            to_wire(&q, &values).unwrap(),
            json!({ "balance": "10.0", "totalEarned": "2.0", "totalStaked": "5.0" })
        );
    }

    #[test]
    fn absent_challenge_maps_to_null() {
        let q = Query::GetChallenge { challenge_id: 9 };
        let values = vec![
            AbiValue::Bool(false),
            AbiValue::Tuple(vec![]), // ignored when exists is false
        ];
        assert_eq!(to_wire(&q, &values).unwrap(), Value::Null);
    }

    #[test]
    fn milestone_zero_completer_maps_to_null() {
        let m = AbiValue::Tuple(vec![
            AbiValue::Uint(U256::from(0u64)),
            AbiValue::String("setup".into()),
            AbiValue::Uint(U256::from(1_000_000_000_000_000_000u128)),
            AbiValue::Uint(U256::from(1_700_000_000u64)),
            AbiValue::Bool(true),
            AbiValue::Bool(false),
            AbiValue::Address(EvmAddress::ZERO),
            AbiValue::Uint(U256::from(0u64)),
        ]);
        let wire = milestone_wire(&m).unwrap();
        assert_eq!(wire["firstCompletedBy"], Value::Null);
        assert_eq!(wire["reward"], "1.0");
        assert_eq!(wire["isUnlocked"], true);
    }

    #[test]
    fn record_wire_maps_kind_codes() {
        let r = AbiValue::Tuple(vec![
            AbiValue::String("tx-1".into()),
            AbiValue::Uint(U256::from(2u64)),
            AbiValue::Uint(U256::from(1_000_000_000_000_000_000u128)),
            AbiValue::Uint(U256::from(1_700_000_000u64)),
            AbiValue::String("stake for challenge".into()),
            AbiValue::String("Rust track".into()),
        ]);
        assert_eq!(record_wire(&r).unwrap()["kind"], "stake");

        let bad = AbiValue::Tuple(vec![
            AbiValue::String("tx-1".into()),
            AbiValue::Uint(U256::from(9u64)),
            AbiValue::Uint(U256::ZERO),
            AbiValue::Uint(U256::ZERO),
            AbiValue::String(String::new()),
            AbiValue::String(String::new()),
        ]);
        assert!(record_wire(&bad).is_err());
    }
}
