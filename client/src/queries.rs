//! Read-side domain queries.
//!
//! Both backends normalize query results to the same wire JSON: camelCase
//! keys, amounts as decimal strings, addresses as lowercase hex. Dates
//! arrive as integer seconds from the EVM backend and as fixed-point
//! decimal strings from Flow, so timestamp fields accept either. This
//! module decodes that wire into the domain types.
//!
//! A failed or undecodable read is always an error; there is no cached or
//! placeholder data to fall back on.

use std::sync::Arc;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use codestake_chain::{ChainAdapter, Query};
use codestake_types::{
    Address, Challenge, Milestone, MilestoneCompletion, Timestamp, TokenAmount, TransactionKind,
    TransactionRecord, WalletSummary,
};

use crate::error::StakeError;

// ── Wire field decoding ─────────────────────────────────────────────────

fn wire_amount<'de, D>(deserializer: D) -> Result<TokenAmount, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    TokenAmount::parse_decimal(&raw).map_err(serde::de::Error::custom)
}

fn wire_timestamp<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Seconds(u64),
        Decimal(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Seconds(secs) => Ok(Timestamp::new(secs)),
        Raw::Decimal(s) => {
            let whole = s.split('.').next().unwrap_or(&s);
            let secs = whole
                .parse::<u64>()
                .map_err(|_| serde::de::Error::custom(format!("bad timestamp: {s}")))?;
            Ok(Timestamp::new(secs))
        }
    }
}

// ── Wire shapes ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompletionWire {
    participant: Address,
    #[serde(deserialize_with = "wire_timestamp")]
    timestamp: Timestamp,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MilestoneWire {
    id: u64,
    name: String,
    #[serde(deserialize_with = "wire_amount")]
    reward: TokenAmount,
    #[serde(deserialize_with = "wire_timestamp")]
    unlock_date: Timestamp,
    is_unlocked: bool,
    is_completed: bool,
    first_completed_by: Option<CompletionWire>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChallengeWire {
    id: u64,
    name: String,
    track: String,
    creator: Address,
    #[serde(deserialize_with = "wire_timestamp")]
    start_date: Timestamp,
    #[serde(deserialize_with = "wire_timestamp")]
    end_date: Timestamp,
    #[serde(deserialize_with = "wire_amount")]
    stake_amount: TokenAmount,
    #[serde(deserialize_with = "wire_amount")]
    total_stake_needed: TokenAmount,
    #[serde(deserialize_with = "wire_amount")]
    total_stake_collected: TokenAmount,
    is_active: bool,
    milestones: Vec<MilestoneWire>,
    participants: Vec<Address>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryWire {
    #[serde(deserialize_with = "wire_amount")]
    balance: TokenAmount,
    #[serde(deserialize_with = "wire_amount")]
    total_earned: TokenAmount,
    #[serde(deserialize_with = "wire_amount")]
    total_staked: TokenAmount,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordWire {
    id: String,
    kind: TransactionKind,
    #[serde(deserialize_with = "wire_amount")]
    amount: TokenAmount,
    #[serde(deserialize_with = "wire_timestamp")]
    timestamp: Timestamp,
    description: String,
    challenge: String,
}

impl From<MilestoneWire> for Milestone {
    fn from(wire: MilestoneWire) -> Self {
        Self {
            id: wire.id,
            name: wire.name,
            reward: wire.reward,
            unlock_date: wire.unlock_date,
            is_unlocked: wire.is_unlocked,
            is_completed: wire.is_completed,
            first_completed_by: wire.first_completed_by.map(|c| MilestoneCompletion {
                participant: c.participant,
                timestamp: c.timestamp,
            }),
        }
    }
}

impl From<ChallengeWire> for Challenge {
    fn from(wire: ChallengeWire) -> Self {
        Self {
            id: wire.id,
            name: wire.name,
            track: wire.track,
            creator: wire.creator,
            start_date: wire.start_date,
            end_date: wire.end_date,
            stake_amount: wire.stake_amount,
            total_stake_needed: wire.total_stake_needed,
            total_stake_collected: wire.total_stake_collected,
            is_active: wire.is_active,
            milestones: wire.milestones.into_iter().map(Into::into).collect(),
            participants: wire.participants,
        }
    }
}

impl From<RecordWire> for TransactionRecord {
    fn from(wire: RecordWire) -> Self {
        Self {
            id: wire.id,
            kind: wire.kind,
            amount: wire.amount,
            timestamp: wire.timestamp,
            description: wire.description,
            challenge: wire.challenge,
        }
    }
}

// ── Query surface ───────────────────────────────────────────────────────

/// Read-only domain queries over a chain adapter.
pub struct DomainQueries {
    adapter: Arc<dyn ChainAdapter>,
}

impl DomainQueries {
    pub fn new(adapter: Arc<dyn ChainAdapter>) -> Self {
        Self { adapter }
    }

    async fn execute(&self, query: Query) -> Result<Value, StakeError> {
        self.adapter
            .execute_query(&query)
            .await
            .map_err(StakeError::read)
    }

    fn decode<T: for<'de> Deserialize<'de>>(value: Value) -> Result<T, StakeError> {
        serde_json::from_value(value).map_err(|e| StakeError::RemoteRead(e.to_string()))
    }

    /// Fetch one challenge, `None` if no challenge has that id.
    pub async fn get_challenge(&self, challenge_id: u64) -> Result<Option<Challenge>, StakeError> {
        let value = self.execute(Query::GetChallenge { challenge_id }).await?;
        if value.is_null() {
            return Ok(None);
        }
        let wire: ChallengeWire = Self::decode(value)?;
        Ok(Some(wire.into()))
    }

    /// Fetch every challenge on the platform.
    pub async fn get_all_challenges(&self) -> Result<Vec<Challenge>, StakeError> {
        let value = self.execute(Query::GetAllChallenges).await?;
        let wires: Vec<ChallengeWire> = Self::decode(value)?;
        Ok(wires.into_iter().map(Into::into).collect())
    }

    /// Fetch the platform-wallet summary for an address.
    pub async fn get_wallet_summary(&self, address: Address) -> Result<WalletSummary, StakeError> {
        let value = self.execute(Query::GetWalletSummary { address }).await?;
        let wire: SummaryWire = Self::decode(value)?;
        Ok(WalletSummary {
            balance: wire.balance,
            total_earned: wire.total_earned,
            total_staked: wire.total_staked,
        })
    }

    /// Fetch an address's platform transaction history, newest first as
    /// the contract reports it. A user with no history yields an empty
    /// list.
    pub async fn get_user_transactions(
        &self,
        address: Address,
    ) -> Result<Vec<TransactionRecord>, StakeError> {
        let value = self.execute(Query::GetUserTransactions { address }).await?;
        if value.is_null() {
            return Ok(Vec::new());
        }
        let wires: Vec<RecordWire> = Self::decode(value)?;
        Ok(wires.into_iter().map(Into::into).collect())
    }

    /// Whether `address` has joined (staked into) the challenge.
    ///
    /// Membership is keyed by challenge id and participant address.
    pub async fn has_user_joined(
        &self,
        challenge_id: u64,
        address: Address,
    ) -> Result<bool, StakeError> {
        let value = self
            .execute(Query::HasUserJoined {
                challenge_id,
                address,
            })
            .await?;
        Self::decode(value)
    }

    /// Whether `address` may complete the milestone at `milestone_index`:
    /// the milestone must be unlocked, not yet completed, and the address
    /// must have joined the owning challenge.
    pub async fn can_complete_milestone(
        &self,
        challenge: &Challenge,
        milestone_index: usize,
        address: Address,
    ) -> Result<bool, StakeError> {
        let Some(milestone) = challenge.milestones.get(milestone_index) else {
            return Ok(false);
        };
        let joined = self.has_user_joined(challenge.id, address).await?;
        Ok(milestone.can_complete(joined))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codestake_chain::NullAdapter;
    use codestake_types::NetworkId;
    use serde_json::json;

    fn queries_with(adapter: Arc<NullAdapter>) -> DomainQueries {
        DomainQueries::new(adapter)
    }

    fn addr() -> Address {
        Address::parse("0x151494e9e083c718").unwrap()
    }

    fn challenge_json() -> Value {
        json!({
            "id": 3,
            "name": "30 days of Rust",
            "track": "systems",
            "creator": "0x151494e9e083c718",
            "startDate": "1700000000.00000000",
            "endDate": 1702592000,
            "stakeAmount": "5.0",
            "totalStakeNeeded": "10.0",
            "totalStakeCollected": "5.0",
            "isActive": true,
            "milestones": [{
                "id": 0,
                "name": "week one",
                "reward": "1.5",
                "unlockDate": 1700604800,
                "isUnlocked": true,
                "isCompleted": false,
                "firstCompletedBy": null
            }],
            "participants": ["0x151494e9e083c718", "0x7e60df042a9c0868"]
        })
    }

    #[tokio::test]
    async fn decodes_a_challenge_from_either_backend_shape() {
        let adapter = Arc::new(NullAdapter::new(NetworkId::FlowTestnet));
        adapter.set_query_response("getChallenge", challenge_json());

        let challenge = queries_with(adapter)
            .get_challenge(3)
            .await
            .unwrap()
            .expect("challenge exists");

        assert_eq!(challenge.id, 3);
        assert_eq!(challenge.start_date, Timestamp::new(1_700_000_000));
        assert_eq!(challenge.end_date, Timestamp::new(1_702_592_000));
        assert_eq!(challenge.stake_amount, TokenAmount::from_whole(5));
        assert_eq!(challenge.milestones.len(), 1);
        assert_eq!(
            challenge.milestones[0].reward,
            TokenAmount::parse_decimal("1.5").unwrap()
        );
        assert!(challenge.milestones[0].first_completed_by.is_none());
    }

    #[tokio::test]
    async fn missing_challenge_is_none() {
        let adapter = Arc::new(NullAdapter::new(NetworkId::FlowTestnet));
        adapter.set_query_response("getChallenge", Value::Null);

        let result = queries_with(adapter).get_challenge(99).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn null_transaction_history_is_empty() {
        let adapter = Arc::new(NullAdapter::new(NetworkId::FlowTestnet));
        adapter.set_query_response("getUserTransactions", Value::Null);

        let records = queries_with(adapter)
            .get_user_transactions(addr())
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn transaction_kinds_decode_from_wire_names() {
        let adapter = Arc::new(NullAdapter::new(NetworkId::FlowTestnet));
        adapter.set_query_response(
            "getUserTransactions",
            json!([{
                "id": "tx-1",
                "kind": "reward",
                "amount": "2.5",
                "timestamp": 1700000000u64,
                "description": "milestone reward",
                "challenge": "30 days of Rust"
            }]),
        );

        let records = queries_with(adapter)
            .get_user_transactions(addr())
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, TransactionKind::Reward);
        assert_eq!(records[0].amount, TokenAmount::parse_decimal("2.5").unwrap());
    }

    #[tokio::test]
    async fn undecodable_wire_is_a_remote_read_error() {
        let adapter = Arc::new(NullAdapter::new(NetworkId::FlowTestnet));
        adapter.set_query_response("getAllChallenges", json!([{ "id": "not a number" }]));

        let err = queries_with(adapter).get_all_challenges().await.unwrap_err();
        assert!(matches!(err, StakeError::RemoteRead(_)));
    }

    #[tokio::test]
    async fn milestone_completion_needs_membership() {
        let adapter = Arc::new(NullAdapter::new(NetworkId::FlowTestnet));
        adapter.set_query_response("hasUserJoined", json!(false));
        let queries = queries_with(adapter);

        let wire: ChallengeWire = serde_json::from_value(challenge_json()).unwrap();
        let challenge: Challenge = wire.into();

        let allowed = queries
            .can_complete_milestone(&challenge, 0, addr())
            .await
            .unwrap();
        assert!(!allowed);
    }

    #[tokio::test]
    async fn out_of_range_milestone_index_is_not_completable() {
        let adapter = Arc::new(NullAdapter::new(NetworkId::FlowTestnet));
        let queries = queries_with(adapter.clone());

        let wire: ChallengeWire = serde_json::from_value(challenge_json()).unwrap();
        let challenge: Challenge = wire.into();

        let allowed = queries
            .can_complete_milestone(&challenge, 7, addr())
            .await
            .unwrap();
        assert!(!allowed);
        // no membership lookup for a milestone that does not exist
        assert_eq!(adapter.chain_call_count(), 0);
    }
}
