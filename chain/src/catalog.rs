//! The contract call catalog.
//!
//! The CodeStake contract surface expressed as data: one logical operation
//! or query, with its Cadence source for the Flow backend and its function
//! signature plus return layout for the EVM backend. Argument typing here
//! must match the deployed contract exactly on each backend; a mismatch is
//! a hard integration failure.

use codestake_types::{Address, TokenAmount};

use crate::abi::AbiType;
use crate::arg::CallArg;

// ── Operations (state-mutating) ─────────────────────────────────────────

/// A state-mutating contract operation.
#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
    CreateChallenge {
        name: String,
        track: String,
        duration_secs: u64,
        participants: Vec<Address>,
        milestone_names: Vec<String>,
        milestone_rewards: Vec<TokenAmount>,
        stake_amount: TokenAmount,
    },
    JoinChallenge {
        challenge_id: u64,
        stake_amount: TokenAmount,
    },
    CompleteMilestone {
        challenge_id: u64,
        milestone_index: u64,
    },
    Deposit {
        amount: TokenAmount,
    },
    Withdraw {
        amount: TokenAmount,
    },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateChallenge { .. } => "createChallenge",
            Self::JoinChallenge { .. } => "joinChallenge",
            Self::CompleteMilestone { .. } => "completeMilestone",
            Self::Deposit { .. } => "deposit",
            Self::Withdraw { .. } => "withdraw",
        }
    }

    /// Notification text on confirmed success.
    pub fn success_message(&self) -> &'static str {
        match self {
            Self::CreateChallenge { .. } => "Challenge created successfully!",
            Self::JoinChallenge { .. } => "Successfully joined the challenge!",
            Self::CompleteMilestone { .. } => "Milestone completed successfully!",
            Self::Deposit { .. } => "Deposit confirmed!",
            Self::Withdraw { .. } => "Withdrawal confirmed!",
        }
    }

    /// Arguments in contract declaration order, shared by both backends.
    pub fn args(&self) -> Vec<CallArg> {
        match self {
            Self::CreateChallenge {
                name,
                track,
                duration_secs,
                participants,
                milestone_names,
                milestone_rewards,
                stake_amount,
            } => vec![
                CallArg::String(name.clone()),
                CallArg::String(track.clone()),
                CallArg::Seconds(*duration_secs),
                CallArg::AddressList(participants.clone()),
                CallArg::StringList(milestone_names.clone()),
                CallArg::AmountList(milestone_rewards.clone()),
                CallArg::Amount(*stake_amount),
            ],
            Self::JoinChallenge {
                challenge_id,
                stake_amount,
            } => vec![CallArg::Id(*challenge_id), CallArg::Amount(*stake_amount)],
            Self::CompleteMilestone {
                challenge_id,
                milestone_index,
            } => vec![CallArg::Id(*challenge_id), CallArg::Id(*milestone_index)],
            Self::Deposit { amount } => vec![CallArg::Amount(*amount)],
            Self::Withdraw { amount } => vec![CallArg::Amount(*amount)],
        }
    }

    /// Cadence transaction source, with import placeholders the Flow
    /// backend substitutes from configuration.
    pub fn cadence_source(&self) -> &'static str {
        match self {
            Self::CreateChallenge { .. } => CADENCE_CREATE_CHALLENGE,
            Self::JoinChallenge { .. } => CADENCE_JOIN_CHALLENGE,
            Self::CompleteMilestone { .. } => CADENCE_COMPLETE_MILESTONE,
            Self::Deposit { .. } => CADENCE_DEPOSIT,
            Self::Withdraw { .. } => CADENCE_WITHDRAW,
        }
    }

    /// Canonical EVM function signature.
    pub fn evm_signature(&self) -> &'static str {
        match self {
            Self::CreateChallenge { .. } => {
                "createChallenge(string,string,uint256,address[],string[],uint256[],uint256)"
            }
            Self::JoinChallenge { .. } => "joinChallenge(uint256,uint256)",
            Self::CompleteMilestone { .. } => "completeMilestone(uint256,uint256)",
            Self::Deposit { .. } => "deposit(uint256)",
            Self::Withdraw { .. } => "withdraw(uint256)",
        }
    }
}

// ── Queries (read-only) ─────────────────────────────────────────────────

/// A read-only contract query.
#[derive(Clone, Debug, PartialEq)]
pub enum Query {
    GetChallenge { challenge_id: u64 },
    GetAllChallenges,
    GetWalletSummary { address: Address },
    GetUserTransactions { address: Address },
    HasUserJoined { challenge_id: u64, address: Address },
}

impl Query {
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetChallenge { .. } => "getChallenge",
            Self::GetAllChallenges => "getAllChallenges",
            Self::GetWalletSummary { .. } => "getWalletSummary",
            Self::GetUserTransactions { .. } => "getUserTransactions",
            Self::HasUserJoined { .. } => "hasUserJoined",
        }
    }

    pub fn args(&self) -> Vec<CallArg> {
        match self {
            Self::GetChallenge { challenge_id } => vec![CallArg::Id(*challenge_id)],
            Self::GetAllChallenges => vec![],
            Self::GetWalletSummary { address } | Self::GetUserTransactions { address } => {
                vec![CallArg::Address(address.clone())]
            }
            Self::HasUserJoined {
                challenge_id,
                address,
            } => vec![CallArg::Id(*challenge_id), CallArg::Address(address.clone())],
        }
    }

    pub fn cadence_source(&self) -> &'static str {
        match self {
            Self::GetChallenge { .. } => CADENCE_GET_CHALLENGE,
            Self::GetAllChallenges => CADENCE_GET_ALL_CHALLENGES,
            Self::GetWalletSummary { .. } => CADENCE_GET_WALLET_SUMMARY,
            Self::GetUserTransactions { .. } => CADENCE_GET_USER_TRANSACTIONS,
            Self::HasUserJoined { .. } => CADENCE_HAS_USER_JOINED,
        }
    }

    pub fn evm_signature(&self) -> &'static str {
        match self {
            Self::GetChallenge { .. } => "getChallenge(uint256)",
            Self::GetAllChallenges => "getAllChallenges()",
            Self::GetWalletSummary { .. } => "getWalletSummary(address)",
            Self::GetUserTransactions { .. } => "getUserTransactions(address)",
            Self::HasUserJoined { .. } => "hasUserJoined(uint256,address)",
        }
    }

    /// Expected ABI return layout for the EVM backend.
    ///
    /// `getChallenge` pairs the struct with an existence flag where Cadence
    /// returns an optional.
    pub fn evm_return_types(&self) -> Vec<AbiType> {
        match self {
            Self::GetChallenge { .. } => vec![AbiType::Bool, challenge_abi_type()],
            Self::GetAllChallenges => vec![AbiType::Array(Box::new(challenge_abi_type()))],
            Self::GetWalletSummary { .. } => vec![AbiType::Uint, AbiType::Uint, AbiType::Uint],
            Self::GetUserTransactions { .. } => {
                vec![AbiType::Array(Box::new(transaction_abi_type()))]
            }
            Self::HasUserJoined { .. } => vec![AbiType::Bool],
        }
    }
}

/// ABI layout of the contract's `Challenge` struct.
fn challenge_abi_type() -> AbiType {
    AbiType::Tuple(vec![
        AbiType::Uint,                              // id
        AbiType::String,                            // name
        AbiType::String,                            // track
        AbiType::Address,                           // creator
        AbiType::Uint,                              // startDate
        AbiType::Uint,                              // endDate
        AbiType::Uint,                              // stakeAmount
        AbiType::Uint,                              // totalStakeNeeded
        AbiType::Uint,                              // totalStakeCollected
        AbiType::Bool,                              // isActive
        AbiType::Array(Box::new(milestone_abi_type())),
        AbiType::Array(Box::new(AbiType::Address)), // participants
    ])
}

/// ABI layout of the contract's `Milestone` struct. A zero
/// `firstCompleter` address means nobody has completed it yet.
fn milestone_abi_type() -> AbiType {
    AbiType::Tuple(vec![
        AbiType::Uint,    // id
        AbiType::String,  // name
        AbiType::Uint,    // reward
        AbiType::Uint,    // unlockDate
        AbiType::Bool,    // isUnlocked
        AbiType::Bool,    // isCompleted
        AbiType::Address, // firstCompleter
        AbiType::Uint,    // firstCompletedAt
    ])
}

/// ABI layout of the contract's `Transaction` ledger entry.
fn transaction_abi_type() -> AbiType {
    AbiType::Tuple(vec![
        AbiType::String, // id
        AbiType::Uint,   // kind: 0 deposit, 1 withdraw, 2 stake, 3 reward
        AbiType::Uint,   // amount
        AbiType::Uint,   // timestamp
        AbiType::String, // description
        AbiType::String, // challenge
    ])
}

// ── Cadence sources ─────────────────────────────────────────────────────
//
// `0xCodeStake`, `0xFlowToken` and `0xFungibleToken` are substituted from
// configuration by the Flow backend before submission.

const CADENCE_CREATE_CHALLENGE: &str = r#"
import CodeStake from 0xCodeStake

transaction(
    name: String,
    track: String,
    duration: UFix64,
    participants: [Address],
    milestoneNames: [String],
    milestoneRewards: [UFix64],
    stakeAmount: UFix64
) {
    execute {
        CodeStake.createChallenge(
            name: name,
            track: track,
            duration: duration,
            participants: participants,
            milestoneNames: milestoneNames,
            milestoneRewards: milestoneRewards,
            stakeAmount: stakeAmount
        )
    }
}
"#;

const CADENCE_JOIN_CHALLENGE: &str = r#"
import CodeStake from 0xCodeStake

transaction(challengeId: Int, stakeAmount: UFix64) {
    execute {
        CodeStake.joinChallenge(challengeId: challengeId, stakeAmount: stakeAmount)
    }
}
"#;

const CADENCE_COMPLETE_MILESTONE: &str = r#"
import CodeStake from 0xCodeStake

transaction(challengeId: Int, milestoneIndex: Int) {
    execute {
        CodeStake.completeMilestone(challengeId: challengeId, milestoneIndex: milestoneIndex)
    }
}
"#;

const CADENCE_DEPOSIT: &str = r#"
import CodeStake from 0xCodeStake
import FlowToken from 0xFlowToken
import FungibleToken from 0xFungibleToken

transaction(amount: UFix64) {
    let flowVault: auth(FungibleToken.Withdraw) &FlowToken.Vault

    prepare(acct: auth(BorrowValue) &Account) {
        self.flowVault = acct.storage.borrow<auth(FungibleToken.Withdraw) &FlowToken.Vault>(
            from: /storage/flowTokenVault
        ) ?? panic("Could not borrow Flow token vault")
    }

    execute {
        CodeStake.deposit(from: <-self.flowVault.withdraw(amount: amount))
    }
}
"#;

const CADENCE_WITHDRAW: &str = r#"
import CodeStake from 0xCodeStake

transaction(amount: UFix64) {
    execute {
        CodeStake.withdraw(amount: amount)
    }
}
"#;

const CADENCE_GET_CHALLENGE: &str = r#"
import CodeStake from 0xCodeStake

access(all) fun main(challengeId: Int): CodeStake.Challenge? {
    return CodeStake.getChallenge(challengeId: challengeId)
}
"#;

const CADENCE_GET_ALL_CHALLENGES: &str = r#"
import CodeStake from 0xCodeStake

access(all) fun main(): [CodeStake.Challenge] {
    var challenges: [CodeStake.Challenge] = []
    var i = 0
    while i < CodeStake.challengeCounter {
        if let challenge = CodeStake.getChallenge(challengeId: i) {
            challenges.append(challenge)
        }
        i = i + 1
    }
    return challenges
}
"#;

const CADENCE_GET_WALLET_SUMMARY: &str = r#"
import CodeStake from 0xCodeStake

access(all) fun main(address: Address): CodeStake.WalletSummary? {
    return CodeStake.getWalletSummary(address: address)
}
"#;

const CADENCE_GET_USER_TRANSACTIONS: &str = r#"
import CodeStake from 0xCodeStake

access(all) fun main(address: Address): [CodeStake.Transaction]? {
    return CodeStake.getUserTransactions(address: address)
}
"#;

const CADENCE_HAS_USER_JOINED: &str = r#"
import CodeStake from 0xCodeStake

access(all) fun main(challengeId: Int, address: Address): Bool {
    return CodeStake.hasUserJoined(challengeId: challengeId, address: address)
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_args_match_declaration_order() {
        let op = Operation::JoinChallenge {
            challenge_id: 3,
            stake_amount: TokenAmount::from_whole(1),
        };
        assert_eq!(
            op.args(),
            vec![CallArg::Id(3), CallArg::Amount(TokenAmount::from_whole(1))]
        );
        assert_eq!(op.evm_signature(), "joinChallenge(uint256,uint256)");
    }

    #[test]
    fn create_challenge_arg_arity_matches_both_backends() {
        let op = Operation::CreateChallenge {
            name: "x".into(),
            track: "rust".into(),
            duration_secs: 86400,
            participants: vec![],
            milestone_names: vec![],
            milestone_rewards: vec![],
            stake_amount: TokenAmount::from_whole(5),
        };
        // Seven declared parameters on both backends.
        assert_eq!(op.args().len(), 7);
        assert_eq!(op.evm_signature().matches(',').count() + 1, 7);
        assert!(op.cadence_source().contains("stakeAmount: UFix64"));
    }

    #[test]
    fn query_sources_import_the_contract() {
        let q = Query::GetAllChallenges;
        assert!(q.cadence_source().contains("import CodeStake from 0xCodeStake"));
        assert!(q.args().is_empty());
    }

    #[test]
    fn challenge_abi_layout_is_dynamic_tuple() {
        // Challenge carries strings and nested arrays; it must be decoded
        // by offset, which the codec only does for dynamic tuples.
        match challenge_abi_type() {
            AbiType::Tuple(items) => assert_eq!(items.len(), 12),
            other => panic!("unexpected layout: {other:?}"),
        }
    }
}
