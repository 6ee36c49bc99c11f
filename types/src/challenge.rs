//! Challenge and milestone domain entities.
//!
//! These are sourced read-only from chain state: the client never holds a
//! mutable copy, every list is re-fetched after a mutating action. The
//! helper predicates here mirror what the dashboard needs to decide which
//! actions to offer.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::amount::TokenAmount;
use crate::time::Timestamp;

/// Record of who completed a milestone first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MilestoneCompletion {
    pub participant: Address,
    pub timestamp: Timestamp,
}

/// A time-gated sub-goal within a challenge whose completion releases a
/// reward share.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: u64,
    pub name: String,
    pub reward: TokenAmount,
    pub unlock_date: Timestamp,
    pub is_unlocked: bool,
    pub is_completed: bool,
    pub first_completed_by: Option<MilestoneCompletion>,
}

impl Milestone {
    /// Whether a participant who has joined the owning challenge may
    /// complete this milestone.
    ///
    /// Membership is decided per challenge, not per milestone; the caller
    /// passes the (challenge id, participant) join result in.
    pub fn can_complete(&self, user_has_joined: bool) -> bool {
        self.is_unlocked && !self.is_completed && user_has_joined
    }
}

/// A stake-to-learn challenge as reported by the chain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: u64,
    pub name: String,
    pub track: String,
    pub creator: Address,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    /// Stake each participant locks on joining.
    pub stake_amount: TokenAmount,
    pub total_stake_needed: TokenAmount,
    pub total_stake_collected: TokenAmount,
    pub is_active: bool,
    /// Ordered by unlock date; milestone index on chain is the position here.
    pub milestones: Vec<Milestone>,
    pub participants: Vec<Address>,
}

impl Challenge {
    pub fn completed_milestone_count(&self) -> usize {
        self.milestones.iter().filter(|m| m.is_completed).count()
    }

    /// Completed milestones as a percentage of all milestones.
    ///
    /// 0.0 for a challenge with no milestones.
    pub fn progress_percentage(&self) -> f64 {
        if self.milestones.is_empty() {
            return 0.0;
        }
        self.completed_milestone_count() as f64 / self.milestones.len() as f64 * 100.0
    }

    /// Whether `address` is on the invited-participant list.
    pub fn is_participant(&self, address: &Address) -> bool {
        self.participants.contains(address)
    }

    /// Whether `address` may join: invited, not already joined, and the
    /// challenge is still active.
    pub fn can_join(&self, address: &Address, already_joined: bool) -> bool {
        self.is_participant(address) && !already_joined && self.is_active
    }

    /// Consistency check against the chain-state invariant: collected
    /// stake never exceeds needed stake, and no milestone is completed
    /// before it is unlocked.
    pub fn is_consistent(&self) -> bool {
        self.total_stake_collected <= self.total_stake_needed
            && self.milestones.iter().all(|m| m.is_unlocked || !m.is_completed)
    }
}

/// Platform-wallet summary backing the funds screen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WalletSummary {
    pub balance: TokenAmount,
    pub total_earned: TokenAmount,
    pub total_staked: TokenAmount,
}

/// Kind of platform-wallet ledger entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdraw,
    Stake,
    Reward,
}

/// A single entry in a user's platform transaction history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: String,
    pub kind: TransactionKind,
    pub amount: TokenAmount,
    pub timestamp: Timestamp,
    pub description: String,
    /// Name of the associated challenge, empty for plain deposits/withdrawals.
    pub challenge: String,
}
