//! Pre-submit validation.
//!
//! Every rule here runs before anything touches the chain; a validation
//! failure costs zero network calls. Balance checks use the session's
//! published balance, so a stale value can still let an insufficient stake
//! through — the contract enforces the real limit.

use codestake_chain::Operation;
use codestake_types::TokenAmount;

use crate::error::StakeError;

fn invalid(field: &'static str, reason: impl Into<String>) -> StakeError {
    StakeError::Validation {
        field,
        reason: reason.into(),
    }
}

fn require_positive(field: &'static str, amount: TokenAmount) -> Result<(), StakeError> {
    if amount == TokenAmount::ZERO {
        return Err(invalid(field, "must be greater than zero"));
    }
    Ok(())
}

fn require_affordable(
    field: &'static str,
    amount: TokenAmount,
    balance: TokenAmount,
) -> Result<(), StakeError> {
    if amount > balance {
        return Err(invalid(
            field,
            format!("exceeds available balance of {balance}"),
        ));
    }
    Ok(())
}

/// Check an operation against the local rules, given the wallet's current
/// balance.
pub fn validate_operation(operation: &Operation, balance: TokenAmount) -> Result<(), StakeError> {
    match operation {
        Operation::CreateChallenge {
            name,
            track,
            duration_secs,
            participants,
            milestone_names,
            milestone_rewards,
            stake_amount,
        } => {
            if name.trim().is_empty() {
                return Err(invalid("name", "must not be empty"));
            }
            if track.trim().is_empty() {
                return Err(invalid("track", "must not be empty"));
            }
            if *duration_secs == 0 {
                return Err(invalid("duration", "must be greater than zero"));
            }
            require_positive("stakeAmount", *stake_amount)?;
            require_affordable("stakeAmount", *stake_amount, balance)?;
            if participants.len() < 2 {
                return Err(invalid("participants", "at least two participants required"));
            }
            if milestone_names.is_empty() {
                return Err(invalid("milestones", "at least one milestone required"));
            }
            if milestone_names.len() != milestone_rewards.len() {
                return Err(invalid(
                    "milestones",
                    "each milestone needs exactly one reward",
                ));
            }
            Ok(())
        }
        Operation::JoinChallenge { stake_amount, .. } => {
            require_positive("stakeAmount", *stake_amount)?;
            require_affordable("stakeAmount", *stake_amount, balance)
        }
        Operation::CompleteMilestone { .. } => Ok(()),
        Operation::Deposit { amount } => {
            require_positive("amount", *amount)?;
            require_affordable("amount", *amount, balance)
        }
        // Withdrawals draw on the platform balance, which only the contract
        // knows; the wallet balance is irrelevant here.
        Operation::Withdraw { amount } => require_positive("amount", *amount),
    }
}
