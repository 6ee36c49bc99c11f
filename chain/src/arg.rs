//! Typed call arguments.
//!
//! One logical argument vocabulary covers both backends; each backend
//! encodes it into its own wire format (JSON-Cadence in [`crate::cadence`],
//! ABI words in [`crate::abi`]). A typing mismatch against the deployed
//! contract is a hard integration failure, so the vocabulary is closed:
//! exactly the kinds the contract surface uses.

use codestake_types::{Address, TokenAmount};

/// A single typed argument to a contract call.
#[derive(Clone, Debug, PartialEq)]
pub enum CallArg {
    /// Cadence `String` / ABI `string`.
    String(String),
    /// Challenge id or milestone index — Cadence `Int` / ABI `uint256`.
    Id(u64),
    /// A duration in seconds — Cadence `UFix64` / ABI `uint256`.
    Seconds(u64),
    /// Token amount — Cadence `UFix64` / ABI `uint256` wei.
    Amount(TokenAmount),
    /// Account address — Cadence `Address` / ABI `address`.
    Address(Address),
    /// Cadence `[Address]` / ABI `address[]`.
    AddressList(Vec<Address>),
    /// Cadence `[String]` / ABI `string[]`.
    StringList(Vec<String>),
    /// Cadence `[UFix64]` / ABI `uint256[]`.
    AmountList(Vec<TokenAmount>),
}
