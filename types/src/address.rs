//! Account address type covering both supported chain families.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Which chain family an address belongs to, derived from its length.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressKind {
    /// Flow account address — `0x` followed by 16 hex characters.
    Flow,
    /// EVM account address — `0x` followed by 40 hex characters.
    Evm,
}

/// A chain account address, always `0x`-prefixed lowercase hex.
///
/// Shape is validated on construction; invalid input never becomes an
/// `Address` value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parse and validate an address string.
    ///
    /// Accepts mixed-case hex (EVM checksummed addresses included) and
    /// normalizes to lowercase.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        let hex_part = trimmed
            .strip_prefix("0x")
            .ok_or_else(|| DomainError::InvalidAddress(format!("missing 0x prefix: {trimmed}")))?;

        if !matches!(hex_part.len(), 16 | 40) {
            return Err(DomainError::InvalidAddress(format!(
                "expected 16 or 40 hex characters, got {}",
                hex_part.len()
            )));
        }
        if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DomainError::InvalidAddress(format!(
                "non-hex character in {trimmed}"
            )));
        }

        Ok(Self(format!("0x{}", hex_part.to_ascii_lowercase())))
    }

    /// Which chain family this address belongs to.
    pub fn kind(&self) -> AddressKind {
        // Length is fixed by `parse`: "0x" + 16 or 40 hex chars.
        if self.0.len() == 18 {
            AddressKind::Flow
        } else {
            AddressKind::Evm
        }
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Truncated display form (`0x1234…abcd`) used by UI layers.
    pub fn short(&self) -> String {
        format!("{}…{}", &self.0[..6], &self.0[self.0.len() - 4..])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Address {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Address> for String {
    fn from(a: Address) -> Self {
        a.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_flow_address() {
        let addr = Address::parse("0x151494e9e083c718").unwrap();
        assert_eq!(addr.kind(), AddressKind::Flow);
        assert_eq!(addr.as_str(), "0x151494e9e083c718");
    }

    #[test]
    fn parse_evm_address_normalizes_case() {
        let addr = Address::parse("0x358AA13c52544ECCEF6B0ADD0f801012ADAD5eE3").unwrap();
        assert_eq!(addr.kind(), AddressKind::Evm);
        assert_eq!(addr.as_str(), "0x358aa13c52544eccef6b0add0f801012adad5ee3");
    }

    #[test]
    fn reject_missing_prefix() {
        assert!(Address::parse("151494e9e083c718").is_err());
    }

    #[test]
    fn reject_wrong_length() {
        assert!(Address::parse("0x1234").is_err());
        assert!(Address::parse("0x").is_err());
    }

    #[test]
    fn reject_non_hex() {
        assert!(Address::parse("0x151494e9e083c71z").is_err());
    }

    #[test]
    fn short_form() {
        let addr = Address::parse("0x358aa13c52544eccef6b0add0f801012adad5ee3").unwrap();
        assert_eq!(addr.short(), "0x358a…5ee3");
    }

    #[test]
    fn serde_round_trip_validates() {
        let addr: Address = serde_json::from_str("\"0x151494e9e083c718\"").unwrap();
        assert_eq!(addr.kind(), AddressKind::Flow);
        assert!(serde_json::from_str::<Address>("\"not-an-address\"").is_err());
    }
}
