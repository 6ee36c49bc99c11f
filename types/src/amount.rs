//! Fixed-point token amount.
//!
//! Amounts are unsigned fixed-point with 8 decimal places, stored as raw
//! u128 to avoid floating-point errors. 8 decimals matches the Flow UFix64
//! wire format; the EVM backend converts to and from 18-decimal wei.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Raw units per whole token (8 decimal places).
const SCALE: u128 = 100_000_000;

/// Raw-unit multiplier between 8-decimal raw and 18-decimal wei.
const WEI_PER_RAW: u128 = 10_000_000_000;

/// An unsigned fixed-point token amount (8 decimal places).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenAmount(u128);

impl TokenAmount {
    pub const ZERO: Self = Self(0);

    /// Number of decimal places in the fixed-point representation.
    pub const DECIMALS: u32 = 8;

    pub fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    /// An amount of whole tokens.
    pub fn from_whole(tokens: u64) -> Self {
        Self(tokens as u128 * SCALE)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Parse a decimal string (`"1.5"`, `"0.00000001"`, `"12"`).
    ///
    /// This is the UFix64 wire form used by Cadence scripts and the form
    /// users type into amount fields. More than 8 fractional digits is an
    /// error rather than a silent truncation.
    pub fn parse_decimal(s: &str) -> Result<Self, DomainError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DomainError::InvalidAmount("empty amount".into()));
        }

        let (whole_str, frac_str) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };

        if frac_str.len() > Self::DECIMALS as usize {
            return Err(DomainError::InvalidAmount(format!(
                "more than {} decimal places: {s}",
                Self::DECIMALS
            )));
        }

        let whole: u128 = if whole_str.is_empty() {
            0
        } else {
            whole_str
                .parse()
                .map_err(|_| DomainError::InvalidAmount(format!("invalid amount: {s}")))?
        };

        let frac: u128 = if frac_str.is_empty() {
            0
        } else {
            let padded = format!("{frac_str:0<8}");
            padded
                .parse()
                .map_err(|_| DomainError::InvalidAmount(format!("invalid amount: {s}")))?
        };

        whole
            .checked_mul(SCALE)
            .and_then(|w| w.checked_add(frac))
            .map(Self)
            .ok_or_else(|| DomainError::InvalidAmount(format!("amount overflow: {s}")))
    }

    /// Render as a UFix64 decimal string (always with a fractional part,
    /// e.g. `"5.0"`), the form Cadence expects for UFix64 arguments.
    pub fn to_decimal_string(&self) -> String {
        let whole = self.0 / SCALE;
        let frac = self.0 % SCALE;
        if frac == 0 {
            return format!("{whole}.0");
        }
        let frac_str = format!("{frac:08}");
        format!("{whole}.{}", frac_str.trim_end_matches('0'))
    }

    /// Convert to 18-decimal wei for the EVM backend.
    ///
    /// Saturates at `u128::MAX`, which is unreachable for any amount that
    /// fits the UFix64 wire range.
    pub fn to_wei(&self) -> u128 {
        self.0.saturating_mul(WEI_PER_RAW)
    }

    /// Convert from 18-decimal wei, truncating precision below 10^-8.
    pub fn from_wei(wei: u128) -> Self {
        Self(wei / WEI_PER_RAW)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_whole_number() {
        assert_eq!(TokenAmount::parse_decimal("5").unwrap().raw(), 500_000_000);
    }

    #[test]
    fn parse_fractional() {
        assert_eq!(
            TokenAmount::parse_decimal("1.5").unwrap().raw(),
            150_000_000
        );
        assert_eq!(TokenAmount::parse_decimal("0.00000001").unwrap().raw(), 1);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(TokenAmount::parse_decimal("").is_err());
        assert!(TokenAmount::parse_decimal("abc").is_err());
        assert!(TokenAmount::parse_decimal("1.2.3").is_err());
    }

    #[test]
    fn parse_rejects_excess_precision() {
        assert!(TokenAmount::parse_decimal("0.000000001").is_err());
    }

    #[test]
    fn decimal_string_always_has_fraction() {
        assert_eq!(TokenAmount::from_whole(5).to_decimal_string(), "5.0");
        assert_eq!(TokenAmount::from_raw(150_000_000).to_decimal_string(), "1.5");
        assert_eq!(TokenAmount::from_raw(1).to_decimal_string(), "0.00000001");
    }

    #[test]
    fn wei_round_trip() {
        let amount = TokenAmount::parse_decimal("2.25").unwrap();
        assert_eq!(amount.to_wei(), 2_250_000_000_000_000_000);
        assert_eq!(TokenAmount::from_wei(amount.to_wei()), amount);
    }

    #[test]
    fn checked_arithmetic() {
        let a = TokenAmount::from_whole(3);
        let b = TokenAmount::from_whole(5);
        assert_eq!(a.checked_sub(b), None);
        assert_eq!(a.saturating_sub(b), TokenAmount::ZERO);
        assert_eq!(b.checked_sub(a), Some(TokenAmount::from_whole(2)));
    }

    proptest! {
        #[test]
        fn decimal_string_round_trips(raw in 0u128..u64::MAX as u128) {
            let amount = TokenAmount::from_raw(raw);
            let parsed = TokenAmount::parse_decimal(&amount.to_decimal_string()).unwrap();
            prop_assert_eq!(parsed, amount);
        }
    }
}
