//! Minimal ABI codec for the CodeStake contract surface.
//!
//! Implements the Solidity ABI head/tail encoding for exactly the types the
//! contract uses: `uint256`, `address`, `bool`, `string`, dynamic arrays,
//! and tuples (including arrays of tuples for challenge lists). Everything
//! is bounds-checked; a malformed response is a decode error, never a
//! panic.

use alloy_primitives::{keccak256, Address as EvmAddress, U256};

use crate::error::ChainError;

const WORD: usize = 32;

/// ABI type descriptor for decoding call results.
#[derive(Clone, Debug, PartialEq)]
pub enum AbiType {
    Uint,
    Address,
    Bool,
    String,
    Array(Box<AbiType>),
    Tuple(Vec<AbiType>),
}

impl AbiType {
    /// Whether this type is dynamically sized (referenced by offset).
    fn is_dynamic(&self) -> bool {
        match self {
            Self::Uint | Self::Address | Self::Bool => false,
            Self::String | Self::Array(_) => true,
            Self::Tuple(items) => items.iter().any(AbiType::is_dynamic),
        }
    }

    /// Number of head words this type occupies in a sequence.
    fn head_words(&self) -> usize {
        match self {
            Self::Tuple(items) if !self.is_dynamic() => {
                items.iter().map(AbiType::head_words).sum()
            }
            _ => 1,
        }
    }
}

/// A decoded or to-be-encoded ABI value.
#[derive(Clone, Debug, PartialEq)]
pub enum AbiValue {
    Uint(U256),
    Address(EvmAddress),
    Bool(bool),
    String(String),
    Array(Vec<AbiValue>),
    Tuple(Vec<AbiValue>),
}

impl AbiValue {
    fn is_dynamic(&self) -> bool {
        match self {
            Self::Uint(_) | Self::Address(_) | Self::Bool(_) => false,
            Self::String(_) | Self::Array(_) => true,
            Self::Tuple(items) => items.iter().any(AbiValue::is_dynamic),
        }
    }

    fn head_words(&self) -> usize {
        match self {
            Self::Tuple(items) if !self.is_dynamic() => {
                items.iter().map(AbiValue::head_words).sum()
            }
            _ => 1,
        }
    }

    pub fn as_uint(&self) -> Result<U256, ChainError> {
        match self {
            Self::Uint(v) => Ok(*v),
            other => Err(ChainError::Decode(format!("expected uint, got {other:?}"))),
        }
    }

    pub fn as_u64(&self) -> Result<u64, ChainError> {
        let v = self.as_uint()?;
        u64::try_from(v).map_err(|_| ChainError::Decode(format!("uint out of u64 range: {v}")))
    }

    pub fn as_u128(&self) -> Result<u128, ChainError> {
        let v = self.as_uint()?;
        u128::try_from(v).map_err(|_| ChainError::Decode(format!("uint out of u128 range: {v}")))
    }

    pub fn as_bool(&self) -> Result<bool, ChainError> {
        match self {
            Self::Bool(v) => Ok(*v),
            other => Err(ChainError::Decode(format!("expected bool, got {other:?}"))),
        }
    }

    pub fn as_str(&self) -> Result<&str, ChainError> {
        match self {
            Self::String(v) => Ok(v),
            other => Err(ChainError::Decode(format!("expected string, got {other:?}"))),
        }
    }

    pub fn as_address(&self) -> Result<EvmAddress, ChainError> {
        match self {
            Self::Address(v) => Ok(*v),
            other => Err(ChainError::Decode(format!("expected address, got {other:?}"))),
        }
    }

    pub fn as_slice(&self) -> Result<&[AbiValue], ChainError> {
        match self {
            Self::Array(items) | Self::Tuple(items) => Ok(items),
            other => Err(ChainError::Decode(format!(
                "expected array or tuple, got {other:?}"
            ))),
        }
    }
}

/// 4-byte function selector for a canonical signature like
/// `"joinChallenge(uint256,uint256)"`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Encode a full call: selector followed by the encoded argument sequence.
pub fn encode_call(signature: &str, args: &[AbiValue]) -> Vec<u8> {
    let mut out = selector(signature).to_vec();
    out.extend(encode_sequence(args));
    out
}

/// Encode a sequence of values with head/tail layout.
fn encode_sequence(values: &[AbiValue]) -> Vec<u8> {
    let head_size: usize = values.iter().map(|v| v.head_words() * WORD).sum();
    let mut heads = Vec::with_capacity(head_size);
    let mut tails = Vec::new();

    for value in values {
        if value.is_dynamic() {
            heads.extend(uint_word(U256::from(head_size + tails.len())));
            tails.extend(encode_one(value));
        } else {
            heads.extend(encode_one(value));
        }
    }

    heads.extend(tails);
    heads
}

fn encode_one(value: &AbiValue) -> Vec<u8> {
    match value {
        AbiValue::Uint(v) => uint_word(*v),
        AbiValue::Address(a) => {
            let mut word = vec![0u8; WORD];
            word[12..].copy_from_slice(a.as_slice());
            word
        }
        AbiValue::Bool(b) => uint_word(U256::from(*b as u8)),
        AbiValue::String(s) => {
            let mut out = uint_word(U256::from(s.len()));
            out.extend(s.as_bytes());
            let padding = (WORD - s.len() % WORD) % WORD;
            out.extend(std::iter::repeat(0u8).take(padding));
            out
        }
        AbiValue::Array(items) => {
            let mut out = uint_word(U256::from(items.len()));
            out.extend(encode_sequence(items));
            out
        }
        AbiValue::Tuple(items) => encode_sequence(items),
    }
}

fn uint_word(v: U256) -> Vec<u8> {
    v.to_be_bytes::<WORD>().to_vec()
}

/// Decode a result payload against the expected return types.
pub fn decode(types: &[AbiType], data: &[u8]) -> Result<Vec<AbiValue>, ChainError> {
    decode_sequence(types, data, 0)
}

fn decode_sequence(types: &[AbiType], data: &[u8], base: usize) -> Result<Vec<AbiValue>, ChainError> {
    let mut cursor = base;
    let mut out = Vec::with_capacity(types.len());

    for ty in types {
        if ty.is_dynamic() {
            let offset = read_usize(data, cursor)?;
            let position = base
                .checked_add(offset)
                .ok_or_else(|| ChainError::Decode("offset overflow".into()))?;
            out.push(decode_dynamic(ty, data, position)?);
            cursor += WORD;
        } else {
            out.push(decode_static(ty, data, &mut cursor)?);
        }
    }

    Ok(out)
}

fn decode_static(ty: &AbiType, data: &[u8], cursor: &mut usize) -> Result<AbiValue, ChainError> {
    match ty {
        AbiType::Uint => {
            let word = read_word(data, *cursor)?;
            *cursor += WORD;
            Ok(AbiValue::Uint(U256::from_be_slice(word)))
        }
        AbiType::Address => {
            let word = read_word(data, *cursor)?;
            *cursor += WORD;
            Ok(AbiValue::Address(EvmAddress::from_slice(&word[12..])))
        }
        AbiType::Bool => {
            let word = read_word(data, *cursor)?;
            *cursor += WORD;
            Ok(AbiValue::Bool(word[WORD - 1] != 0))
        }
        AbiType::Tuple(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(decode_static(item, data, cursor)?);
            }
            Ok(AbiValue::Tuple(out))
        }
        AbiType::String | AbiType::Array(_) => {
            Err(ChainError::Decode("dynamic type in static position".into()))
        }
    }
}

fn decode_dynamic(ty: &AbiType, data: &[u8], position: usize) -> Result<AbiValue, ChainError> {
    match ty {
        AbiType::String => {
            let len = read_usize(data, position)?;
            let start = position + WORD;
            let end = start
                .checked_add(len)
                .filter(|&e| e <= data.len())
                .ok_or_else(|| ChainError::Decode("string out of bounds".into()))?;
            let s = std::str::from_utf8(&data[start..end])
                .map_err(|_| ChainError::Decode("string is not valid utf-8".into()))?;
            Ok(AbiValue::String(s.to_string()))
        }
        AbiType::Array(elem) => {
            let len = read_usize(data, position)?;
            if len > data.len() / WORD {
                return Err(ChainError::Decode(format!("array length {len} exceeds payload")));
            }
            let element_types = vec![elem.as_ref().clone(); len];
            let items = decode_sequence(&element_types, data, position + WORD)?;
            Ok(AbiValue::Array(items))
        }
        AbiType::Tuple(items) => Ok(AbiValue::Tuple(decode_sequence(items, data, position)?)),
        _ => {
            let mut cursor = position;
            decode_static(ty, data, &mut cursor)
        }
    }
}

fn read_word(data: &[u8], at: usize) -> Result<&[u8], ChainError> {
    data.get(at..at + WORD)
        .ok_or_else(|| ChainError::Decode(format!("truncated payload at byte {at}")))
}

fn read_usize(data: &[u8], at: usize) -> Result<usize, ChainError> {
    let word = read_word(data, at)?;
    let v = U256::from_be_slice(word);
    usize::try_from(v).map_err(|_| ChainError::Decode(format!("offset out of range: {v}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn round_trip(types: &[AbiType], values: Vec<AbiValue>) {
        let encoded = encode_sequence(&values);
        let decoded = decode(types, &encoded).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn selector_matches_known_value() {
        // keccak("transfer(address,uint256)")[..4] == a9059cbb
        assert_eq!(selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn static_round_trip() {
        round_trip(
            &[AbiType::Uint, AbiType::Bool, AbiType::Address],
            vec![
                AbiValue::Uint(U256::from(42u64)),
                AbiValue::Bool(true),
                AbiValue::Address(EvmAddress::repeat_byte(0xab)),
            ],
        );
    }

    #[test]
    fn string_round_trip() {
        round_trip(
            &[AbiType::String, AbiType::Uint],
            vec![
                AbiValue::String("stake to learn".into()),
                AbiValue::Uint(U256::from(7u64)),
            ],
        );
    }

    #[test]
    fn string_encoding_layout() {
        // One dynamic arg: offset word, length word, padded bytes.
        let encoded = encode_sequence(&[AbiValue::String("abc".into())]);
        assert_eq!(encoded.len(), 3 * WORD);
        assert_eq!(U256::from_be_slice(&encoded[..WORD]), U256::from(32u64));
        assert_eq!(U256::from_be_slice(&encoded[WORD..2 * WORD]), U256::from(3u64));
        assert_eq!(&encoded[2 * WORD..2 * WORD + 3], b"abc");
    }

    #[test]
    fn dynamic_array_round_trip() {
        round_trip(
            &[AbiType::Array(Box::new(AbiType::Uint))],
            vec![AbiValue::Array(vec![
                AbiValue::Uint(U256::from(1u64)),
                AbiValue::Uint(U256::from(2u64)),
                AbiValue::Uint(U256::from(3u64)),
            ])],
        );
    }

    #[test]
    fn string_array_round_trip() {
        round_trip(
            &[AbiType::Array(Box::new(AbiType::String))],
            vec![AbiValue::Array(vec![
                AbiValue::String("first".into()),
                AbiValue::String("second milestone with a longer name".into()),
            ])],
        );
    }

    #[test]
    fn dynamic_tuple_round_trip() {
        let challenge_ty = AbiType::Tuple(vec![
            AbiType::Uint,
            AbiType::String,
            AbiType::Address,
            AbiType::Bool,
            AbiType::Array(Box::new(AbiType::Uint)),
        ]);
        round_trip(
            &[challenge_ty],
            vec![AbiValue::Tuple(vec![
                AbiValue::Uint(U256::from(3u64)),
                AbiValue::String("rust track".into()),
                AbiValue::Address(EvmAddress::repeat_byte(0x11)),
                AbiValue::Bool(true),
                AbiValue::Array(vec![AbiValue::Uint(U256::from(9u64))]),
            ])],
        );
    }

    #[test]
    fn array_of_dynamic_tuples_round_trip() {
        let elem = AbiType::Tuple(vec![AbiType::Uint, AbiType::String]);
        round_trip(
            &[AbiType::Array(Box::new(elem))],
            vec![AbiValue::Array(vec![
                AbiValue::Tuple(vec![
                    AbiValue::Uint(U256::from(1u64)),
                    AbiValue::String("a".into()),
                ]),
                AbiValue::Tuple(vec![
                    AbiValue::Uint(U256::from(2u64)),
                    AbiValue::String("b".into()),
                ]),
            ])],
        );
    }

    #[test]
    fn decode_rejects_truncated_payload() {
        let err = decode(&[AbiType::Uint, AbiType::Uint], &[0u8; WORD]);
        assert!(err.is_err());
    }

    #[test]
    fn decode_rejects_absurd_array_length() {
        let mut data = uint_word(U256::from(32u64));
        data.extend(uint_word(U256::from(u64::MAX)));
        assert!(decode(&[AbiType::Array(Box::new(AbiType::Uint))], &data).is_err());
    }

    proptest! {
        #[test]
        fn mixed_sequences_round_trip(
            n in any::<u64>(),
            s in "[a-z ]{0,40}",
            items in proptest::collection::vec(any::<u64>(), 0..8),
        ) {
            let types = [
                AbiType::Uint,
                AbiType::String,
                AbiType::Array(Box::new(AbiType::Uint)),
            ];
            let values = vec![
                AbiValue::Uint(U256::from(n)),
                AbiValue::String(s),
                AbiValue::Array(items.into_iter().map(|v| AbiValue::Uint(U256::from(v))).collect()),
            ];
            let decoded = decode(&types, &encode_sequence(&values)).unwrap();
            prop_assert_eq!(decoded, values);
        }
    }

    #[test]
    fn encode_call_prepends_selector() {
        let call = encode_call("joinChallenge(uint256,uint256)", &[
            AbiValue::Uint(U256::from(3u64)),
            AbiValue::Uint(U256::from(10u64)),
        ]);
        assert_eq!(call.len(), 4 + 2 * WORD);
        assert_eq!(&call[..4], &selector("joinChallenge(uint256,uint256)"));
    }
}
