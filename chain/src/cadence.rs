//! JSON-Cadence encoding and decoding.
//!
//! Arguments go out in the JSON-Cadence interchange format the Access API
//! expects; script results come back in the same format and are flattened
//! into plain JSON (structs as objects, numerics as numbers, UFix64 kept as
//! decimal strings) before the client decodes them into domain entities.

use serde_json::{json, Map, Value};

use crate::arg::CallArg;
use crate::error::ChainError;

/// Encode one argument as a JSON-Cadence value.
pub fn encode_arg(arg: &CallArg) -> Value {
    match arg {
        CallArg::String(s) => json!({ "type": "String", "value": s }),
        CallArg::Id(id) => json!({ "type": "Int", "value": id.to_string() }),
        CallArg::Seconds(secs) => json!({ "type": "UFix64", "value": format!("{secs}.0") }),
        CallArg::Amount(amount) => {
            json!({ "type": "UFix64", "value": amount.to_decimal_string() })
        }
        CallArg::Address(addr) => json!({ "type": "Address", "value": addr.as_str() }),
        CallArg::AddressList(addrs) => json!({
            "type": "Array",
            "value": addrs
                .iter()
                .map(|a| json!({ "type": "Address", "value": a.as_str() }))
                .collect::<Vec<_>>(),
        }),
        CallArg::StringList(items) => json!({
            "type": "Array",
            "value": items
                .iter()
                .map(|s| json!({ "type": "String", "value": s }))
                .collect::<Vec<_>>(),
        }),
        CallArg::AmountList(amounts) => json!({
            "type": "Array",
            "value": amounts
                .iter()
                .map(|a| json!({ "type": "UFix64", "value": a.to_decimal_string() }))
                .collect::<Vec<_>>(),
        }),
    }
}

/// Flatten a JSON-Cadence value into plain JSON.
///
/// Optionals become `null` or the inner value, composite types become
/// objects keyed by field name, integer types become JSON numbers, and
/// fixed-point values stay as their decimal strings.
pub fn flatten(value: &Value) -> Result<Value, ChainError> {
    let ty = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| ChainError::Decode("cadence value missing type tag".into()))?;

    let inner = value.get("value");

    match ty {
        "Void" => Ok(Value::Null),
        "Optional" => match inner {
            None | Some(Value::Null) => Ok(Value::Null),
            Some(v) => flatten(v),
        },
        "Bool" => inner
            .and_then(Value::as_bool)
            .map(Value::Bool)
            .ok_or_else(|| ChainError::Decode("invalid Bool value".into())),
        "String" | "Address" | "UFix64" | "Fix64" => inner
            .and_then(Value::as_str)
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(|| ChainError::Decode(format!("invalid {ty} value"))),
        "Int" | "Int8" | "Int16" | "Int32" | "Int64" | "Int128" | "Int256" | "UInt" | "UInt8"
        | "UInt16" | "UInt32" | "UInt64" | "UInt128" | "UInt256" | "Word8" | "Word16"
        | "Word32" | "Word64" => {
            let raw = inner
                .and_then(Value::as_str)
                .ok_or_else(|| ChainError::Decode(format!("invalid {ty} value")))?;
            // Integer types arrive as strings; ids and timestamps fit u64.
            raw.parse::<u64>()
                .map(|n| json!(n))
                .or_else(|_| raw.parse::<i64>().map(|n| json!(n)))
                .map_err(|_| ChainError::Decode(format!("non-numeric {ty}: {raw}")))
        }
        "Array" => {
            let items = inner
                .and_then(Value::as_array)
                .ok_or_else(|| ChainError::Decode("invalid Array value".into()))?;
            items
                .iter()
                .map(flatten)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        "Dictionary" => {
            let entries = inner
                .and_then(Value::as_array)
                .ok_or_else(|| ChainError::Decode("invalid Dictionary value".into()))?;
            let mut map = Map::new();
            for entry in entries {
                let key = entry
                    .get("key")
                    .map(flatten)
                    .transpose()?
                    .and_then(|k| k.as_str().map(str::to_string).or_else(|| Some(k.to_string())))
                    .ok_or_else(|| ChainError::Decode("dictionary entry missing key".into()))?;
                let val = entry
                    .get("value")
                    .map(flatten)
                    .transpose()?
                    .ok_or_else(|| ChainError::Decode("dictionary entry missing value".into()))?;
                map.insert(key, val);
            }
            Ok(Value::Object(map))
        }
        "Struct" | "Resource" | "Event" | "Enum" => {
            let fields = inner
                .and_then(|v| v.get("fields"))
                .and_then(Value::as_array)
                .ok_or_else(|| ChainError::Decode(format!("invalid {ty} composite")))?;
            let mut map = Map::new();
            for field in fields {
                let name = field
                    .get("name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ChainError::Decode("composite field missing name".into()))?;
                let val = field
                    .get("value")
                    .map(flatten)
                    .transpose()?
                    .ok_or_else(|| ChainError::Decode("composite field missing value".into()))?;
                map.insert(name.to_string(), val);
            }
            Ok(Value::Object(map))
        }
        other => Err(ChainError::Decode(format!("unhandled cadence type: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codestake_types::{Address, TokenAmount};

    #[test]
    fn encode_scalar_args() {
        assert_eq!(
            encode_arg(&CallArg::Id(3)),
            json!({ "type": "Int", "value": "3" })
        );
        assert_eq!(
            encode_arg(&CallArg::Amount(TokenAmount::parse_decimal("1.5").unwrap())),
            json!({ "type": "UFix64", "value": "1.5" })
        );
        assert_eq!(
            encode_arg(&CallArg::Seconds(86400)),
            json!({ "type": "UFix64", "value": "86400.0" })
        );
    }

    #[test]
    fn encode_address_list() {
        let addrs = vec![
            Address::parse("0x151494e9e083c718").unwrap(),
            Address::parse("0x9a0766d93b6608b7").unwrap(),
        ];
        let encoded = encode_arg(&CallArg::AddressList(addrs));
        assert_eq!(encoded["type"], "Array");
        assert_eq!(encoded["value"][1]["value"], "0x9a0766d93b6608b7");
    }

    #[test]
    fn flatten_optional() {
        assert_eq!(
            flatten(&json!({ "type": "Optional", "value": null })).unwrap(),
            Value::Null
        );
        assert_eq!(
            flatten(&json!({
                "type": "Optional",
                "value": { "type": "UFix64", "value": "2.5" }
            }))
            .unwrap(),
            json!("2.5")
        );
    }

    #[test]
    fn flatten_struct_to_object() {
        let value = json!({
            "type": "Struct",
            "value": {
                "id": "A.151494e9e083c718.CodeStake.WalletSummary",
                "fields": [
                    { "name": "balance", "value": { "type": "UFix64", "value": "10.0" } },
                    { "name": "totalEarned", "value": { "type": "UFix64", "value": "2.0" } },
                    { "name": "totalStaked", "value": { "type": "UFix64", "value": "5.0" } }
                ]
            }
        });
        assert_eq!(
            flatten(&value).unwrap(),
            json!({ "balance": "10.0", "totalEarned": "2.0", "totalStaked": "5.0" })
        );
    }

    #[test]
    fn flatten_int_to_number() {
        assert_eq!(
            flatten(&json!({ "type": "Int", "value": "42" })).unwrap(),
            json!(42)
        );
        assert_eq!(
            flatten(&json!({ "type": "UInt64", "value": "1700000000" })).unwrap(),
            json!(1_700_000_000u64)
        );
    }

    #[test]
    fn flatten_array_of_structs() {
        let value = json!({
            "type": "Array",
            "value": [
                { "type": "Bool", "value": true },
                { "type": "Bool", "value": false }
            ]
        });
        assert_eq!(flatten(&value).unwrap(), json!([true, false]));
    }

    #[test]
    fn flatten_rejects_unknown_type() {
        assert!(flatten(&json!({ "type": "Capability", "value": {} })).is_err());
        assert!(flatten(&json!({ "no": "type" })).is_err());
    }
}
