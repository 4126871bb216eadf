//! String-to-value coercion for call arguments.
//!
//! Every argument travels as a string. Elementary types are read directly
//! from the string; arrays and tuples are read from JSON array text whose
//! elements follow the same rules.

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{B256, I256, U256};

use crate::address::parse_address;

/// Coerces `raw` to a value of type `ty`. The error is a reason string; the
/// caller attaches the parameter name.
pub fn coerce(ty: &DynSolType, raw: &str) -> Result<DynSolValue, String> {
    match ty {
        DynSolType::Array(_) | DynSolType::FixedArray(..) | DynSolType::Tuple(_) => {
            let json: serde_json::Value = serde_json::from_str(raw.trim())
                .map_err(|_| "expected JSON array text".to_string())?;
            coerce_json(ty, &json)
        }
        _ => coerce_elementary(ty, raw),
    }
}

fn coerce_json(ty: &DynSolType, json: &serde_json::Value) -> Result<DynSolValue, String> {
    use serde_json::Value as Json;

    match ty {
        DynSolType::Array(inner) => json_items(json)?
            .iter()
            .map(|item| coerce_json(inner, item))
            .collect::<Result<Vec<_>, _>>()
            .map(DynSolValue::Array),
        DynSolType::FixedArray(inner, size) => {
            let items = json_items(json)?;
            if items.len() != *size {
                return Err(format!(
                    "needs exactly {size} elements, got {}",
                    items.len()
                ));
            }
            items
                .iter()
                .map(|item| coerce_json(inner, item))
                .collect::<Result<Vec<_>, _>>()
                .map(DynSolValue::FixedArray)
        }
        DynSolType::Tuple(members) => {
            let items = json_items(json)?;
            if items.len() != members.len() {
                return Err(format!(
                    "tuple needs {} members, got {}",
                    members.len(),
                    items.len()
                ));
            }
            members
                .iter()
                .zip(items)
                .map(|(member, item)| coerce_json(member, item))
                .collect::<Result<Vec<_>, _>>()
                .map(DynSolValue::Tuple)
        }
        _ => match json {
            Json::String(s) => coerce_elementary(ty, s),
            Json::Number(n) => coerce_elementary(ty, &n.to_string()),
            Json::Bool(b) => coerce_elementary(ty, &b.to_string()),
            other => Err(format!("expected an element value, got {other}")),
        },
    }
}

fn json_items(json: &serde_json::Value) -> Result<&Vec<serde_json::Value>, String> {
    json.as_array()
        .ok_or_else(|| "expected a JSON array".to_string())
}

fn coerce_elementary(ty: &DynSolType, raw: &str) -> Result<DynSolValue, String> {
    match ty {
        DynSolType::Uint(bits) => parse_uint(raw, *bits).map(|v| DynSolValue::Uint(v, *bits)),
        DynSolType::Int(bits) => parse_int(raw, *bits).map(|v| DynSolValue::Int(v, *bits)),
        DynSolType::Bool => parse_bool(raw).map(DynSolValue::Bool),
        DynSolType::Address => parse_address(raw.trim())
            .map(DynSolValue::Address)
            .map_err(|e| e.to_string()),
        DynSolType::String => Ok(DynSolValue::String(raw.to_string())),
        DynSolType::Bytes => parse_hex_bytes(raw).map(DynSolValue::Bytes),
        DynSolType::FixedBytes(size) => {
            let bytes = parse_hex_bytes(raw)?;
            if bytes.len() != *size || *size > 32 {
                return Err(format!(
                    "bytes{size} needs exactly {size} bytes, got {}",
                    bytes.len()
                ));
            }
            let mut word = [0u8; 32];
            word[..bytes.len()].copy_from_slice(&bytes);
            Ok(DynSolValue::FixedBytes(B256::from(word), *size))
        }
        DynSolType::Function => Err("unsupported type: function values cannot be supplied".into()),
        _ => Err("unsupported type for a single value".into()),
    }
}

/// Parses a non-negative base-10 or `0x`-hex integer into 256 bits.
fn parse_magnitude(s: &str) -> Result<U256, String> {
    let (digits, radix) = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => (hex, 16),
        None => (s, 10),
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(format!("`{s}` is not a base-10 or 0x-hex integer"));
    }

    U256::from_str_radix(digits, u64::from(radix))
        .map_err(|_| format!("`{s}` does not fit in 256 bits"))
}

/// Parses an unsigned integer that fits in `bits` bits.
pub fn parse_uint(raw: &str, bits: usize) -> Result<U256, String> {
    let s = raw.trim();
    if s.is_empty() {
        return Err("expected an integer, got an empty value".into());
    }
    if s.starts_with('-') {
        return Err(format!("uint{bits} cannot be negative"));
    }

    let value = parse_magnitude(s)?;
    if value.bit_len() > bits {
        return Err(format!("`{s}` does not fit in uint{bits}"));
    }
    Ok(value)
}

/// Parses a signed integer in the range of `int{bits}`.
pub fn parse_int(raw: &str, bits: usize) -> Result<I256, String> {
    let s = raw.trim();
    if s.is_empty() {
        return Err("expected an integer, got an empty value".into());
    }

    let (negative, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let magnitude = parse_magnitude(body)?;

    // int{bits} spans [-2^(bits-1), 2^(bits-1) - 1].
    let limit = U256::from(1u8) << (bits - 1);
    let in_range = if negative {
        magnitude <= limit
    } else {
        magnitude < limit
    };
    if !in_range {
        return Err(format!("`{s}` does not fit in int{bits}"));
    }

    let raw = if negative {
        magnitude.wrapping_neg()
    } else {
        magnitude
    };
    Ok(I256::from_raw(raw))
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    let s = raw.trim();
    if s.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if s.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(format!("expected `true` or `false`, got `{s}`"))
    }
}

fn parse_hex_bytes(raw: &str) -> Result<Vec<u8>, String> {
    let s = raw.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    hex::decode(digits).map_err(|e| format!("invalid hex bytes: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::resolve_type;

    fn ty(s: &str) -> DynSolType {
        resolve_type(s).unwrap()
    }

    fn uint(v: u64) -> DynSolValue {
        DynSolValue::Uint(U256::from(v), 256)
    }

    #[test]
    fn uint_decimal_and_hex() {
        assert_eq!(coerce(&ty("uint256"), "42").unwrap(), uint(42));
        assert_eq!(coerce(&ty("uint256"), " 0x2a ").unwrap(), uint(42));
        assert_eq!(coerce(&ty("uint256"), "0X2A").unwrap(), uint(42));
        assert_eq!(
            coerce(&ty("uint8"), "7").unwrap(),
            DynSolValue::Uint(U256::from(7u8), 8)
        );
    }

    #[test]
    fn uint_rejects_garbage() {
        for raw in ["abc", "", "   ", "12a", "0x", "0xzz", "1.5", "-1", "1e3"] {
            assert!(coerce(&ty("uint256"), raw).is_err(), "{raw:?} should fail");
        }
    }

    #[test]
    fn uint_width_is_enforced() {
        assert!(coerce(&ty("uint8"), "255").is_ok());
        assert!(coerce(&ty("uint8"), "256").is_err());
        assert!(coerce(&ty("uint256"), &U256::MAX.to_string()).is_ok());
        // 2^256 overflows.
        let too_big = "115792089237316195423570985008687907853269984665640564039457584007913129639936";
        assert!(coerce(&ty("uint256"), too_big).is_err());
    }

    #[test]
    fn int_range() {
        assert_eq!(
            coerce(&ty("int8"), "-128").unwrap(),
            DynSolValue::Int(I256::try_from(-128i64).unwrap(), 8)
        );
        assert_eq!(
            coerce(&ty("int8"), "127").unwrap(),
            DynSolValue::Int(I256::try_from(127i64).unwrap(), 8)
        );
        assert!(coerce(&ty("int8"), "128").is_err());
        assert!(coerce(&ty("int8"), "-129").is_err());
        assert_eq!(
            coerce(&ty("int256"), "-0x1").unwrap(),
            DynSolValue::Int(I256::MINUS_ONE, 256)
        );
    }

    #[test]
    fn int256_min_is_representable() {
        let min = "-57896044618658097711785492504343953926634992332820282019728792003956564819968";
        assert_eq!(
            coerce(&ty("int256"), min).unwrap(),
            DynSolValue::Int(I256::MIN, 256)
        );
    }

    #[test]
    fn bool_is_case_insensitive() {
        assert_eq!(coerce(&ty("bool"), "TRUE").unwrap(), DynSolValue::Bool(true));
        assert_eq!(coerce(&ty("bool"), "False").unwrap(), DynSolValue::Bool(false));
        assert!(coerce(&ty("bool"), "1").is_err());
        assert!(coerce(&ty("bool"), "yes").is_err());
    }

    #[test]
    fn address_shape() {
        assert!(coerce(&ty("address"), "0x000000000000000000000000000000000000dEaD").is_ok());
        let err = coerce(&ty("address"), "0xdead").unwrap_err();
        assert!(err.contains("40 hex characters"));
        // Bare hex without the prefix is not an address.
        assert!(coerce(&ty("address"), "000000000000000000000000000000000000dEaD").is_err());
    }

    #[test]
    fn string_is_passed_verbatim() {
        assert_eq!(
            coerce(&ty("string"), "  hello ").unwrap(),
            DynSolValue::String("  hello ".into())
        );
        assert_eq!(coerce(&ty("string"), "").unwrap(), DynSolValue::String(String::new()));
    }

    #[test]
    fn bytes_and_fixed_bytes() {
        assert_eq!(
            coerce(&ty("bytes"), "0xcafe").unwrap(),
            DynSolValue::Bytes(vec![0xca, 0xfe])
        );
        assert_eq!(coerce(&ty("bytes"), "").unwrap(), DynSolValue::Bytes(vec![]));

        let mut word = [0u8; 32];
        word[..2].copy_from_slice(&[0xca, 0xfe]);
        assert_eq!(
            coerce(&ty("bytes2"), "0xcafe").unwrap(),
            DynSolValue::FixedBytes(B256::from(word), 2)
        );
        assert!(coerce(&ty("bytes4"), "0xcafe").is_err());
        assert!(coerce(&ty("bytes"), "0xabc").is_err());
    }

    #[test]
    fn arrays_from_json() {
        assert_eq!(
            coerce(&ty("uint256[]"), r#"["1", 2, "0x03"]"#).unwrap(),
            DynSolValue::Array(vec![uint(1), uint(2), uint(3)])
        );
        assert!(coerce(&ty("uint256[2]"), "[1]").is_err());
        assert!(coerce(&ty("uint256[]"), "1,2").is_err());
        assert!(coerce(&ty("uint256[]"), r#"["x"]"#).is_err());
    }

    #[test]
    fn tuples_from_json() {
        let value = coerce(
            &ty("(address,bool[])"),
            r#"["0x000000000000000000000000000000000000dEaD", [true, "false"]]"#,
        )
        .unwrap();
        match value {
            DynSolValue::Tuple(members) => {
                assert_eq!(members.len(), 2);
                assert_eq!(
                    members[1],
                    DynSolValue::Array(vec![DynSolValue::Bool(true), DynSolValue::Bool(false)])
                );
            }
            other => panic!("expected a tuple, got {other:?}"),
        }
        assert!(coerce(&ty("(address,bool)"), "[true]").is_err());
    }

    #[test]
    fn function_values_are_unsupported() {
        let err = coerce(&DynSolType::Function, "0x00").unwrap_err();
        assert!(err.contains("unsupported type"));
    }
}
