//! Decoding of return data from read-only calls.
//!
//! Output types can come from a link, so the data is sized against the types
//! before anything is decoded, and the result must re-encode to the bytes it
//! came from.

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::U256;

use super::types::{min_encoded_len, resolve_type, template_fits, value_to_json};
use crate::error::ReturnDecodeError;

/// Decoded result of a read-only call.
#[derive(Debug, Clone, PartialEq)]
pub enum ReturnValue {
    /// No output types were declared; the bytes are handed back untouched.
    Raw(Vec<u8>),
    Single(DynSolValue),
    Tuple(Vec<DynSolValue>),
}

impl ReturnValue {
    /// JSON rendering for hosts. Raw bytes become a `0x`-hex string and
    /// tuples a positional array.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ReturnValue::Raw(bytes) => serde_json::Value::String(format!("0x{}", hex::encode(bytes))),
            ReturnValue::Single(value) => value_to_json(value),
            ReturnValue::Tuple(values) => {
                serde_json::Value::Array(values.iter().map(value_to_json).collect())
            }
        }
    }
}

/// Decodes `raw` according to `output_types`.
///
/// Zero types return the bytes unchanged, one type a single value, and more
/// than one a positional tuple. Any failure rejects the whole result.
pub fn decode_return_value(
    raw: &[u8],
    output_types: &[String],
) -> Result<ReturnValue, ReturnDecodeError> {
    if output_types.is_empty() {
        return Ok(ReturnValue::Raw(raw.to_vec()));
    }

    let types = output_types
        .iter()
        .map(|t| resolve_type(t).map_err(|_| ReturnDecodeError::UnsupportedType(t.clone())))
        .collect::<Result<Vec<_>, _>>()?;

    let mut values = decode(&types, raw)?;
    if values.len() == 1 {
        if let Some(value) = values.pop() {
            return Ok(ReturnValue::Single(value));
        }
    }
    Ok(ReturnValue::Tuple(values))
}

/// Decodes `data` as one ABI tuple of `types`.
///
/// Trailing bytes past the encoding are ignored. Anything else that a
/// canonical encoder would not have produced is rejected.
pub fn decode(types: &[DynSolType], data: &[u8]) -> Result<Vec<DynSolValue>, ReturnDecodeError> {
    let tuple = DynSolType::Tuple(types.to_vec());

    let required = min_encoded_len(&tuple)
        .ok_or_else(|| ReturnDecodeError::InvalidEncoding("encoded size overflows".into()))?;
    if data.len() < required {
        return Err(ReturnDecodeError::TooShort {
            required,
            available: data.len(),
        });
    }
    if !template_fits(&tuple, data.len()) {
        return Err(ReturnDecodeError::InvalidEncoding(format!(
            "output types are too large for {} bytes of data",
            data.len()
        )));
    }

    let decoded = tuple
        .abi_decode_sequence(data)
        .map_err(|e| ReturnDecodeError::InvalidEncoding(e.to_string()))?;
    check_widths(&decoded)?;

    let encoded = decoded.abi_encode_params();
    if data.get(..encoded.len()) != Some(encoded.as_slice()) {
        return Err(ReturnDecodeError::InvalidEncoding(
            "return data is not canonically encoded".into(),
        ));
    }

    match decoded {
        DynSolValue::Tuple(values) => Ok(values),
        other => Ok(vec![other]),
    }
}

/// Integers must fit their declared width.
fn check_widths(value: &DynSolValue) -> Result<(), ReturnDecodeError> {
    match value {
        DynSolValue::Uint(v, bits) if v.bit_len() > *bits => Err(
            ReturnDecodeError::InvalidEncoding(format!("value does not fit in uint{bits}")),
        ),
        DynSolValue::Int(v, bits) if *bits > 0 && *bits < 256 => {
            // Every bit from bits-1 upward must repeat the sign bit.
            let high = v.into_raw() >> (bits - 1);
            if high.is_zero() || high == U256::MAX >> (bits - 1) {
                Ok(())
            } else {
                Err(ReturnDecodeError::InvalidEncoding(format!(
                    "value is not a sign-extended int{bits}"
                )))
            }
        }
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
            items.iter().try_for_each(check_widths)
        }
        _ => Ok(()),
    }
}
