//! Type-string resolution, and the size limits checked before return data
//! is decoded.
//!
//! Type strings can arrive from untrusted links, so they are screened for
//! nesting depth before the parser sees them, and their decoded footprint is
//! bounded by the amount of data actually returned.

use alloy_dyn_abi::{DynSolType, DynSolValue};

/// Deepest array/tuple nesting accepted in a type string.
pub const MAX_TYPE_DEPTH: usize = 32;

/// Values a decoding template may hold regardless of how little data was
/// returned.
const TEMPLATE_FLOOR: usize = 4096;

/// Resolves a canonical type string such as `uint256`, `bytes32[]` or
/// `(address,uint256)[2]`.
pub fn resolve_type(ty: &str) -> Result<DynSolType, String> {
    let ty = ty.trim();
    if nesting_depth(ty) > MAX_TYPE_DEPTH {
        return Err(format!(
            "unsupported type: nesting exceeds {MAX_TYPE_DEPTH} levels"
        ));
    }
    DynSolType::parse(ty).map_err(|e| format!("unsupported type `{ty}`: {e}"))
}

/// Array/tuple nesting depth of a type string. Stops counting once the limit
/// is passed.
fn nesting_depth(ty: &str) -> usize {
    // Deepest member seen so far in each open tuple.
    let mut open: Vec<usize> = Vec::new();
    let mut member = 0usize;
    let mut deepest = 0usize;

    for c in ty.chars() {
        match c {
            '(' => {
                open.push(0);
                member = 0;
            }
            ',' => {
                if let Some(widest) = open.last_mut() {
                    *widest = (*widest).max(member);
                }
                member = 0;
            }
            ')' => member = open.pop().unwrap_or(0).max(member) + 1,
            '[' => member += 1,
            _ => continue,
        }
        deepest = deepest.max(member + open.len());
        if deepest > MAX_TYPE_DEPTH {
            break;
        }
    }
    deepest
}

/// Smallest byte length a valid encoding of `ty` can have. `None` when the
/// length does not fit in `usize`.
pub fn min_encoded_len(ty: &DynSolType) -> Option<usize> {
    match ty {
        // Length word only; the contents may be empty.
        DynSolType::Array(_) | DynSolType::Bytes | DynSolType::String => Some(32),
        DynSolType::FixedArray(inner, size) => member_len(inner)?.checked_mul(*size),
        DynSolType::Tuple(types) => types
            .iter()
            .try_fold(0usize, |total, t| total.checked_add(member_len(t)?)),
        _ => Some(32),
    }
}

/// Bytes a member takes inside a tuple or fixed array: dynamic members add
/// an offset word in the head.
fn member_len(ty: &DynSolType) -> Option<usize> {
    let own = min_encoded_len(ty)?;
    if ty.is_dynamic() {
        own.checked_add(32)
    } else {
        Some(own)
    }
}

/// Values the decoder lays out for `ty` before reading any data.
fn template_len(ty: &DynSolType) -> Option<usize> {
    match ty {
        DynSolType::Array(inner) => template_len(inner)?.checked_add(1),
        DynSolType::FixedArray(inner, size) => template_len(inner)?.checked_mul(*size),
        DynSolType::Tuple(types) => types
            .iter()
            .try_fold(0usize, |total, t| total.checked_add(template_len(t)?)),
        _ => Some(1),
    }
}

/// Whether decoding `ty` from `data_len` bytes stays within a footprint
/// proportional to the data.
pub fn template_fits(ty: &DynSolType, data_len: usize) -> bool {
    let budget = (data_len / 32).max(TEMPLATE_FLOOR);
    template_len(ty).is_some_and(|n| n <= budget)
}

/// JSON rendering for hosts: integers as decimal strings, addresses EIP-55
/// checksummed, byte strings `0x`-hex, composites as arrays.
pub fn value_to_json(value: &DynSolValue) -> serde_json::Value {
    use serde_json::Value as Json;

    match value {
        DynSolValue::Bool(b) => Json::Bool(*b),
        DynSolValue::Int(v, _) => Json::String(v.to_string()),
        DynSolValue::Uint(v, _) => Json::String(v.to_string()),
        DynSolValue::Address(addr) => Json::String(addr.to_checksum(None)),
        DynSolValue::FixedBytes(word, size) => {
            let bytes = word.as_slice().get(..*size).unwrap_or_default();
            Json::String(format!("0x{}", hex::encode(bytes)))
        }
        DynSolValue::Function(f) => Json::String(format!("0x{}", hex::encode(f.as_slice()))),
        DynSolValue::Bytes(b) => Json::String(format!("0x{}", hex::encode(b))),
        DynSolValue::String(s) => Json::String(s.clone()),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
            Json::Array(items.iter().map(value_to_json).collect())
        }
    }
}
