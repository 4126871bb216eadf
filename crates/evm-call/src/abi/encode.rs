//! ABI encoding of call arguments.

use std::collections::BTreeMap;

use alloy_dyn_abi::JsonAbiExt;

use super::coerce::coerce;
use super::document::{FunctionSignature, ParamExt};
use super::types::resolve_type;
use crate::error::EncodeError;

/// Builds calldata for `signature` from string inputs keyed by parameter name.
///
/// Only declared parameters are read from `inputs`; any other keys (such as
/// transport fields) are left alone. The output is
/// `selector || encode((arg0, arg1, ...))`.
pub fn encode_call(
    signature: &FunctionSignature,
    inputs: &BTreeMap<String, String>,
) -> Result<Vec<u8>, EncodeError> {
    let mut values = Vec::with_capacity(signature.inputs.len());

    for (index, param) in signature.inputs.iter().enumerate() {
        let key = param.key(index);
        let ty = resolve_type(&param.canonical_type())
            .map_err(|reason| EncodeError::new(&key, reason))?;
        let raw = inputs
            .get(&key)
            .ok_or_else(|| EncodeError::new(&key, "no value supplied"))?;
        let value = coerce(&ty, raw).map_err(|reason| EncodeError::new(&key, reason))?;
        values.push(value);
    }

    signature
        .as_function()
        .abi_encode_input(&values)
        .map_err(|e| EncodeError::new(signature.name.as_str(), e.to_string()))
}
