//! The call descriptor: one contract call, as authored and as shared.

use std::collections::BTreeMap;

use evm_call::abi::{parse_abi, parse_uint, FunctionSignature};
use evm_call::address::validate_shape;
use evm_call::error::EncodeError;
use serde::{Deserialize, Serialize};

use crate::error::{LinkError, ValidationError};

/// Input key for the gas limit.
pub const GAS_KEY: &str = "gas";
/// Input keys for the EIP-1559 fee cap, canonical name first.
pub const MAX_FEE_KEYS: [&str; 2] = ["maxFeePerGas", "maxgas"];
/// Input keys for the EIP-1559 priority fee, canonical name first.
pub const MAX_PRIORITY_FEE_KEYS: [&str; 2] = ["maxPriorityFeePerGas", "maxpriogas"];
/// Input key for the native value sent with a write.
pub const VALUE_KEY: &str = "value";

/// One contract call. Field names on the wire are camelCase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallDescriptor {
    pub contract_address: String,
    pub chain_id: u64,
    /// Empty means the network default.
    pub rpc_url: String,
    pub function_name: String,
    /// Argument values keyed by parameter name. Transport fields (gas, fees,
    /// value) travel here too.
    pub function_inputs: BTreeMap<String, String>,
    pub output_type: Vec<String>,
    pub is_read_only: bool,
    /// One-entry ABI JSON of the selected function.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abi: Option<String>,
    /// Calldata as computed by the author, `0x`-hex.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl CallDescriptor {
    /// Rebuilds the selected function from the embedded ABI fragment.
    pub fn function_signature(&self) -> Result<FunctionSignature, LinkError> {
        let abi = self
            .abi
            .as_deref()
            .ok_or_else(|| ValidationError::new("abi", "descriptor carries no ABI fragment"))?;
        let doc = parse_abi(abi)?;
        Ok(doc.function(&self.function_name)?.clone())
    }

    /// Required fields that are absent: an empty string or a zero chain id
    /// counts as absent.
    pub fn missing_fields(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.contract_address.is_empty() {
            missing.push("contractAddress".to_string());
        }
        if self.chain_id == 0 {
            missing.push("chainId".to_string());
        }
        if self.function_name.is_empty() {
            missing.push("functionName".to_string());
        }
        missing
    }

    /// Canonical JSON form. Object keys are emitted in sorted order and the
    /// optional fields only when set, so equal descriptors give equal text.
    pub fn canonical_json(&self) -> serde_json::Value {
        let mut value = serde_json::json!({
            "contractAddress": self.contract_address,
            "chainId": self.chain_id,
            "rpcUrl": self.rpc_url,
            "functionName": self.function_name,
            "functionInputs": self.function_inputs,
            "outputType": self.output_type,
            "isReadOnly": self.is_read_only,
        });
        if let Some(map) = value.as_object_mut() {
            if let Some(abi) = &self.abi {
                map.insert("abi".into(), abi.clone().into());
            }
            if let Some(data) = &self.data {
                map.insert("data".into(), data.clone().into());
            }
        }
        value
    }
}

/// Assembles a descriptor from authoring input.
///
/// Checks run in order and the first failure is returned: contract address,
/// chain id, function selection, then one entry per declared parameter. Only
/// presence is checked; an empty value is accepted here and judged later by
/// the encoder.
pub fn build_descriptor(
    contract_address: &str,
    chain_id: u64,
    rpc_url: &str,
    signature: Option<&FunctionSignature>,
    inputs: &BTreeMap<String, String>,
) -> Result<CallDescriptor, ValidationError> {
    if contract_address.is_empty() {
        return Err(ValidationError::new("contractAddress", "required"));
    }
    validate_shape(contract_address)
        .map_err(|e| ValidationError::new("contractAddress", e.to_string()))?;

    if chain_id == 0 {
        return Err(ValidationError::new("chainId", "must be a positive integer"));
    }

    let signature =
        signature.ok_or_else(|| ValidationError::new("function", "no function selected"))?;

    for key in signature.input_keys() {
        if !inputs.contains_key(&key) {
            return Err(ValidationError::new(key, "no value supplied"));
        }
    }

    Ok(CallDescriptor {
        contract_address: contract_address.to_string(),
        chain_id,
        rpc_url: rpc_url.to_string(),
        function_name: signature.name.clone(),
        function_inputs: inputs.clone(),
        output_type: signature.output_types(),
        is_read_only: signature.is_read_only(),
        abi: Some(signature.to_abi_json()),
        data: None,
    })
}

/// Gas, fee and value settings carried in `functionInputs` next to the ABI
/// arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportOverrides {
    pub gas: Option<u64>,
    pub max_fee_per_gas: Option<u128>,
    pub max_priority_fee_per_gas: Option<u128>,
    pub value: Option<u128>,
}

impl TransportOverrides {
    /// Reads the transport fields from `inputs`.
    ///
    /// Keys listed in `declared` are ABI arguments and are skipped, so a
    /// function with a parameter called `value` keeps it. Empty values mean
    /// unset.
    pub fn from_inputs(
        inputs: &BTreeMap<String, String>,
        declared: &[String],
    ) -> Result<Self, EncodeError> {
        let lookup = |keys: &[&str]| -> Option<(String, String)> {
            keys.iter()
                .filter(|k| !declared.iter().any(|d| d == *k))
                .find_map(|k| {
                    inputs
                        .get(*k)
                        .filter(|v| !v.trim().is_empty())
                        .map(|v| (k.to_string(), v.clone()))
                })
        };

        let gas = lookup(&[GAS_KEY])
            .map(|(k, v)| parse_quantity(&k, &v, 64))
            .transpose()?
            .map(|g| u64::try_from(g).map_err(|_| EncodeError::new(GAS_KEY, "does not fit in 64 bits")))
            .transpose()?;

        Ok(Self {
            gas,
            max_fee_per_gas: lookup(&MAX_FEE_KEYS)
                .map(|(k, v)| parse_quantity(&k, &v, 128))
                .transpose()?,
            max_priority_fee_per_gas: lookup(&MAX_PRIORITY_FEE_KEYS)
                .map(|(k, v)| parse_quantity(&k, &v, 128))
                .transpose()?,
            value: lookup(&[VALUE_KEY])
                .map(|(k, v)| parse_quantity(&k, &v, 128))
                .transpose()?,
        })
    }

    pub fn value_or_zero(&self) -> u128 {
        self.value.unwrap_or(0)
    }
}

fn parse_quantity(key: &str, raw: &str, bits: usize) -> Result<u128, EncodeError> {
    let v = parse_uint(raw, bits).map_err(|reason| EncodeError::new(key, reason))?;
    u128::try_from(v).map_err(|_| EncodeError::new(key, format!("does not fit in {bits} bits")))
}

/// Steps of a host's transaction flow.
///
/// Reads go `Idle -> Building -> Settled`; writes pass through signature and
/// confirmation first. Any non-terminal step may end in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, uniffi::Enum)]
pub enum FlowState {
    Idle,
    Building,
    AwaitingSignature,
    AwaitingConfirmation,
    Settled,
    Failed,
}

impl FlowState {
    /// The step after `self` completes successfully.
    pub fn advance(self, is_read_only: bool) -> FlowState {
        match self {
            FlowState::Idle => FlowState::Building,
            FlowState::Building => Self::next_after_build(is_read_only),
            FlowState::AwaitingSignature => FlowState::AwaitingConfirmation,
            FlowState::AwaitingConfirmation => FlowState::Settled,
            terminal => terminal,
        }
    }

    /// Where a flow goes once its payload is built.
    pub fn next_after_build(is_read_only: bool) -> FlowState {
        if is_read_only {
            FlowState::Settled
        } else {
            FlowState::AwaitingSignature
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, FlowState::Settled | FlowState::Failed)
    }
}
