//! Plain records exchanged with native hosts.
//!
//! 128-bit quantities cross the FFI as decimal strings.

use std::collections::{BTreeMap, HashMap};

use evm_call::abi::{mutability_name, FunctionSignature, Param, ParamExt};
use evm_call::chains::EvmChain;

use crate::adapter::PreparedCall;
use crate::config::LinkConfig;
use crate::descriptor::CallDescriptor;
use crate::error::ConfigError;

/// One parameter of a callable function, for form building.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct ParamInfo {
    pub name: String,
    /// Input-map key; `param{index}` for unnamed parameters.
    pub key: String,
    pub type_name: String,
}

/// A callable function as shown to the author.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct FunctionInfo {
    pub name: String,
    /// Canonical signature, e.g. `transfer(address,uint256)`.
    pub signature: String,
    /// `0x`-prefixed 4-byte selector.
    pub selector: String,
    /// `transfer(address _to, uint256 _value) returns (bool)`
    pub display: String,
    pub inputs: Vec<ParamInfo>,
    pub output_types: Vec<String>,
    pub state_mutability: String,
    pub is_read_only: bool,
}

impl From<&FunctionSignature> for FunctionInfo {
    fn from(f: &FunctionSignature) -> Self {
        let inputs = f
            .inputs
            .iter()
            .enumerate()
            .map(|(i, p): (usize, &Param)| ParamInfo {
                name: p.name.clone(),
                key: p.key(i),
                type_name: p.canonical_type(),
            })
            .collect();

        Self {
            name: f.name.clone(),
            signature: f.signature(),
            selector: format!("0x{}", hex::encode(f.selector())),
            display: f.to_string(),
            inputs,
            output_types: f.output_types(),
            state_mutability: mutability_name(f.state_mutability).to_string(),
            is_read_only: f.is_read_only(),
        }
    }
}

/// Authoring input for a new link.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct LinkRequest {
    pub contract_address: String,
    pub chain_id: u64,
    /// Empty for the network default.
    pub rpc_url: String,
    pub abi_json: String,
    /// Function name, or a canonical signature to pick one overload.
    pub function: String,
    pub inputs: HashMap<String, String>,
}

/// A freshly created link.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct TransactionLink {
    pub token: String,
    pub url: String,
}

/// A decoded descriptor as shown to the viewer.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct DescriptorRecord {
    pub contract_address: String,
    pub chain_id: u64,
    pub rpc_url: String,
    pub function_name: String,
    pub function_inputs: HashMap<String, String>,
    pub output_type: Vec<String>,
    pub is_read_only: bool,
    pub abi: Option<String>,
}

impl From<CallDescriptor> for DescriptorRecord {
    fn from(d: CallDescriptor) -> Self {
        Self {
            contract_address: d.contract_address,
            chain_id: d.chain_id,
            rpc_url: d.rpc_url,
            function_name: d.function_name,
            function_inputs: d.function_inputs.into_iter().collect(),
            output_type: d.output_type,
            is_read_only: d.is_read_only,
            abi: d.abi,
        }
    }
}

/// A prepared call flattened for the host's wallet bridge. Read calls leave
/// the transaction fields empty.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct PreparedCallRecord {
    pub is_read_only: bool,
    pub to: String,
    pub data: Vec<u8>,
    pub rpc_url: String,
    pub chain_id: u64,
    /// Wei, decimal.
    pub value: String,
    pub gas: Option<u64>,
    pub max_fee_per_gas: Option<String>,
    pub max_priority_fee_per_gas: Option<String>,
}

impl PreparedCallRecord {
    pub fn new(prepared: PreparedCall, chain_id: u64) -> Self {
        match prepared {
            PreparedCall::Read(r) => Self {
                is_read_only: true,
                to: r.to,
                data: r.data,
                rpc_url: r.rpc_url,
                chain_id,
                value: "0".to_string(),
                gas: None,
                max_fee_per_gas: None,
                max_priority_fee_per_gas: None,
            },
            PreparedCall::Write(w) => Self {
                is_read_only: false,
                to: w.to,
                data: w.data,
                rpc_url: w.rpc_url,
                chain_id: w.chain_id,
                value: w.value.to_string(),
                gas: w.gas,
                max_fee_per_gas: w.max_fee_per_gas.map(|v| v.to_string()),
                max_priority_fee_per_gas: w.max_priority_fee_per_gas.map(|v| v.to_string()),
            },
        }
    }
}

/// Network defaults for a chain picker.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct ChainInfo {
    pub chain_id: u64,
    pub name: String,
    pub symbol: String,
    pub rpc_url: String,
    pub explorer_url: String,
    pub is_testnet: bool,
}

impl From<&EvmChain> for ChainInfo {
    fn from(c: &EvmChain) -> Self {
        Self {
            chain_id: c.chain_id,
            name: c.name.to_string(),
            symbol: c.symbol.to_string(),
            rpc_url: c.rpc_url.to_string(),
            explorer_url: c.explorer_url.to_string(),
            is_testnet: c.is_testnet,
        }
    }
}

/// Host-side view of [`LinkConfig`].
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct LinkSettings {
    pub base_url: String,
    pub route: String,
    pub placeholder: String,
    pub rpc_overrides: HashMap<u64, String>,
}

impl From<LinkConfig> for LinkSettings {
    fn from(c: LinkConfig) -> Self {
        let rpc_overrides = c
            .rpc_overrides
            .into_iter()
            .filter_map(|(k, v)| k.parse::<u64>().ok().map(|id| (id, v)))
            .collect();
        Self {
            base_url: c.base_url,
            route: c.route,
            placeholder: c.placeholder,
            rpc_overrides,
        }
    }
}

impl TryFrom<LinkSettings> for LinkConfig {
    type Error = ConfigError;

    fn try_from(s: LinkSettings) -> Result<Self, Self::Error> {
        let rpc_overrides: BTreeMap<String, String> = s
            .rpc_overrides
            .into_iter()
            .map(|(id, url)| (id.to_string(), url))
            .collect();
        let config = LinkConfig {
            base_url: s.base_url,
            route: s.route,
            placeholder: s.placeholder,
            rpc_overrides,
        };
        config.validate()?;
        Ok(config)
    }
}
