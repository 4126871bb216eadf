pub mod adapter;
pub mod codec;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod link;
pub mod logging;
pub mod types;

use std::collections::BTreeMap;

use evm_call::abi::{decode_return_value, parse_abi, FunctionSignature};
use evm_call::chains;

use config::LinkConfig;
use descriptor::{build_descriptor, CallDescriptor, FlowState};
use error::LinkError;
use types::{
    ChainInfo, DescriptorRecord, FunctionInfo, LinkRequest, LinkSettings, PreparedCallRecord,
    TransactionLink,
};

uniffi::setup_scaffolding!();

// ─── UniFFI-exported functions ───────────────────────────────────────
// Note: UniFFI passes owned String/Vec<u8> across FFI, so all functions
// accept owned types (not references).

/// Default link settings.
#[uniffi::export]
pub fn default_link_settings() -> LinkSettings {
    LinkConfig::default().into()
}

/// Parse link settings from TOML text
#[uniffi::export]
pub fn load_link_settings(toml_text: String) -> Result<LinkSettings, LinkError> {
    Ok(LinkConfig::from_toml_str(&toml_text)?.into())
}

/// List the callable functions of an ABI, in source order
#[uniffi::export]
pub fn parse_abi_functions(abi_json: String) -> Result<Vec<FunctionInfo>, LinkError> {
    let doc = parse_abi(&abi_json)?;
    Ok(doc.functions().map(FunctionInfo::from).collect())
}

/// Build, check and encode a call; returns the token and its shareable URL.
///
/// Arguments are encoded once here so a bad value is reported to the author
/// before the link is shared.
#[uniffi::export]
pub fn create_transaction_link(
    settings: LinkSettings,
    request: LinkRequest,
) -> Result<TransactionLink, LinkError> {
    let config = LinkConfig::try_from(settings)?;
    let doc = parse_abi(&request.abi_json)?;
    let selected = select_function(&doc, &request.function)?;

    let inputs: BTreeMap<String, String> = request.inputs.into_iter().collect();
    let mut descriptor = build_descriptor(
        &request.contract_address,
        request.chain_id,
        &request.rpc_url,
        selected,
        &inputs,
    )?;
    let (_, data) = adapter::build_call_payload(&descriptor)?;
    descriptor.data = Some(format!("0x{}", hex::encode(data)));

    let token = codec::encode_token(&descriptor);
    let url = link::share_url(&config, &token);
    Ok(TransactionLink { token, url })
}

/// Decode a token, or a full link URL, into the descriptor it carries
#[uniffi::export]
pub fn open_transaction_link(
    settings: LinkSettings,
    token_or_url: String,
) -> Result<DescriptorRecord, LinkError> {
    let config = LinkConfig::try_from(settings)?;
    Ok(open(&config, &token_or_url)?.into())
}

/// Prepare the read or write request for a token
#[uniffi::export]
pub fn prepare_transaction(
    settings: LinkSettings,
    token_or_url: String,
) -> Result<PreparedCallRecord, LinkError> {
    let config = LinkConfig::try_from(settings)?;
    let descriptor = open(&config, &token_or_url)?;
    let prepared = adapter::prepare_call(&descriptor, &config)?;
    Ok(PreparedCallRecord::new(prepared, descriptor.chain_id))
}

/// Decode the raw result of a read call as JSON text. Integers are decimal
/// strings, addresses EIP-55 checksummed, bytes `0x`-hex.
#[uniffi::export]
pub fn decode_call_result(
    settings: LinkSettings,
    token_or_url: String,
    raw: Vec<u8>,
) -> Result<String, LinkError> {
    let config = LinkConfig::try_from(settings)?;
    let descriptor = open(&config, &token_or_url)?;
    let value = decode_return_value(&raw, &descriptor.output_type)?;
    Ok(value.to_json().to_string())
}

/// Unsigned EIP-1559 payload (`0x02 || rlp(fields)`) for a write token.
/// Gas, fee cap and priority fee must all be set in the link.
#[uniffi::export]
pub fn transaction_signing_payload(
    settings: LinkSettings,
    token_or_url: String,
    nonce: u64,
) -> Result<Vec<u8>, LinkError> {
    let config = LinkConfig::try_from(settings)?;
    let descriptor = open(&config, &token_or_url)?;
    match adapter::prepare_call(&descriptor, &config)? {
        adapter::PreparedCall::Write(request) => Ok(request.signing_payload(nonce)?),
        adapter::PreparedCall::Read(_) => Err(error::ValidationError::new(
            "isReadOnly",
            "read-only calls are not signed",
        )
        .into()),
    }
}

/// Networks with built-in defaults
#[uniffi::export]
pub fn supported_chains() -> Vec<ChainInfo> {
    chains::supported_chains()
        .into_iter()
        .map(ChainInfo::from)
        .collect()
}

/// The flow step after `state` succeeds
#[uniffi::export]
pub fn next_flow_state(state: FlowState, is_read_only: bool) -> FlowState {
    state.advance(is_read_only)
}

/// Install the tracing subscriber; see [`logging::init_logging`]
#[uniffi::export]
pub fn init_logging(filter: String) -> bool {
    logging::init_logging(&filter)
}

// ─── Helpers ─────────────────────────────────────────────────────────

/// Select by canonical signature when `function` has one, else by name.
fn select_function<'a>(
    doc: &'a evm_call::abi::AbiDocument,
    function: &str,
) -> Result<Option<&'a FunctionSignature>, LinkError> {
    let function = function.trim();
    if function.is_empty() {
        return Ok(None);
    }
    if function.contains('(') {
        return doc
            .function_by_signature(function)
            .map(Some)
            .ok_or_else(|| evm_call::error::SelectionError::UnknownFunction(function.to_string()).into());
    }
    Ok(Some(doc.function(function)?))
}

fn open(config: &LinkConfig, token_or_url: &str) -> Result<CallDescriptor, LinkError> {
    let token = if token_or_url.contains("://") {
        link::token_from_url(config, token_or_url)?
    } else {
        token_or_url.to_string()
    };
    Ok(codec::decode_token_with(&token, &config.placeholder)?)
}
