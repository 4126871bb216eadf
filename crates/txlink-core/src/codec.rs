//! Descriptor <-> token transform.
//!
//! A token is the canonical JSON of a descriptor, Base64-encoded with the
//! standard alphabet and then percent-encoded so it fits in one URL path
//! segment. Decoding reverses the steps and checks the required fields on
//! its own, since any string can be presented as a token.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::descriptor::CallDescriptor;
use crate::error::DecodeError;

/// Route parameter literal a router leaves in place when no token was
/// substituted.
pub const DEFAULT_PLACEHOLDER: &str = ":txData";

/// Encodes `descriptor` as a URL-safe token. Equal descriptors give equal
/// tokens.
pub fn encode_token(descriptor: &CallDescriptor) -> String {
    let json = descriptor.canonical_json().to_string();
    let b64 = STANDARD.encode(json.as_bytes());
    let token = urlencoding::encode(&b64).into_owned();

    debug!(
        contract = %descriptor.contract_address,
        chain_id = descriptor.chain_id,
        function = %descriptor.function_name,
        token_len = token.len(),
        "encoded transaction token"
    );
    token
}

/// Decodes a token, rejecting the default placeholder.
pub fn decode_token(token: &str) -> Result<CallDescriptor, DecodeError> {
    decode_token_with(token, DEFAULT_PLACEHOLDER)
}

/// Decodes a token, rejecting `placeholder` without parsing it.
///
/// A token that a router already percent-decoded once decodes to the same
/// descriptor.
pub fn decode_token_with(token: &str, placeholder: &str) -> Result<CallDescriptor, DecodeError> {
    decode_inner(token, placeholder).inspect_err(|err| {
        warn!(kind = err.kind(), error = %err, "rejected transaction token");
    })
}

fn decode_inner(token: &str, placeholder: &str) -> Result<CallDescriptor, DecodeError> {
    if token == placeholder {
        return Err(DecodeError::Placeholder);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(DecodeError::Malformed("empty token".into()));
    }

    let unescaped = urlencoding::decode(token)
        .map_err(|e| DecodeError::Malformed(format!("percent-decoding: {e}")))?;
    let bytes = STANDARD
        .decode(unescaped.as_bytes())
        .map_err(|e| DecodeError::Malformed(format!("base64: {e}")))?;
    let wire: WireDescriptor = serde_json::from_slice(&bytes)
        .map_err(|e| DecodeError::Malformed(format!("json: {e}")))?;

    let descriptor = wire.into_descriptor();
    let missing = descriptor.missing_fields();
    if !missing.is_empty() {
        return Err(DecodeError::MissingFields(missing));
    }
    Ok(descriptor)
}

/// Decoded token body before the required-field check. Everything is
/// optional here; defaults fill the gaps.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireDescriptor {
    #[serde(default)]
    contract_address: Option<String>,
    #[serde(default)]
    chain_id: Option<u64>,
    #[serde(default)]
    rpc_url: Option<String>,
    #[serde(default)]
    function_name: Option<String>,
    #[serde(default)]
    function_inputs: Option<BTreeMap<String, String>>,
    #[serde(default)]
    output_type: Option<Vec<String>>,
    #[serde(default)]
    is_read_only: Option<bool>,
    #[serde(default)]
    abi: Option<String>,
    #[serde(default)]
    data: Option<String>,
}

impl WireDescriptor {
    fn into_descriptor(self) -> CallDescriptor {
        CallDescriptor {
            contract_address: self.contract_address.unwrap_or_default(),
            chain_id: self.chain_id.unwrap_or_default(),
            rpc_url: self.rpc_url.unwrap_or_default(),
            function_name: self.function_name.unwrap_or_default(),
            function_inputs: self.function_inputs.unwrap_or_default(),
            output_type: self.output_type.unwrap_or_default(),
            is_read_only: self.is_read_only.unwrap_or_default(),
            abi: self.abi,
            data: self.data,
        }
    }
}
