//! Boundary between the core and the wallet/transport that runs a call.
//!
//! The core turns a descriptor into a [`PreparedCall`]; an
//! [`ExecutionAdapter`] supplied by the host performs it.

use evm_call::abi::{
    decode_return_value, encode_call, mutability_name, FunctionSignature, ReturnValue,
};
use evm_call::error::TransactionError;
use evm_call::transaction::Eip1559Request;
use tracing::{info, warn};

use crate::config::LinkConfig;
use crate::descriptor::{CallDescriptor, TransportOverrides};
use crate::error::{AdapterError, LinkError, ValidationError};

/// An `eth_call` against `to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRequest {
    pub to: String,
    pub data: Vec<u8>,
    pub rpc_url: String,
}

/// A transaction for the wallet to sign and submit. Unset gas fields are
/// left to the wallet to estimate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRequest {
    pub to: String,
    pub value: u128,
    pub data: Vec<u8>,
    pub gas: Option<u64>,
    pub max_fee_per_gas: Option<u128>,
    pub max_priority_fee_per_gas: Option<u128>,
    pub chain_id: u64,
    pub rpc_url: String,
}

impl WriteRequest {
    /// Unsigned EIP-1559 payload at `nonce`. All three gas fields must be
    /// set.
    pub fn signing_payload(&self, nonce: u64) -> Result<Vec<u8>, TransactionError> {
        let request = Eip1559Request {
            chain_id: self.chain_id,
            nonce,
            max_priority_fee_per_gas: self
                .max_priority_fee_per_gas
                .ok_or(TransactionError::MissingField("maxPriorityFeePerGas"))?,
            max_fee_per_gas: self
                .max_fee_per_gas
                .ok_or(TransactionError::MissingField("maxFeePerGas"))?,
            gas_limit: self.gas.ok_or(TransactionError::MissingField("gas"))?,
            to: self.to.clone(),
            value: self.value,
            data: self.data.clone(),
        };
        request.encode_unsigned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreparedCall {
    Read(ReadRequest),
    Write(WriteRequest),
}

impl PreparedCall {
    pub fn is_read_only(&self) -> bool {
        matches!(self, PreparedCall::Read(_))
    }

    pub fn data(&self) -> &[u8] {
        match self {
            PreparedCall::Read(r) => &r.data,
            PreparedCall::Write(w) => &w.data,
        }
    }
}

/// What the wallet reports after submitting a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    /// `0x`-prefixed transaction hash.
    pub tx_hash: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    Read(ReturnValue),
    Sent(TxReceipt),
}

/// Performs prepared calls. Implemented by the host around its wallet and
/// RPC client.
pub trait ExecutionAdapter {
    /// Runs a read-only call and returns the raw return data.
    fn call(&self, request: &ReadRequest) -> Result<Vec<u8>, AdapterError>;

    /// Has the wallet sign and submit a transaction.
    fn send_transaction(&self, request: &WriteRequest) -> Result<TxReceipt, AdapterError>;
}

/// Rebuilds the selected function and encodes its calldata.
///
/// Calldata embedded in the descriptor is not trusted; it is recomputed and
/// a mismatch is logged.
pub fn build_call_payload(
    descriptor: &CallDescriptor,
) -> Result<(FunctionSignature, Vec<u8>), LinkError> {
    let signature = descriptor.function_signature()?;
    let data = encode_call(&signature, &descriptor.function_inputs)?;

    if let Some(embedded) = descriptor.data.as_deref() {
        let recomputed = format!("0x{}", hex::encode(&data));
        if !embedded.eq_ignore_ascii_case(&recomputed) {
            warn!(
                contract = %descriptor.contract_address,
                function = %descriptor.function_name,
                "embedded calldata differs from recomputed calldata; using recomputed"
            );
        }
    }

    Ok((signature, data))
}

/// Turns a descriptor into the request an adapter performs.
///
/// A descriptor flagged read-only is always prepared as a read, even when
/// the ABI marks the function as a write. A descriptor flagged as a write
/// for a `view` or `pure` function is refused. For writes the transport
/// fields are parsed from the inputs, and a non-zero value is only allowed
/// on payable functions.
pub fn prepare_call(
    descriptor: &CallDescriptor,
    config: &LinkConfig,
) -> Result<PreparedCall, LinkError> {
    let (signature, data) = build_call_payload(descriptor)?;
    let rpc_url = config.resolve_rpc_url(descriptor.chain_id, &descriptor.rpc_url)?;

    match (descriptor.is_read_only, signature.is_read_only()) {
        (true, false) => warn!(
            function = %signature.signature(),
            "descriptor is flagged read-only for a state-changing function; preparing a read"
        ),
        (false, true) => {
            return Err(ValidationError::new(
                "isReadOnly",
                format!(
                    "`{}` is {} and cannot be sent as a transaction",
                    signature.name,
                    mutability_name(signature.state_mutability)
                ),
            )
            .into())
        }
        _ => {}
    }

    if descriptor.is_read_only {
        return Ok(PreparedCall::Read(ReadRequest {
            to: descriptor.contract_address.clone(),
            data,
            rpc_url,
        }));
    }

    let overrides = TransportOverrides::from_inputs(&descriptor.function_inputs, &signature.input_keys())?;
    let value = overrides.value_or_zero();
    if value != 0 && !signature.is_payable() {
        return Err(ValidationError::new(
            "value",
            format!("`{}` is not payable", signature.name),
        )
        .into());
    }

    Ok(PreparedCall::Write(WriteRequest {
        to: descriptor.contract_address.clone(),
        value,
        data,
        gas: overrides.gas,
        max_fee_per_gas: overrides.max_fee_per_gas,
        max_priority_fee_per_gas: overrides.max_priority_fee_per_gas,
        chain_id: descriptor.chain_id,
        rpc_url,
    }))
}

/// Prepares `descriptor` and runs it through `adapter`. Reads are decoded
/// against the descriptor's output types.
pub fn execute<A: ExecutionAdapter + ?Sized>(
    adapter: &A,
    descriptor: &CallDescriptor,
    config: &LinkConfig,
) -> Result<ExecutionOutcome, LinkError> {
    match prepare_call(descriptor, config)? {
        PreparedCall::Read(request) => {
            let raw = adapter.call(&request).inspect_err(|err| {
                warn!(function = %descriptor.function_name, error = %err, "read call failed");
            })?;
            let value = decode_return_value(&raw, &descriptor.output_type)?;
            info!(
                function = %descriptor.function_name,
                chain_id = descriptor.chain_id,
                bytes = raw.len(),
                "read call completed"
            );
            Ok(ExecutionOutcome::Read(value))
        }
        PreparedCall::Write(request) => {
            let receipt = adapter.send_transaction(&request).inspect_err(|err| {
                warn!(function = %descriptor.function_name, error = %err, "transaction failed");
            })?;
            info!(
                function = %descriptor.function_name,
                chain_id = descriptor.chain_id,
                tx_hash = %receipt.tx_hash,
                "transaction submitted"
            );
            Ok(ExecutionOutcome::Sent(receipt))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    use evm_call::abi::{parse_abi, value_to_json, DynSolValue};

    use super::*;
    use crate::descriptor::build_descriptor;
    use crate::error::DecodeError;

    const CONTRACT: &str = "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174";

    const ABI: &str = r#"[
        {"type":"function","name":"transfer","stateMutability":"nonpayable",
         "inputs":[{"name":"_to","type":"address"},{"name":"_value","type":"uint256"}],
         "outputs":[{"name":"","type":"bool"}]},
        {"type":"function","name":"getReserves","stateMutability":"view","inputs":[],
         "outputs":[{"name":"r0","type":"uint112"},{"name":"open","type":"bool"}]},
        {"type":"function","name":"deposit","stateMutability":"payable","inputs":[],"outputs":[]}
    ]"#;

    /// Records requests and answers with canned data.
    #[derive(Default)]
    struct MockAdapter {
        reads: RefCell<Vec<ReadRequest>>,
        writes: RefCell<Vec<WriteRequest>>,
        return_data: Vec<u8>,
        reject: bool,
    }

    impl ExecutionAdapter for MockAdapter {
        fn call(&self, request: &ReadRequest) -> Result<Vec<u8>, AdapterError> {
            self.reads.borrow_mut().push(request.clone());
            Ok(self.return_data.clone())
        }

        fn send_transaction(&self, request: &WriteRequest) -> Result<TxReceipt, AdapterError> {
            if self.reject {
                return Err(AdapterError::Rejected);
            }
            self.writes.borrow_mut().push(request.clone());
            Ok(TxReceipt {
                tx_hash: format!("0x{}", "ab".repeat(32)),
            })
        }
    }

    fn descriptor(name: &str, pairs: &[(&str, &str)]) -> CallDescriptor {
        let doc = parse_abi(ABI).unwrap();
        let inputs: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        build_descriptor(CONTRACT, 137, "", Some(doc.function(name).unwrap()), &inputs).unwrap()
    }

    fn word(n: u8) -> Vec<u8> {
        let mut w = vec![0u8; 32];
        w[31] = n;
        w
    }

    #[test]
    fn read_flow_decodes_outputs() {
        let mut raw = word(9);
        raw.extend(word(1));
        let adapter = MockAdapter {
            return_data: raw,
            ..MockAdapter::default()
        };

        let outcome = execute(&adapter, &descriptor("getReserves", &[]), &LinkConfig::default()).unwrap();

        match outcome {
            ExecutionOutcome::Read(ReturnValue::Tuple(values)) => {
                assert_eq!(values[1], DynSolValue::Bool(true));
                assert_eq!(value_to_json(&values[0]), serde_json::json!("9"));
            }
            other => panic!("expected a decoded tuple, got {other:?}"),
        }
        let reads = adapter.reads.borrow();
        assert_eq!(reads.len(), 1);
        assert_eq!(reads[0].rpc_url, "https://polygon-rpc.com");
        assert!(adapter.writes.borrow().is_empty());
    }

    #[test]
    fn short_return_data_is_a_decode_failure() {
        let adapter = MockAdapter {
            return_data: word(9),
            ..MockAdapter::default()
        };
        let err = execute(&adapter, &descriptor("getReserves", &[]), &LinkConfig::default()).unwrap_err();
        assert!(matches!(err, LinkError::Decode(DecodeError::ReturnDecodeFailure(_))));
    }

    #[test]
    fn write_flow_carries_transport_fields() {
        let adapter = MockAdapter::default();
        let d = descriptor(
            "transfer",
            &[
                ("_to", "0x000000000000000000000000000000000000dEaD"),
                ("_value", "1000"),
                ("gas", "65000"),
                ("maxgas", "30000000000"),
                ("maxpriogas", "1500000000"),
            ],
        );

        let outcome = execute(&adapter, &d, &LinkConfig::default()).unwrap();
        assert!(matches!(outcome, ExecutionOutcome::Sent(_)));

        let writes = adapter.writes.borrow();
        let w = &writes[0];
        assert_eq!(w.chain_id, 137);
        assert_eq!(w.value, 0);
        assert_eq!(w.gas, Some(65_000));
        assert_eq!(w.max_fee_per_gas, Some(30_000_000_000));
        assert_eq!(w.max_priority_fee_per_gas, Some(1_500_000_000));
        // Transport fields never reach the calldata.
        assert_eq!(w.data.len(), 68);
        assert_eq!(&w.data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn rejected_transaction_surfaces_adapter_error() {
        let adapter = MockAdapter {
            reject: true,
            ..MockAdapter::default()
        };
        let d = descriptor(
            "transfer",
            &[("_to", "0x000000000000000000000000000000000000dEaD"), ("_value", "1")],
        );
        assert!(matches!(
            execute(&adapter, &d, &LinkConfig::default()),
            Err(LinkError::Adapter(AdapterError::Rejected))
        ));
    }

    #[test]
    fn value_requires_payable() {
        let d = descriptor(
            "transfer",
            &[
                ("_to", "0x000000000000000000000000000000000000dEaD"),
                ("_value", "1"),
                ("value", "5"),
            ],
        );
        match prepare_call(&d, &LinkConfig::default()) {
            Err(LinkError::Validation(e)) => assert_eq!(e.field, "value"),
            other => panic!("expected a value validation error, got {other:?}"),
        }

        let deposit = descriptor("deposit", &[("value", "0x10")]);
        match prepare_call(&deposit, &LinkConfig::default()).unwrap() {
            PreparedCall::Write(w) => assert_eq!(w.value, 16),
            other => panic!("expected a write, got {other:?}"),
        }
    }

    #[test]
    fn bad_argument_is_reported_before_any_io() {
        let adapter = MockAdapter::default();
        let d = descriptor(
            "transfer",
            &[("_to", "0x000000000000000000000000000000000000dEaD"), ("_value", "abc")],
        );
        match execute(&adapter, &d, &LinkConfig::default()) {
            Err(LinkError::Encode(e)) => assert_eq!(e.param, "_value"),
            other => panic!("expected an encode error, got {other:?}"),
        }
        assert!(adapter.writes.borrow().is_empty());
    }

    #[test]
    fn unknown_chain_needs_an_rpc_url() {
        let mut d = descriptor("getReserves", &[]);
        d.chain_id = 424_242;
        assert!(matches!(
            prepare_call(&d, &LinkConfig::default()),
            Err(LinkError::Config(_))
        ));

        d.rpc_url = "https://rpc.example.org".into();
        assert!(prepare_call(&d, &LinkConfig::default()).unwrap().is_read_only());
    }

    #[test]
    fn read_only_flag_on_a_write_function_prepares_a_read() {
        let adapter = MockAdapter {
            return_data: word(1),
            ..MockAdapter::default()
        };
        let mut d = descriptor(
            "transfer",
            &[("_to", "0x000000000000000000000000000000000000dEaD"), ("_value", "1")],
        );
        d.is_read_only = true;

        let prepared = prepare_call(&d, &LinkConfig::default()).unwrap();
        assert!(prepared.is_read_only());
        assert_eq!(&prepared.data()[..4], &[0xa9, 0x05, 0x9c, 0xbb]);

        let outcome = execute(&adapter, &d, &LinkConfig::default()).unwrap();
        assert!(matches!(outcome, ExecutionOutcome::Read(_)));
        assert_eq!(adapter.reads.borrow().len(), 1);
        assert!(adapter.writes.borrow().is_empty());
    }

    #[test]
    fn write_flag_on_a_view_function_is_refused() {
        let adapter = MockAdapter::default();
        let mut d = descriptor("getReserves", &[]);
        d.is_read_only = false;

        match prepare_call(&d, &LinkConfig::default()) {
            Err(LinkError::Validation(e)) => {
                assert_eq!(e.field, "isReadOnly");
                assert!(e.reason.contains("view"));
            }
            other => panic!("expected an isReadOnly validation error, got {other:?}"),
        }
        assert!(execute(&adapter, &d, &LinkConfig::default()).is_err());
        assert!(adapter.reads.borrow().is_empty());
        assert!(adapter.writes.borrow().is_empty());
    }

    #[test]
    fn signing_payload_needs_gas_fields() {
        let d = descriptor(
            "transfer",
            &[("_to", "0x000000000000000000000000000000000000dEaD"), ("_value", "1")],
        );
        let PreparedCall::Write(mut w) = prepare_call(&d, &LinkConfig::default()).unwrap() else {
            panic!("transfer is a write");
        };
        assert_eq!(
            w.signing_payload(0),
            Err(TransactionError::MissingField("maxPriorityFeePerGas"))
        );

        w.gas = Some(65_000);
        w.max_fee_per_gas = Some(30_000_000_000);
        w.max_priority_fee_per_gas = Some(1_000_000_000);
        let payload = w.signing_payload(3).unwrap();
        assert_eq!(payload[0], 0x02);
    }
}
