//! Solidity ABI: interface documents, argument coercion, call encoding and
//! return-data decoding.

mod coerce;
mod decode;
mod document;
mod encode;
mod types;

pub use alloy_dyn_abi::{DynSolType, DynSolValue};
pub use alloy_json_abi::{Function, Param, StateMutability};

pub use coerce::{coerce, parse_int, parse_uint};
pub use decode::{decode, decode_return_value, ReturnValue};
pub use document::{
    list_functions, mutability_name, parse_abi, AbiDocument, AbiEntry, FunctionSignature,
    ParamExt,
};
pub use encode::encode_call;
pub use types::{resolve_type, value_to_json, MAX_TYPE_DEPTH};
