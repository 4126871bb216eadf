//! EVM contract-call building blocks.
//!
//! This crate provides:
//! - Solidity ABI parsing, argument coercion, calldata encoding and
//!   return-data decoding
//! - Account-address shape checks and EIP-55 checksums
//! - Unsigned EIP-1559 signing payloads
//! - Multi-chain EVM network definitions

pub mod abi;
pub mod address;
pub mod chains;
pub mod error;
pub mod transaction;

pub use abi::{
    decode_return_value, encode_call, list_functions, mutability_name, parse_abi, AbiDocument,
    FunctionSignature, ReturnValue, StateMutability,
};
pub use error::{AddressError, EncodeError, ParseError, ReturnDecodeError, SelectionError, TransactionError};
pub use transaction::Eip1559Request;
