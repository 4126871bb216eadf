use evm_call::error::{
    EncodeError, ParseError, ReturnDecodeError, SelectionError, TransactionError,
};
use thiserror::Error;

/// A descriptor field is missing or unusable. `field` is the descriptor
/// field or the ABI parameter name, reported verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// A token or a call result could not be turned back into data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("token is the unresolved route placeholder")]
    Placeholder,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token is missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("return value decode failed: {0}")]
    ReturnDecodeFailure(#[from] ReturnDecodeError),
}

impl DecodeError {
    /// Short, stable name of the failure kind for log events.
    pub fn kind(&self) -> &'static str {
        match self {
            DecodeError::Placeholder => "placeholder",
            DecodeError::Malformed(_) => "malformed",
            DecodeError::MissingFields(_) => "missing_fields",
            DecodeError::ReturnDecodeFailure(_) => "return_decode_failure",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unable to read config: {0}")]
    Io(String),

    #[error("unable to parse config: {0}")]
    Parse(String),

    #[error("no RPC URL known for chain {0}")]
    UnsupportedChain(u64),
}

/// Failure reported by the wallet or transport behind an
/// [`ExecutionAdapter`](crate::adapter::ExecutionAdapter).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    #[error("request rejected by the user")]
    Rejected,

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("transaction reverted: {0}")]
    Reverted(String),
}

/// Error surfaced to hosts. Every lower-layer error converts into the
/// variant that names its kind; messages keep field and parameter names.
#[derive(Debug, Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum LinkError {
    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("{0}")]
    Selection(#[from] SelectionError),

    #[error("invalid descriptor field {0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Encode(#[from] EncodeError),

    #[error("{0}")]
    Decode(#[from] DecodeError),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Adapter(#[from] AdapterError),

    #[error("transaction payload: {0}")]
    Transaction(#[from] TransactionError),
}

impl From<ReturnDecodeError> for LinkError {
    fn from(e: ReturnDecodeError) -> Self {
        LinkError::Decode(e.into())
    }
}
