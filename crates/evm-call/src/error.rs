use thiserror::Error;

/// The ABI text could not be read as a JSON array of ABI entries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed ABI: {0}")]
    Malformed(String),
}

/// Selecting a function by name from an ABI document failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("function `{0}` is not present in the ABI")]
    UnknownFunction(String),

    #[error("function `{name}` is overloaded ({count} signatures); select by signature")]
    AmbiguousFunction { name: String, count: usize },
}

/// A string argument could not be coerced to its declared ABI type.
///
/// `param` is the input key the value was supplied under, so the author can
/// correct that one field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value for `{param}`: {reason}")]
pub struct EncodeError {
    pub param: String,
    pub reason: String,
}

impl EncodeError {
    pub fn new(param: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            param: param.into(),
            reason: reason.into(),
        }
    }
}

/// Return data did not match the expected output types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReturnDecodeError {
    #[error("unsupported output type: {0}")]
    UnsupportedType(String),

    #[error("return data too short: need {required} bytes, have {available}")]
    TooShort { required: usize, available: usize },

    #[error("invalid return encoding: {0}")]
    InvalidEncoding(String),
}

/// Address shape errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address must start with 0x")]
    MissingPrefix,

    #[error("expected 40 hex characters, got {0}")]
    InvalidLength(usize),

    #[error("address contains non-hex characters")]
    NonHex,
}

/// EIP-1559 payload construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    #[error("invalid address: {0}")]
    InvalidAddress(#[from] AddressError),

    #[error("missing transaction field: {0}")]
    MissingField(&'static str),
}
