//! Contract interface documents (Solidity ABI JSON).
//!
//! Entries are sorted into [`AbiEntry`] variants in source order; functions
//! and parameters are held as `alloy_json_abi` types.

use std::fmt;
use std::ops::Deref;

use alloy_json_abi::{Function, Param, StateMutability};
use serde::Deserialize;

use crate::error::{ParseError, SelectionError};

/// Input-map key and signature text of an ABI parameter.
pub trait ParamExt {
    /// Key under which this parameter's value is supplied in an input map.
    /// Unnamed parameters are keyed by position (`param0`, `param1`, ...).
    fn key(&self, index: usize) -> String;

    /// Canonical type text used in signatures, with `tuple` expanded to its
    /// components: `tuple[]` with `(address,uint256)` members becomes
    /// `(address,uint256)[]`.
    fn canonical_type(&self) -> String;
}

impl ParamExt for Param {
    fn key(&self, index: usize) -> String {
        if self.name.is_empty() {
            format!("param{index}")
        } else {
            self.name.clone()
        }
    }

    fn canonical_type(&self) -> String {
        self.selector_type().into_owned()
    }
}

/// ABI JSON spelling of a mutability class.
pub fn mutability_name(mutability: StateMutability) -> &'static str {
    match mutability {
        StateMutability::Pure => "pure",
        StateMutability::View => "view",
        StateMutability::NonPayable => "nonpayable",
        StateMutability::Payable => "payable",
    }
}

/// A callable contract function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature(Function);

impl FunctionSignature {
    pub fn new(function: Function) -> Self {
        Self(function)
    }

    pub fn as_function(&self) -> &Function {
        &self.0
    }

    /// First 4 bytes of the Keccak-256 hash of the canonical signature.
    pub fn selector(&self) -> [u8; 4] {
        self.0.selector().0
    }

    /// `pure` and `view` functions are queried, never sent as transactions.
    pub fn is_read_only(&self) -> bool {
        matches!(
            self.state_mutability,
            StateMutability::Pure | StateMutability::View
        )
    }

    pub fn is_payable(&self) -> bool {
        self.state_mutability == StateMutability::Payable
    }

    /// Input-map keys of the declared parameters, in order.
    pub fn input_keys(&self) -> Vec<String> {
        self.inputs
            .iter()
            .enumerate()
            .map(|(i, p)| p.key(i))
            .collect()
    }

    /// Canonical type strings of the return values.
    pub fn output_types(&self) -> Vec<String> {
        self.outputs.iter().map(ParamExt::canonical_type).collect()
    }

    /// JSON text of a one-entry ABI holding only this function.
    pub fn to_abi_json(&self) -> String {
        serde_json::json!([{
            "type": "function",
            "name": self.name,
            "inputs": self.inputs,
            "outputs": self.outputs,
            "stateMutability": mutability_name(self.state_mutability),
        }])
        .to_string()
    }
}

impl Deref for FunctionSignature {
    type Target = Function;

    fn deref(&self) -> &Function {
        &self.0
    }
}

impl fmt::Display for FunctionSignature {
    /// Human-readable form: `transfer(address _to, uint256 _value) returns (bool)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn params(list: &[Param]) -> String {
            list.iter()
                .map(|p| {
                    if p.name.is_empty() {
                        p.canonical_type()
                    } else {
                        format!("{} {}", p.canonical_type(), p.name)
                    }
                })
                .collect::<Vec<_>>()
                .join(", ")
        }

        write!(f, "{}({})", self.name, params(&self.inputs))?;
        if !self.outputs.is_empty() {
            write!(f, " returns ({})", params(&self.outputs))?;
        }
        Ok(())
    }
}

/// One entry of an ABI document.
#[derive(Debug, Clone, PartialEq)]
pub enum AbiEntry {
    Function(FunctionSignature),
    Event {
        name: String,
        inputs: Vec<Param>,
        anonymous: bool,
    },
    Error {
        name: String,
        inputs: Vec<Param>,
    },
    Constructor {
        inputs: Vec<Param>,
        state_mutability: StateMutability,
    },
    Fallback {
        state_mutability: StateMutability,
    },
    Receive,
}

/// Wire shape of a parameter. Type text is trimmed; `internalType` and
/// `indexed` are not kept.
#[derive(Deserialize)]
struct RawParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    components: Vec<RawParam>,
}

impl From<RawParam> for Param {
    fn from(raw: RawParam) -> Self {
        Param {
            ty: raw.ty.trim().to_string(),
            name: raw.name,
            components: raw.components.into_iter().map(Param::from).collect(),
            internal_type: None,
        }
    }
}

fn into_params(raw: Vec<RawParam>) -> Vec<Param> {
    raw.into_iter().map(Param::from).collect()
}

/// Wire shape of an ABI entry before it is sorted into an [`AbiEntry`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    #[serde(rename = "type", default = "default_entry_type")]
    kind: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    inputs: Vec<RawParam>,
    #[serde(default)]
    outputs: Vec<RawParam>,
    #[serde(default)]
    state_mutability: Option<StateMutability>,
    // Pre-0.4.16 compilers emit these instead of `stateMutability`.
    #[serde(default)]
    constant: Option<bool>,
    #[serde(default)]
    payable: Option<bool>,
    #[serde(default)]
    anonymous: bool,
}

fn default_entry_type() -> String {
    "function".to_string()
}

impl RawEntry {
    fn mutability(&self) -> StateMutability {
        self.state_mutability.unwrap_or(match (self.payable, self.constant) {
            (Some(true), _) => StateMutability::Payable,
            (_, Some(true)) => StateMutability::View,
            _ => StateMutability::NonPayable,
        })
    }

    fn into_entry(self, position: usize) -> Result<AbiEntry, ParseError> {
        let state_mutability = self.mutability();
        let kind = self.kind;
        let name = self.name.filter(|n| !n.is_empty()).ok_or_else(|| {
            ParseError::Malformed(format!("{kind} entry at index {position} has no name"))
        });
        let entry = match kind.as_str() {
            "function" => AbiEntry::Function(FunctionSignature(Function {
                name: name?,
                inputs: into_params(self.inputs),
                outputs: into_params(self.outputs),
                state_mutability,
            })),
            "event" => AbiEntry::Event {
                name: name?,
                inputs: into_params(self.inputs),
                anonymous: self.anonymous,
            },
            "error" => AbiEntry::Error {
                name: name?,
                inputs: into_params(self.inputs),
            },
            "constructor" => AbiEntry::Constructor {
                inputs: into_params(self.inputs),
                state_mutability,
            },
            "fallback" => AbiEntry::Fallback { state_mutability },
            "receive" => AbiEntry::Receive,
            other => {
                return Err(ParseError::Malformed(format!(
                    "unknown entry type `{other}` at index {position}"
                )))
            }
        };
        Ok(entry)
    }
}

/// A parsed contract interface. Entry order follows the source document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AbiDocument {
    pub entries: Vec<AbiEntry>,
}

impl AbiDocument {
    /// Callable functions in source order. Overloads appear once per
    /// signature.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionSignature> {
        self.entries.iter().filter_map(|entry| match entry {
            AbiEntry::Function(f) => Some(f),
            _ => None,
        })
    }

    /// Selects the single function called `name`.
    ///
    /// Overloaded names are reported as [`SelectionError::AmbiguousFunction`];
    /// the caller has to disambiguate, nothing here guesses.
    pub fn function(&self, name: &str) -> Result<&FunctionSignature, SelectionError> {
        let mut matches = self.functions().filter(|f| f.name == name);
        let first = matches
            .next()
            .ok_or_else(|| SelectionError::UnknownFunction(name.to_string()))?;
        let extra = matches.count();
        if extra > 0 {
            return Err(SelectionError::AmbiguousFunction {
                name: name.to_string(),
                count: extra + 1,
            });
        }
        Ok(first)
    }

    /// Selects a function by canonical signature (`name(type,...)`), which is
    /// unambiguous for overloads.
    pub fn function_by_signature(&self, signature: &str) -> Option<&FunctionSignature> {
        self.functions().find(|f| f.signature() == signature)
    }
}

/// Parses ABI JSON text.
///
/// The text must be a JSON array of objects. An empty array, or one with no
/// functions, is a valid document with nothing callable.
pub fn parse_abi(source: &str) -> Result<AbiDocument, ParseError> {
    let raw: Vec<RawEntry> =
        serde_json::from_str(source).map_err(|e| ParseError::Malformed(e.to_string()))?;

    let entries = raw
        .into_iter()
        .enumerate()
        .map(|(i, entry)| entry.into_entry(i))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AbiDocument { entries })
}

/// Functions of `doc` in source order.
pub fn list_functions(doc: &AbiDocument) -> Vec<&FunctionSignature> {
    doc.functions().collect()
}
