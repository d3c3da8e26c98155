//! General error types
//!
//! This module defines the error classes that are shared between the
//! schema layer and the cursor layer, as well as the umbrella type
//! [`BcsError`] that every public codec entry point reports through.
//!
//! The cursor-specific refinements live next to the code that raises
//! them: [`ParseError`](crate::parse::error::ParseError) in
//! `parse::error`, and [`CapacityError`](crate::write::error::CapacityError)
//! in `write::error`.

use std::error::Error;
use std::fmt::Display;

use crate::parse::error::ParseError;
use crate::write::error::CapacityError;

/// Enumerated error type for failures related to schema constructs
/// that impose a check on the element-count of their prospective
/// values, which are typically collection types.
#[derive(Clone, PartialEq, PartialOrd, Eq, Ord, Debug)]
pub enum LengthError {
    /// Restriction on maximum element-count exceeded
    TooLong { limit: usize, actual: usize },
    /// Requirement of precise element-count not satisfied
    WrongLength { exact: usize, actual: usize },
}

impl Display for LengthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LengthError::TooLong { limit, actual } => {
                write!(
                    f,
                    "{actual}-element value exceeded limit of {limit} elements"
                )
            }
            LengthError::WrongLength { exact, actual } => {
                write!(
                    f,
                    "{actual}-element value violated requirement of {exact} elements"
                )
            }
        }
    }
}

impl Error for LengthError {}

/// Rejection of an input value before any byte of it is written.
///
/// Every schema runs its validator ahead of its write logic, so a
/// value that trips any of these cases leaves the output buffer
/// untouched.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ValidationError {
    /// Input integer does not fit into the declared bit-width
    IntegerOverflow {
        name: &'static str,
        bits: u32,
        value: String,
    },
    /// Input collection has the wrong number of elements
    Length(LengthError),
    /// Input named a variant the enumeration does not declare
    UnknownVariant { enum_name: String, variant: String },
    /// Input object matched more than one declared variant key
    AmbiguousVariant {
        enum_name: String,
        matches: Vec<String>,
    },
    /// Input object matched none of the declared variant keys
    NoVariantKey { enum_name: String },
    /// Input object is missing a declared struct field
    MissingField {
        struct_name: String,
        field: &'static str,
    },
    /// Dynamic input value is of the wrong kind for the schema slot
    Mismatch {
        expected: &'static str,
        actual: &'static str,
    },
    /// Rejection raised by a user-supplied transform validator
    Custom(String),
}

impl ValidationError {
    /// Constructs the [`Custom`](Self::Custom) case from any displayable
    /// rejection reason.
    ///
    /// This is the intended failure channel for validators passed to
    /// [`transform_validated`](crate::schema::BcsType::transform_validated).
    pub fn custom(reason: impl Display) -> Self {
        Self::Custom(reason.to_string())
    }
}

impl From<LengthError> for ValidationError {
    fn from(err: LengthError) -> Self {
        Self::Length(err)
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::IntegerOverflow { name, bits, value } => {
                write!(f, "value {value} does not fit into {name} ({bits} bits)")
            }
            ValidationError::Length(err) => Display::fmt(err, f),
            ValidationError::UnknownVariant { enum_name, variant } => {
                write!(f, "enum-type {enum_name} has no variant named `{variant}`")
            }
            ValidationError::AmbiguousVariant { enum_name, matches } => {
                write!(
                    f,
                    "input for enum-type {enum_name} matched {} variant keys: {matches:?}",
                    matches.len()
                )
            }
            ValidationError::NoVariantKey { enum_name } => {
                write!(f, "input for enum-type {enum_name} matched no variant key")
            }
            ValidationError::MissingField { struct_name, field } => {
                write!(
                    f,
                    "input for struct-type {struct_name} is missing field `{field}`"
                )
            }
            ValidationError::Mismatch { expected, actual } => {
                write!(f, "expected {expected} input, found {actual}")
            }
            ValidationError::Custom(reason) => write!(f, "{reason}"),
        }
    }
}

impl Error for ValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ValidationError::Length(err) => Some(err),
            _ => None,
        }
    }
}

/// Failures of the name-registry façade.
///
/// The combinator layer itself cannot produce these: a schema graph
/// assembled from typed combinators is shape-checked by the compiler.
/// They arise only when schemas are looked up and composed through
/// string-valued type expressions at runtime.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SchemaError {
    /// Name does not resolve to any registered schema or factory
    UnknownName(String),
    /// Type expression could not be parsed
    BadTypeExpression { expr: String, reason: &'static str },
    /// Generic schema instantiated with the wrong number of arguments
    Arity {
        name: String,
        expected: usize,
        actual: usize,
    },
    /// Alias chain revisited a name it had already passed through
    AliasCycle { chain: Vec<String> },
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaError::UnknownName(name) => {
                write!(f, "no schema registered under the name `{name}`")
            }
            SchemaError::BadTypeExpression { expr, reason } => {
                write!(f, "malformed type expression `{expr}`: {reason}")
            }
            SchemaError::Arity {
                name,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "schema `{name}` takes {expected} type argument(s), received {actual}"
                )
            }
            SchemaError::AliasCycle { chain } => {
                write!(f, "alias resolution entered a cycle: {}", chain.join(" -> "))
            }
        }
    }
}

impl Error for SchemaError {}

/// Failure to decode a string rendition (hex, base58, base64) of a
/// byte-sequence before parsing could begin.
///
/// The string codecs themselves are external adapters; this type
/// wraps their error values into the crate's failure channel.
#[derive(Debug)]
pub enum ConvError {
    /// Input was not a valid hex string
    Hex(hex::FromHexError),
    /// Input was not a valid base58 string
    Base58(bs58::decode::Error),
    /// Input was not a valid base64 string
    Base64(base64::DecodeError),
}

impl Display for ConvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConvError::Hex(err) => write!(f, "hex decoding failed: {err}"),
            ConvError::Base58(err) => write!(f, "base58 decoding failed: {err}"),
            ConvError::Base64(err) => write!(f, "base64 decoding failed: {err}"),
        }
    }
}

impl Error for ConvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConvError::Hex(err) => Some(err),
            ConvError::Base58(err) => Some(err),
            ConvError::Base64(err) => Some(err),
        }
    }
}

/// Enumeration over every failure class a public codec operation can
/// report.
///
/// All errors are fatal to the call that raised them; nothing is
/// retried internally, and no partial output is observable (the
/// serialized envelope is only constructed after the write path has
/// completed cleanly).
#[derive(Debug)]
pub enum BcsError {
    /// Input rejected by a validator before any byte was written
    Validation(ValidationError),
    /// Writer needed to grow past its configured maximum size
    Capacity(CapacityError),
    /// Reader ran out of input or met bytes the schema cannot accept
    Parse(ParseError),
    /// Registry façade failure
    Schema(SchemaError),
    /// String rendition of the input bytes failed to decode
    Conv(ConvError),
}

impl From<ValidationError> for BcsError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<CapacityError> for BcsError {
    fn from(err: CapacityError) -> Self {
        Self::Capacity(err)
    }
}

impl From<ParseError> for BcsError {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

impl From<SchemaError> for BcsError {
    fn from(err: SchemaError) -> Self {
        Self::Schema(err)
    }
}

impl From<LengthError> for BcsError {
    fn from(err: LengthError) -> Self {
        Self::Validation(ValidationError::Length(err))
    }
}

impl From<ConvError> for BcsError {
    fn from(err: ConvError) -> Self {
        Self::Conv(err)
    }
}

impl Display for BcsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BcsError::Validation(err) => Display::fmt(err, f),
            BcsError::Capacity(err) => Display::fmt(err, f),
            BcsError::Parse(err) => Display::fmt(err, f),
            BcsError::Schema(err) => Display::fmt(err, f),
            BcsError::Conv(err) => Display::fmt(err, f),
        }
    }
}

impl Error for BcsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BcsError::Validation(err) => Some(err),
            BcsError::Capacity(err) => Some(err),
            BcsError::Parse(err) => Some(err),
            BcsError::Schema(err) => Some(err),
            BcsError::Conv(err) => Some(err),
        }
    }
}

/// Type alias for `Result` with an error type of [`BcsError`]
///
/// This is the return shape of every schema-level entry point:
/// `serialize`, `parse`, and `write`.
pub type BcsResult<T> = std::result::Result<T, BcsError>;
