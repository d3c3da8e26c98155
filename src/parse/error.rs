//! Error types used to report failure in low-level parsing
//!
//! This module defines the primary type [`ParseError`] and the alias
//! [`ParseResult`], along with the refinement [`TokenError`] for
//! failures in which the buffer held enough bytes, but those bytes
//! were not acceptable to the schema being parsed.

use std::error::Error;
use std::fmt::{Display, Formatter, Result};
use std::string::FromUtf8Error;

/// Enumeration type over all errors that may be encountered when
/// consuming bytes through a [`Reader`](crate::parse::Reader).
#[derive(Debug)]
pub enum ParseError {
    /// Error case when a consume operation would advance the cursor
    /// past the end of the buffer.
    ///
    /// No bytes are consumed by the failing call; the cursor is left
    /// where it was.
    OutOfBounds {
        offset: usize,
        requested: usize,
        limit: usize,
    },
    /// Error class encountered when low-level parsing is unsuccessful
    /// due to a failure of expectation in terms of the binary-lexical
    /// contents of the buffer.
    ///
    /// This includes invalid discriminants, illegal values for bytes
    /// intended to represent booleans, overlong variable-length
    /// integers, and byte-sequences that fail UTF-8 validation.
    Token(TokenError),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            ParseError::OutOfBounds {
                offset,
                requested,
                limit,
            } => {
                write!(
                    f,
                    "cannot consume {requested} bytes (currently at byte {offset} out of {limit})"
                )
            }
            ParseError::Token(err) => Display::fmt(err, f),
        }
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ParseError::OutOfBounds { .. } => None,
            ParseError::Token(err) => Some(err),
        }
    }
}

/// Type alias for Result with an error type of [`ParseError`]
///
/// Most `Reader` methods, and the read half of every schema, have a
/// return type of `ParseResult<T>` for various `T`.
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Errors arising from unexpected tokens in the buffer
#[derive(Debug)]
pub enum TokenError {
    /// Byte parsed as a boolean was neither `0x00` nor `0x01`
    InvalidBoolean(u8),
    /// Variable-length integer failed to terminate within its
    /// maximum permitted byte-width
    NonTerminating { limit: usize },
    /// Variable-length integer terminated, but its value does not fit
    /// into the 32-bit range used for lengths and discriminants
    Overflow { bits: u32 },
    /// Parsed discriminant does not select any declared variant
    InvalidTag { tag: u32, for_type: String },
    /// Parsed byte-sequence was not valid UTF-8
    Utf8(FromUtf8Error),
}

impl From<TokenError> for ParseError {
    fn from(err: TokenError) -> Self {
        Self::Token(err)
    }
}

impl From<FromUtf8Error> for ParseError {
    fn from(err: FromUtf8Error) -> Self {
        Self::Token(TokenError::Utf8(err))
    }
}

impl Display for TokenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            TokenError::InvalidBoolean(byte) => {
                write!(f, "invalid boolean encoding 0x{byte:02x}")
            }
            TokenError::NonTerminating { limit } => {
                write!(
                    f,
                    "variable-length integer failed to terminate within {limit} bytes"
                )
            }
            TokenError::Overflow { bits } => {
                write!(
                    f,
                    "variable-length integer exceeds the {bits}-bit range of its use site"
                )
            }
            TokenError::InvalidTag { tag, for_type } => {
                write!(f, "unexpected discriminant {tag} for enum-type {for_type}")
            }
            TokenError::Utf8(err) => {
                write!(f, "parsed byte-sequence is not valid UTF-8: {err}")
            }
        }
    }
}

impl Error for TokenError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TokenError::Utf8(err) => Some(err),
            _ => None,
        }
    }
}
