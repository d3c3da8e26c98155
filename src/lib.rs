//! Schema-combinator runtime for Binary Canonical Serialization
//!
//! # Overview
//!
//! This library implements the deterministic, schema-driven binary
//! format used across the Diem/Move/Sui ecosystems (BCS) as an
//! embeddable codec. A caller declares a *schema*, a value
//! describing the shape of the data (primitives, fixed arrays,
//! length-prefixed vectors, optionals, tuples, structs, tagged
//! unions, strings), and uses that schema both to serialize values
//! into a compact little-endian byte stream and to parse such a
//! stream back into memory.
//!
//! The wire format itself is fixed by the upstream BCS specification
//! and carries no type information beyond enumeration discriminants.
//! What this crate contributes is the schema model: a combinator
//! layer in which schemas compose, stay strongly typed, and can be
//! reused across recursive and generic definitions.
//!
//! # Layers
//!
//! * [`parse`] and [`write`] define the byte-cursor pair the whole
//!   codec is driven through: [`Reader`](parse::Reader) over an
//!   immutable slice, [`Writer`](write::Writer) over a growable
//!   buffer with bounded-growth semantics.
//! * [`uleb128`] implements the variable-length integer encoding
//!   used for length prefixes and discriminants.
//! * [`schema`] defines [`BcsType<T, I>`](schema::BcsType), the
//!   codec descriptor every combinator produces, together with the
//!   primitive, collection, and algebraic combinators, user
//!   transforms, and deferred construction for recursive shapes.
//! * [`value`] provides the dynamic [`Value`](value::Value) model
//!   that heterogeneous schemas (structs, enumerations, tuples)
//!   operate over.
//! * [`envelope`] binds serialized bytes to the schema that produced
//!   them and offers hex/base58/base64 re-encodings.
//! * [`registry`] is an optional string-named façade over the
//!   combinator core, kept for parity with older name-driven APIs.
//!
//! # Example
//!
//! ```
//! use monotone::prelude::*;
//!
//! let coin = monotone::record("Coin", vec![
//!     ("value", monotone::u64().to_dynamic()),
//!     ("owner", monotone::string().to_dynamic()),
//!     ("is_locked", monotone::bool().to_dynamic()),
//! ]);
//!
//! let mut fields = Fields::new();
//! fields.insert("value".into(), Value::U64(412412400000));
//! fields.insert("owner".into(), Value::Text("Big Wallet Guy".into()));
//! fields.insert("is_locked".into(), Value::Bool(false));
//!
//! let envelope = coin.serialize(&Value::Record(fields)).unwrap();
//! assert_eq!(envelope.to_hex(), "80d1b105600000000e4269672057616c6c65742047757900");
//! assert_eq!(envelope.parse().unwrap().kind(), "record");
//! ```
//!
//! # Concurrency
//!
//! The codec is strictly single-threaded and synchronous: a
//! `Reader`/`Writer` belongs to one caller for one operation. Schema
//! values, by contrast, are immutable after construction and safe to
//! share read-only across threads for the lifetime of the program.

pub mod envelope;
pub mod error;
pub mod parse;
pub mod prelude;
pub mod registry;
pub mod schema;
pub mod uleb128;
pub mod value;
pub mod write;

pub use crate::envelope::Serialized;
pub use crate::error::{BcsError, BcsResult, ValidationError};
pub use crate::parse::Reader;
pub use crate::registry::Registry;
pub use crate::schema::adt::{dyn_map, enumeration, option, record, tuple};
pub use crate::schema::lazy::lazy;
pub use crate::schema::prim::{bool, bytes, string, u128, u16, u256, u32, u64, u8, uleb128};
pub use crate::schema::seq::{fixed_array, map, vector};
pub use crate::schema::{BcsType, DynSchema};
pub use crate::value::{Fields, Value};
pub use crate::write::{Writer, WriterOptions};

/// Converts a hex literal into a `Vec<u8>`, panicking on malformed
/// input.
///
/// Intended for tests and examples, where the literal is a constant
/// and a panic is the appropriate response to a typo.
#[macro_export]
macro_rules! hex {
    ($s:expr) => {{
        ::hex::decode($s).expect("hex! macro encountered error")
    }};
}
