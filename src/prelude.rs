//! Assorted re-exports covering the common surface of the crate
//!
//! Pulling this module in with a glob import brings the combinator
//! functions, the core types, and the error hierarchy into scope in
//! one line, which is the expected way to consume the library from
//! application code and from tests.

pub use crate::envelope::Serialized;
pub use crate::error::{BcsError, BcsResult, ConvError, LengthError, SchemaError, ValidationError};
pub use crate::parse::{ParseError, ParseResult, Reader};
pub use crate::registry::{Arity, Registry, TypeExpr};
pub use crate::schema::adt::{dyn_map, enumeration, option, record, tuple, KIND_MARKER};
pub use crate::schema::lazy::lazy;
pub use crate::schema::prim::{bool, bytes, string, u128, u16, u256, u32, u64, u8, uleb128};
pub use crate::schema::seq::{fixed_array, map, vector};
pub use crate::schema::{BcsType, DynSchema};
pub use crate::value::{Fields, FromValue, IntoValue, Value};
pub use crate::write::{CapacityError, WriteResult, Writer, WriterOptions};
