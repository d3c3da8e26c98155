//! Dynamic value model
//!
//! Heterogeneous schema shapes (structs, tuples, enumerations) cannot
//! be expressed with a single pair of Rust type parameters, so the
//! combinators that build them operate over [`Value`]: a tagged
//! dynamic value carrying an ordered name-to-value mapping for
//! records, a native tag for enumeration variants, and plain wrappers
//! for everything else.
//!
//! Typed schemas cross into the dynamic world through the
//! [`IntoValue`]/[`FromValue`] conversion pair, which is what
//! [`to_dynamic`](crate::schema::BcsType::to_dynamic) is built on.
//! Conversions out of `Value` are checked: a mismatched kind is a
//! [`ValidationError::Mismatch`], caught by schema validation before
//! any byte is written.

use indexmap::IndexMap;
use num_bigint::BigUint;

use crate::error::ValidationError;

/// Ordered field map of a parsed or to-be-written struct value.
///
/// Iteration order is declaration order: parsing produces fields in
/// the order the schema declares them, and writing consults fields by
/// name regardless of the order the caller inserted them in.
pub type Fields = IndexMap<String, Value>;

/// Dynamically typed codec value.
///
/// `Value` is the common currency of the record/enumeration/tuple
/// combinators and the name-registry façade. Every variant
/// corresponds to the output of one family of schemas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Payload of a unit enumeration variant; also the absent case of
    /// a dynamic optional
    Unit,
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    U256(BigUint),
    /// Opaque byte-sequence (fixed blobs and byte-vectors)
    Bytes(Vec<u8>),
    /// UTF-8 string
    Text(String),
    /// Positional sequence (vectors, fixed arrays, tuples)
    Seq(Vec<Value>),
    /// Key/value pair list with caller-supplied ordering preserved
    Map(Vec<(Value, Value)>),
    /// Declaration-ordered struct fields
    Record(Fields),
    /// Chosen enumeration variant and its payload
    Variant { name: String, payload: Box<Value> },
}

impl Value {
    /// One-word description of the variant, used in mismatch
    /// diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Bool(_) => "bool",
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::U128(_) => "u128",
            Value::U256(_) => "u256",
            Value::Bytes(_) => "bytes",
            Value::Text(_) => "string",
            Value::Seq(_) => "sequence",
            Value::Map(_) => "map",
            Value::Record(_) => "record",
            Value::Variant { .. } => "variant",
        }
    }

    /// Constructs a [`Variant`](Value::Variant) value.
    #[must_use]
    pub fn variant(name: impl Into<String>, payload: Value) -> Self {
        Value::Variant {
            name: name.into(),
            payload: Box::new(payload),
        }
    }

    /// Constructs a unit-payload [`Variant`](Value::Variant) value.
    #[must_use]
    pub fn unit_variant(name: impl Into<String>) -> Self {
        Self::variant(name, Value::Unit)
    }

    /// Widens any unsigned-integer variant to `u128`.
    fn as_u128(&self) -> Option<u128> {
        match *self {
            Value::U8(v) => Some(u128::from(v)),
            Value::U16(v) => Some(u128::from(v)),
            Value::U32(v) => Some(u128::from(v)),
            Value::U64(v) => Some(u128::from(v)),
            Value::U128(v) => Some(v),
            _ => None,
        }
    }

    fn mismatch(&self, expected: &'static str) -> ValidationError {
        ValidationError::Mismatch {
            expected,
            actual: self.kind(),
        }
    }
}

/// Conversion of a typed schema output into a [`Value`].
pub trait IntoValue {
    fn into_value(self) -> Value;
}

/// Checked conversion of a [`Value`] into a typed schema input.
///
/// # Coercion rules
///
/// Integer targets accept any unsigned variant whose value fits the
/// target range, as well as [`Value::Text`] holding the value in
/// decimal notation; everything else must match its variant exactly.
/// Out-of-range integers are reported as
/// [`ValidationError::IntegerOverflow`], wrong kinds as
/// [`ValidationError::Mismatch`].
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, ValidationError>;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, ValidationError> {
        Ok(value.clone())
    }
}

impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::Unit
    }
}

impl FromValue for () {
    fn from_value(value: &Value) -> Result<Self, ValidationError> {
        match value {
            Value::Unit => Ok(()),
            other => Err(other.mismatch("unit")),
        }
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, ValidationError> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => Err(other.mismatch("bool")),
        }
    }
}

macro_rules! impl_uint_value {
    ( $( $t:ident => $variant:ident ),+ $(,)? ) => {
        $(
            impl IntoValue for $t {
                fn into_value(self) -> Value {
                    Value::$variant(self)
                }
            }

            impl FromValue for $t {
                fn from_value(value: &Value) -> Result<Self, ValidationError> {
                    let overflow = |shown: &dyn std::fmt::Display| ValidationError::IntegerOverflow {
                        name: stringify!($t),
                        bits: <$t>::BITS,
                        value: shown.to_string(),
                    };
                    if let Some(wide) = value.as_u128() {
                        return <$t>::try_from(wide).map_err(|_| overflow(&wide));
                    }
                    match value {
                        Value::Text(s) => match s.parse::<u128>() {
                            Ok(wide) => <$t>::try_from(wide).map_err(|_| overflow(&wide)),
                            Err(_) => Err(overflow(s)),
                        },
                        Value::U256(big) => {
                            <$t>::try_from(big.clone()).map_err(|_| overflow(big))
                        }
                        other => Err(other.mismatch("unsigned integer")),
                    }
                }
            }
        )+
    };
}

impl_uint_value! {
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
}

impl IntoValue for BigUint {
    fn into_value(self) -> Value {
        Value::U256(self)
    }
}

impl FromValue for BigUint {
    fn from_value(value: &Value) -> Result<Self, ValidationError> {
        if let Some(wide) = value.as_u128() {
            return Ok(BigUint::from(wide));
        }
        match value {
            Value::U256(big) => Ok(big.clone()),
            Value::Text(s) => s.parse::<BigUint>().map_err(|_| ValidationError::IntegerOverflow {
                name: "u256",
                bits: 256,
                value: s.clone(),
            }),
            other => Err(other.mismatch("unsigned integer")),
        }
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::Text(self)
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, ValidationError> {
        match value {
            Value::Text(s) => Ok(s.clone()),
            other => Err(other.mismatch("string")),
        }
    }
}

impl IntoValue for Vec<u8> {
    fn into_value(self) -> Value {
        Value::Bytes(self)
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> Result<Self, ValidationError> {
        match value {
            Value::Bytes(b) => Ok(b.clone()),
            other => Err(other.mismatch("bytes")),
        }
    }
}

impl IntoValue for Vec<Value> {
    fn into_value(self) -> Value {
        Value::Seq(self)
    }
}

impl FromValue for Vec<Value> {
    fn from_value(value: &Value) -> Result<Self, ValidationError> {
        match value {
            Value::Seq(xs) => Ok(xs.clone()),
            other => Err(other.mismatch("sequence")),
        }
    }
}

impl IntoValue for Vec<(Value, Value)> {
    fn into_value(self) -> Value {
        Value::Map(self)
    }
}

impl FromValue for Vec<(Value, Value)> {
    fn from_value(value: &Value) -> Result<Self, ValidationError> {
        match value {
            Value::Map(pairs) => Ok(pairs.clone()),
            other => Err(other.mismatch("map")),
        }
    }
}

impl IntoValue for Fields {
    fn into_value(self) -> Value {
        Value::Record(self)
    }
}

impl FromValue for Fields {
    fn from_value(value: &Value) -> Result<Self, ValidationError> {
        match value {
            Value::Record(fields) => Ok(fields.clone()),
            other => Err(other.mismatch("record")),
        }
    }
}

/// The absent case maps to [`Value::Unit`]; any other value is the
/// present case. `option(unit)` is consequently not representable in
/// the dynamic layer, which mirrors the flattened optional view of
/// the wire format.
impl IntoValue for Option<Value> {
    fn into_value(self) -> Value {
        match self {
            None => Value::Unit,
            Some(v) => v,
        }
    }
}

impl FromValue for Option<Value> {
    fn from_value(value: &Value) -> Result<Self, ValidationError> {
        match value {
            Value::Unit => Ok(None),
            other => Ok(Some(other.clone())),
        }
    }
}

#[cfg(feature = "serde_impls")]
impl serde::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::{SerializeMap, SerializeSeq};
        match self {
            Value::Unit => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::U8(v) => serializer.serialize_u8(*v),
            Value::U16(v) => serializer.serialize_u16(*v),
            Value::U32(v) => serializer.serialize_u32(*v),
            Value::U64(v) => serializer.serialize_u64(*v),
            Value::U128(v) => serializer.serialize_u128(*v),
            // decimal text keeps arbitrary-precision values lossless
            Value::U256(big) => serializer.serialize_str(&big.to_string()),
            Value::Bytes(bytes) => serializer.serialize_bytes(bytes),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Seq(xs) => {
                let mut seq = serializer.serialize_seq(Some(xs.len()))?;
                for x in xs {
                    seq.serialize_element(x)?;
                }
                seq.end()
            }
            Value::Map(pairs) => {
                let mut map = serializer.serialize_map(Some(pairs.len()))?;
                for (k, v) in pairs {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::Record(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (k, v) in fields {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::Variant { name, payload } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(name, payload.as_ref())?;
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn integer_coercions_widen_and_parse() {
        assert_eq!(u64::from_value(&Value::U8(7)).unwrap(), 7u64);
        assert_eq!(u64::from_value(&Value::Text("42".into())).unwrap(), 42u64);
        assert_eq!(
            BigUint::from_value(&Value::U64(9)).unwrap(),
            BigUint::from(9u8)
        );
    }

    #[test]
    fn narrowing_out_of_range_is_overflow() {
        assert!(matches!(
            u8::from_value(&Value::U64(256)),
            Err(ValidationError::IntegerOverflow { name: "u8", .. })
        ));
        assert!(matches!(
            u8::from_value(&Value::Text("-1".into())),
            Err(ValidationError::IntegerOverflow { .. })
        ));
    }

    #[test]
    fn kind_mismatches_are_reported() {
        assert!(matches!(
            String::from_value(&Value::U8(1)),
            Err(ValidationError::Mismatch {
                expected: "string",
                actual: "u8"
            })
        ));
    }
}
