//! Core of the schema-combinator API
//!
//! This module defines [`BcsType<T, I>`], the immutable codec
//! descriptor every combinator in this crate produces, together with
//! the transform and dynamic-erasure machinery layered on top of it.
//!
//! A `BcsType` pairs a read function (`Reader -> T`) with a write
//! function (`(&I, Writer) -> ()`), a display name, an optional
//! exact-serialized-size oracle, and an optional input validator.
//! `T` is the *output* type (what [`read`](BcsType::read) and
//! [`parse`](BcsType::parse) yield), and `I` is the *input* type
//! (what [`write`](BcsType::write) and [`serialize`](BcsType::serialize)
//! accept). The two coincide for most schemas; they diverge under
//! [`transform`](BcsType::transform), which is the intended seam for
//! exposing caller-domain types over the fixed wire format.
//!
//! Schema values are created at construction time, never mutated, and
//! are cheap to clone (the function objects are shared). They are
//! safe to hold for the lifetime of the program and to share
//! read-only across threads.
//!
//! # Layout
//!
//! The concrete combinators live in accordingly-named submodules:
//! [`prim`] for primitives, [`seq`] for homogeneous collections,
//! [`adt`] for records, enumerations, tuples and optionals, and
//! [`lazy`] for self-referential schemas.

pub mod adt;
pub mod lazy;
pub mod prim;
pub mod seq;

use std::borrow::Cow;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::envelope::Serialized;
use crate::error::{BcsResult, ConvError, ValidationError};
use crate::parse::{ParseResult, Reader};
use crate::value::{FromValue, IntoValue, Value};
use crate::write::{Writer, WriterOptions};

pub(crate) type ReadFn<T> = Arc<dyn Fn(&mut Reader<'_>) -> ParseResult<T> + Send + Sync>;
pub(crate) type WriteFn<I> = Arc<dyn Fn(&I, &mut Writer) -> BcsResult<()> + Send + Sync>;
pub(crate) type SizeFn<I> = Arc<dyn Fn(&I) -> Option<usize> + Send + Sync>;
pub(crate) type ValidateFn<I> = Arc<dyn Fn(&I) -> Result<(), ValidationError> + Send + Sync>;
pub(crate) type SerializeFn<I> =
    Arc<dyn Fn(&I, &WriterOptions) -> BcsResult<Vec<u8>> + Send + Sync>;

/// Schema erased over the dynamic [`Value`] model.
///
/// This is the shape the heterogeneous combinators
/// ([`record`](adt::record), [`enumeration`](adt::enumeration),
/// [`tuple`](adt::tuple)) produce directly, and the currency of the
/// name-registry façade.
pub type DynSchema = BcsType<Value, Value>;

/// Immutable codec descriptor for values of output type `T` and input
/// type `I`.
///
/// See the [module documentation](self) for the model. Instances are
/// obtained from the combinator functions of this crate rather than
/// constructed by hand, except when implementing a novel leaf schema
/// via [`BcsType::new`].
pub struct BcsType<T, I = T> {
    name: Cow<'static, str>,
    read: ReadFn<T>,
    write: WriteFn<I>,
    serialized_size: Option<SizeFn<I>>,
    validate: Option<ValidateFn<I>>,
    serialize_override: Option<SerializeFn<I>>,
}

impl<T, I> Clone for BcsType<T, I> {
    /// Shallow copy sharing the underlying function objects.
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            read: self.read.clone(),
            write: self.write.clone(),
            serialized_size: self.serialized_size.clone(),
            validate: self.validate.clone(),
            serialize_override: self.serialize_override.clone(),
        }
    }
}

impl<T, I> std::fmt::Debug for BcsType<T, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BcsType").field("name", &self.name).finish()
    }
}

impl<T, I> BcsType<T, I> {
    /// Constructs a schema from its two required halves.
    ///
    /// The read half consumes bytes from a [`Reader`] and produces a
    /// `T`; the write half appends the encoding of an `&I` to a
    /// [`Writer`]. The new schema carries no validator and no
    /// serialized-size oracle until the corresponding `with_*`
    /// builders are applied.
    pub fn new<R, W>(name: impl Into<Cow<'static, str>>, read: R, write: W) -> Self
    where
        R: Fn(&mut Reader<'_>) -> ParseResult<T> + Send + Sync + 'static,
        W: Fn(&I, &mut Writer) -> BcsResult<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            read: Arc::new(read),
            write: Arc::new(write),
            serialized_size: None,
            validate: None,
            serialize_override: None,
        }
    }

    /// Attaches an input validator, replacing any previous one.
    ///
    /// Every public operation that accepts an input value runs the
    /// validator first and rejects invalid input before touching the
    /// writer.
    #[must_use]
    pub fn with_validate<F>(mut self, validate: F) -> Self
    where
        F: Fn(&I) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        self.validate = Some(Arc::new(validate));
        self
    }

    /// Attaches an exact-serialized-size oracle, replacing any
    /// previous one.
    ///
    /// The oracle may return `None` for inputs whose size cannot be
    /// predicted; [`serialize`](Self::serialize) then falls back to
    /// the default buffer parameters.
    #[must_use]
    pub fn with_serialized_size<F>(mut self, serialized_size: F) -> Self
    where
        F: Fn(&I) -> Option<usize> + Send + Sync + 'static,
    {
        self.serialized_size = Some(Arc::new(serialized_size));
        self
    }

    /// Overrides the whole serialize path, bypassing the default
    /// writer-allocation strategy.
    ///
    /// Validation still runs ahead of the override.
    #[must_use]
    pub fn with_serialize<F>(mut self, serialize: F) -> Self
    where
        F: Fn(&I, &WriterOptions) -> BcsResult<Vec<u8>> + Send + Sync + 'static,
    {
        self.serialize_override = Some(Arc::new(serialize));
        self
    }

    /// Returns the display name of this schema.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a copy of this schema carrying a different display
    /// name.
    #[must_use]
    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Reads one value of this schema from an existing [`Reader`],
    /// advancing its cursor past the consumed encoding.
    pub fn read(&self, reader: &mut Reader<'_>) -> ParseResult<T> {
        (self.read)(reader)
    }

    /// Parses one value of this schema from the front of `bytes`.
    ///
    /// Trailing bytes beyond the encoding are ignored; the wire
    /// format is not self-delimiting at the top level.
    pub fn parse(&self, bytes: &[u8]) -> BcsResult<T> {
        let mut reader = Reader::new(bytes);
        Ok((self.read)(&mut reader)?)
    }

    /// Parses one value of this schema from the hex rendition of its
    /// bytes.
    pub fn parse_hex(&self, text: &str) -> BcsResult<T> {
        let bytes = hex::decode(text).map_err(ConvError::Hex)?;
        self.parse(&bytes)
    }

    /// Parses one value of this schema from the base58 rendition of
    /// its bytes (Bitcoin alphabet).
    pub fn parse_base58(&self, text: &str) -> BcsResult<T> {
        let bytes = bs58::decode(text).into_vec().map_err(ConvError::Base58)?;
        self.parse(&bytes)
    }

    /// Parses one value of this schema from the standard base64
    /// rendition of its bytes.
    pub fn parse_base64(&self, text: &str) -> BcsResult<T> {
        let bytes = BASE64.decode(text).map_err(ConvError::Base64)?;
        self.parse(&bytes)
    }

    /// Runs this schema's validator, if any, against `value`.
    pub fn validate(&self, value: &I) -> Result<(), ValidationError> {
        match &self.validate {
            Some(validate) => validate(value),
            None => Ok(()),
        }
    }

    /// Computes the exact serialized size of `value`, when this
    /// schema can predict it.
    #[must_use]
    pub fn serialized_size(&self, value: &I) -> Option<usize> {
        self.serialized_size.as_ref().and_then(|f| f(value))
    }

    /// Validates `value` and appends its encoding to an existing
    /// [`Writer`].
    pub fn write(&self, value: &I, writer: &mut Writer) -> BcsResult<()> {
        self.validate(value)?;
        (self.write)(value, writer)
    }

    /// Validates and serializes `value` into a fresh buffer, returning
    /// the bytes bound to this schema as a [`Serialized`] envelope.
    ///
    /// The buffer is allocated at the exact predicted size when the
    /// schema has a serialized-size oracle for this value, and with
    /// the default [`WriterOptions`] otherwise.
    pub fn serialize(&self, value: &I) -> BcsResult<Serialized<T, I>> {
        self.validate(value)?;
        let options = match self.serialized_size(value) {
            Some(size) => WriterOptions::exact(size),
            None => WriterOptions::default(),
        };
        self.serialize_validated(value, &options)
    }

    /// Validates and serializes `value` under explicit buffer
    /// parameters.
    pub fn serialize_with(&self, value: &I, options: &WriterOptions) -> BcsResult<Serialized<T, I>> {
        self.validate(value)?;
        self.serialize_validated(value, options)
    }

    /// Shorthand for [`serialize`](Self::serialize) followed by
    /// extraction of the raw bytes.
    pub fn to_bytes(&self, value: &I) -> BcsResult<Vec<u8>> {
        Ok(self.serialize(value)?.into_bytes())
    }

    fn serialize_validated(&self, value: &I, options: &WriterOptions) -> BcsResult<Serialized<T, I>> {
        let bytes = match &self.serialize_override {
            Some(serialize) => serialize(value, options)?,
            None => {
                let mut writer = Writer::with_options(*options);
                (self.write)(value, &mut writer)?;
                writer.into_bytes()
            }
        };
        Ok(Serialized::new(self.clone(), bytes))
    }

    // Shared handles for combinators composing this schema. The raw
    // write half skips validation: outer schemas validate recursively
    // before any write begins.
    pub(crate) fn read_fn(&self) -> ReadFn<T> {
        self.read.clone()
    }

    pub(crate) fn write_fn(&self) -> WriteFn<I> {
        self.write.clone()
    }

    pub(crate) fn validate_fn(&self) -> Option<ValidateFn<I>> {
        self.validate.clone()
    }

    pub(crate) fn size_fn(&self) -> Option<SizeFn<I>> {
        self.serialized_size.clone()
    }
}

impl<T, I> BcsType<T, I>
where
    T: 'static,
    I: 'static,
{
    /// Wraps this schema with caller-side conversions on both ends.
    ///
    /// The resulting schema reads by applying `output` to this
    /// schema's parse result, and writes by applying `input` to the
    /// caller's value and forwarding the intermediate to this schema.
    /// Validation composes: the transformed schema first converts,
    /// then runs this schema's validator on the converted value. Use
    /// [`transform_validated`](Self::transform_validated) to reject
    /// caller values before conversion.
    ///
    /// Identity and associativity follow from pure function
    /// composition; transforms impose no wire-format cost.
    #[must_use]
    pub fn transform<T2, I2: 'static, In, Out>(
        &self,
        name: impl Into<Cow<'static, str>>,
        input: In,
        output: Out,
    ) -> BcsType<T2, I2>
    where
        In: Fn(&I2) -> I + Send + Sync + 'static,
        Out: Fn(T) -> T2 + Send + Sync + 'static,
    {
        self.transform_inner(name, input, output, None::<fn(&I2) -> Result<(), ValidationError>>)
    }

    /// Like [`transform`](Self::transform), with an additional
    /// validator that runs against the caller's value *before* the
    /// input conversion.
    #[must_use]
    pub fn transform_validated<T2, I2: 'static, In, Out, V>(
        &self,
        name: impl Into<Cow<'static, str>>,
        input: In,
        output: Out,
        validate: V,
    ) -> BcsType<T2, I2>
    where
        In: Fn(&I2) -> I + Send + Sync + 'static,
        Out: Fn(T) -> T2 + Send + Sync + 'static,
        V: Fn(&I2) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        self.transform_inner(name, input, output, Some(validate))
    }

    fn transform_inner<T2, I2: 'static, In, Out, V>(
        &self,
        name: impl Into<Cow<'static, str>>,
        input: In,
        output: Out,
        user_validate: Option<V>,
    ) -> BcsType<T2, I2>
    where
        In: Fn(&I2) -> I + Send + Sync + 'static,
        Out: Fn(T) -> T2 + Send + Sync + 'static,
        V: Fn(&I2) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        let input = Arc::new(input);
        let inner_read = self.read_fn();
        let inner_write = self.write_fn();
        let inner_validate = self.validate_fn();
        let inner_size = self.size_fn();

        let read = move |r: &mut Reader<'_>| inner_read(r).map(&output);
        let write = {
            let input = input.clone();
            move |v: &I2, w: &mut Writer| inner_write(&input(v), w)
        };
        let validate = {
            let input = input.clone();
            move |v: &I2| {
                if let Some(user) = &user_validate {
                    user(v)?;
                }
                match &inner_validate {
                    Some(inner) => inner(&input(v)),
                    None => Ok(()),
                }
            }
        };
        let schema = BcsType::new(name, read, write).with_validate(validate);
        match inner_size {
            Some(size) => schema.with_serialized_size(move |v: &I2| size(&input(v))),
            None => schema,
        }
    }

    /// Erases this schema over the dynamic [`Value`] model.
    ///
    /// Reads produce the [`IntoValue`] image of the typed output;
    /// writes and validation accept any [`Value`] the typed input can
    /// be recovered from under the [`FromValue`] coercion rules.
    /// This is the bridge between the typed combinators and the
    /// heterogeneous ones, and the form schemas take inside the
    /// name-registry façade.
    #[must_use]
    pub fn to_dynamic(&self) -> DynSchema
    where
        T: IntoValue,
        I: FromValue,
    {
        let inner_read = self.read_fn();
        let inner_write = self.write_fn();
        let inner_validate = self.validate_fn();
        let inner_size = self.size_fn();

        BcsType::new(
            self.name.clone(),
            move |r: &mut Reader<'_>| inner_read(r).map(IntoValue::into_value),
            move |v: &Value, w: &mut Writer| {
                let typed = I::from_value(v)?;
                inner_write(&typed, w)
            },
        )
        .with_validate(move |v: &Value| {
            let typed = I::from_value(v)?;
            match &inner_validate {
                Some(inner) => inner(&typed),
                None => Ok(()),
            }
        })
        .with_serialized_size(move |v: &Value| {
            let typed = I::from_value(v).ok()?;
            inner_size.as_ref().and_then(|f| f(&typed))
        })
    }
}

#[cfg(test)]
mod test {
    use crate::prelude::*;

    #[test]
    fn transform_exposes_domain_types() {
        #[derive(Debug, PartialEq)]
        struct Tagged(u16);

        let schema = crate::u16().transform("Tagged", |t: &Tagged| t.0, Tagged);
        let bytes = schema.to_bytes(&Tagged(0x0102)).unwrap();
        assert_eq!(bytes, crate::hex!("0201"));
        assert_eq!(schema.parse(&bytes).unwrap(), Tagged(0x0102));
    }

    #[test]
    fn transform_validator_runs_before_conversion() {
        let even_only = crate::u32().transform_validated(
            "even",
            |v: &u32| *v,
            |v| v,
            |v: &u32| {
                if v % 2 == 0 {
                    Ok(())
                } else {
                    Err(ValidationError::custom("odd input"))
                }
            },
        );
        assert!(even_only.serialize(&4).is_ok());
        assert!(matches!(
            even_only.serialize(&5),
            Err(BcsError::Validation(ValidationError::Custom(_)))
        ));
    }

    #[test]
    fn serialize_uses_the_size_oracle() {
        // a u64 knows its exact width, so the default writer
        // parameters never enter the picture
        let env = crate::u64().serialize(&u64::MAX).unwrap();
        assert_eq!(env.len(), 8);
    }

    #[test]
    fn string_renditions_parse_back() {
        let schema = crate::vector(crate::u8());
        let env = schema.serialize(&vec![1u8, 2, 3]).unwrap();
        assert_eq!(schema.parse_hex(&env.to_hex()).unwrap(), vec![1, 2, 3]);
        assert_eq!(
            schema.parse_base58(&env.to_base58()).unwrap(),
            vec![1, 2, 3]
        );
        assert_eq!(
            schema.parse_base64(&env.to_base64()).unwrap(),
            vec![1, 2, 3]
        );
        assert!(matches!(
            schema.parse_hex("zz"),
            Err(BcsError::Conv(crate::error::ConvError::Hex(_)))
        ));
    }

    #[test]
    fn capacity_bound_is_enforced() {
        let schema = crate::vector(crate::string());
        let value = vec!["oversized".to_string(); 40];
        let options = WriterOptions {
            initial_size: 16,
            max_size: 64,
            grow_chunk: 16,
        };
        assert!(matches!(
            schema.serialize_with(&value, &options),
            Err(BcsError::Capacity(_))
        ));
    }

    #[test]
    fn dynamic_erasure_round_trips() {
        let schema = crate::u32().to_dynamic();
        let bytes = schema.to_bytes(&Value::U32(0xabcd)).unwrap();
        assert_eq!(schema.parse(&bytes).unwrap(), Value::U32(0xabcd));
        // coercion: a text input is accepted for an integer slot
        assert_eq!(
            schema.to_bytes(&Value::Text("43981".into())).unwrap(),
            bytes
        );
    }
}
