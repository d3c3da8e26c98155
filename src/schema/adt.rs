//! Algebraic schema shapes
//!
//! Combinators for the sum- and product-types of the wire format:
//! [`option`], [`tuple`], [`record`] (the struct schema, as `struct`
//! is a Rust keyword), and [`enumeration`], plus [`dyn_map`], the
//! [`Value`]-level rendition of the map shape.
//!
//! Heterogeneous shapes operate over the dynamic [`Value`] model (see
//! the [`value`](crate::value) module): a parsed record is an ordered
//! name-to-value mapping, and a parsed enumeration carries its
//! variant name as a native tag. Callers wanting their own domain
//! types layer a [`transform`](crate::schema::BcsType::transform)
//! over these schemas.
//!
//! # Ordering discipline
//!
//! Declaration order is canonical everywhere: record fields serialize
//! strictly in the order they were declared, regardless of the
//! ordering in the caller-supplied input object, and an
//! enumeration's discriminant is its variant's declaration index.
//! Reordering either is a breaking schema change.

use crate::error::{LengthError, ValidationError};
use crate::parse::error::{ParseError, TokenError};
use crate::parse::Reader;
use crate::schema::{BcsType, DynSchema};
use crate::uleb128;
use crate::value::{Fields, Value};
use crate::write::Writer;

/// Discriminant-marker key accepted (and ignored) in record-shaped
/// enumeration input; parse results expose the chosen variant through
/// the native [`Value::Variant`] tag instead.
pub const KIND_MARKER: &str = "$kind";

/// Schema for an optional value: a two-variant tagged union with a
/// flattened public view.
///
/// On the wire, `None` is the single discriminant byte `0x00` and
/// `Some(v)` is `0x01` followed by the encoding of `v`. A present
/// value equal to the element type's default still carries the `0x01`
/// prefix.
#[must_use]
pub fn option<T, I>(element: BcsType<T, I>) -> BcsType<Option<T>, Option<I>>
where
    T: 'static,
    I: 'static,
{
    let name = format!("option<{}>", element.name());
    let for_type = name.clone();
    let elem_read = element.read_fn();
    let elem_write = element.write_fn();
    let elem_validate = element.validate_fn();
    let elem_size = element.size_fn();

    BcsType::new(
        name,
        move |r: &mut Reader<'_>| match r.take_uleb128()? {
            0 => Ok(None),
            1 => Ok(Some(elem_read(r)?)),
            tag => Err(ParseError::Token(TokenError::InvalidTag {
                tag,
                for_type: for_type.clone(),
            })),
        },
        move |value: &Option<I>, w: &mut Writer| match value {
            None => {
                w.put_uleb128(0)?;
                Ok(())
            }
            Some(inner) => {
                w.put_uleb128(1)?;
                elem_write(inner, w)
            }
        },
    )
    .with_validate(move |value: &Option<I>| match (value, &elem_validate) {
        (Some(inner), Some(validate)) => validate(inner),
        _ => Ok(()),
    })
    .with_serialized_size(move |value: &Option<I>| match value {
        None => Some(1),
        Some(inner) => Some(1 + elem_size.as_ref().and_then(|f| f(inner))?),
    })
}

/// Schema for a positional product type: the concatenated encodings
/// of its element schemas, in declaration order, with no length
/// prefix.
///
/// Input and output are [`Value::Seq`] of the same arity as the
/// element list.
#[must_use]
pub fn tuple(elements: Vec<DynSchema>) -> DynSchema {
    let name = format!(
        "({})",
        elements
            .iter()
            .map(BcsType::name)
            .collect::<Vec<_>>()
            .join(", ")
    );
    let arity = elements.len();
    let readers: Vec<_> = elements.iter().map(BcsType::read_fn).collect();
    let writers: Vec<_> = elements.iter().map(BcsType::write_fn).collect();
    let validators: Vec<_> = elements.iter().map(BcsType::validate_fn).collect();
    let sizes: Vec<_> = elements.iter().map(BcsType::size_fn).collect();

    let expect_seq = move |value: &Value| -> Result<Vec<Value>, ValidationError> {
        match value {
            Value::Seq(items) if items.len() == arity => Ok(items.clone()),
            Value::Seq(items) => Err(LengthError::WrongLength {
                exact: arity,
                actual: items.len(),
            }
            .into()),
            other => Err(ValidationError::Mismatch {
                expected: "sequence",
                actual: other.kind(),
            }),
        }
    };

    BcsType::new(
        name,
        move |r: &mut Reader<'_>| {
            let mut items = Vec::with_capacity(readers.len());
            for read in &readers {
                items.push(read(r)?);
            }
            Ok(Value::Seq(items))
        },
        {
            let expect_seq = expect_seq.clone();
            move |value: &Value, w: &mut Writer| {
                let items = expect_seq(value)?;
                for (write, item) in writers.iter().zip(&items) {
                    write(item, w)?;
                }
                Ok(())
            }
        },
    )
    .with_validate({
        let expect_seq = expect_seq.clone();
        move |value: &Value| {
            let items = expect_seq(value)?;
            for (validate, item) in validators.iter().zip(&items) {
                if let Some(validate) = validate {
                    validate(item)?;
                }
            }
            Ok(())
        }
    })
    .with_serialized_size(move |value: &Value| {
        let items = expect_seq(value).ok()?;
        let mut total = 0usize;
        for (size, item) in sizes.iter().zip(&items) {
            total += size.as_ref()?(item)?;
        }
        Some(total)
    })
}

/// Schema for a named product type with declaration-ordered fields.
///
/// Serialization writes the field encodings in declaration order,
/// looking each field up by name in the caller-supplied
/// [`Value::Record`]; a missing field is fatal, extra fields are
/// ignored. Parsing yields a [`Value::Record`] keyed by field name,
/// in declaration order.
#[must_use]
pub fn record(name: impl Into<String>, fields: Vec<(&'static str, DynSchema)>) -> DynSchema {
    let name = name.into();
    let struct_name = name.clone();

    let expect_record = {
        let struct_name = struct_name.clone();
        let declared: Vec<&'static str> = fields.iter().map(|(f, _)| *f).collect();
        move |value: &Value| -> Result<Fields, ValidationError> {
            let supplied = match value {
                Value::Record(supplied) => supplied,
                other => {
                    return Err(ValidationError::Mismatch {
                        expected: "record",
                        actual: other.kind(),
                    })
                }
            };
            let mut ordered = Fields::with_capacity(declared.len());
            for field in &declared {
                match supplied.get(*field) {
                    Some(v) => {
                        ordered.insert((*field).to_string(), v.clone());
                    }
                    None => {
                        return Err(ValidationError::MissingField {
                            struct_name: struct_name.clone(),
                            field,
                        })
                    }
                }
            }
            Ok(ordered)
        }
    };

    let readers: Vec<_> = fields
        .iter()
        .map(|(f, s)| (*f, s.read_fn()))
        .collect();
    let writers: Vec<_> = fields
        .iter()
        .map(|(f, s)| (*f, s.write_fn()))
        .collect();
    let validators: Vec<_> = fields
        .iter()
        .map(|(f, s)| (*f, s.validate_fn()))
        .collect();
    let sizes: Vec<_> = fields.iter().map(|(_, s)| s.size_fn()).collect();

    BcsType::new(
        name,
        move |r: &mut Reader<'_>| {
            let mut out = Fields::with_capacity(readers.len());
            for (field, read) in &readers {
                out.insert((*field).to_string(), read(r)?);
            }
            Ok(Value::Record(out))
        },
        {
            let expect_record = expect_record.clone();
            move |value: &Value, w: &mut Writer| {
                let ordered = expect_record(value)?;
                for (field, write) in &writers {
                    // expect_record produced every declared field
                    write(&ordered[*field], w)?;
                }
                Ok(())
            }
        },
    )
    .with_validate({
        let expect_record = expect_record.clone();
        move |value: &Value| {
            let ordered = expect_record(value)?;
            for (field, validate) in &validators {
                if let Some(validate) = validate {
                    validate(&ordered[*field])?;
                }
            }
            Ok(())
        }
    })
    .with_serialized_size(move |value: &Value| {
        let ordered = expect_record(value).ok()?;
        let mut total = 0usize;
        for (size, (_, item)) in sizes.iter().zip(ordered.iter()) {
            total += size.as_ref()?(item)?;
        }
        Some(total)
    })
}

/// Schema for a tagged union: `ULEB128(variant_index)` followed by
/// the chosen variant's payload, if any.
///
/// The discriminant is the variant's declaration index (the first
/// declared variant is index 0), and a variant declared with no
/// payload schema (the unit body) writes nothing after its
/// discriminant.
///
/// Parse results are [`Value::Variant`] values carrying the chosen
/// variant's name and payload. Writers accept either that shape, or a
/// [`Value::Record`] with exactly one key matching a declared variant
/// name (a [`KIND_MARKER`] entry is accepted and ignored); zero
/// matching keys, more than one, or an undeclared variant name are
/// all fatal.
#[must_use]
pub fn enumeration(
    name: impl Into<String>,
    variants: Vec<(&'static str, Option<DynSchema>)>,
) -> DynSchema {
    let name = name.into();
    let enum_name = name.clone();

    let select = {
        let enum_name = enum_name.clone();
        let declared: Vec<&'static str> = variants.iter().map(|(v, _)| *v).collect();
        move |value: &Value| -> Result<(usize, Value), ValidationError> {
            match value {
                Value::Variant { name, payload } => {
                    match declared.iter().position(|v| v == name) {
                        Some(index) => Ok((index, payload.as_ref().clone())),
                        None => Err(ValidationError::UnknownVariant {
                            enum_name: enum_name.clone(),
                            variant: name.clone(),
                        }),
                    }
                }
                Value::Record(entries) => {
                    let matches = entries
                        .iter()
                        .filter(|(key, _)| key.as_str() != KIND_MARKER)
                        .map(|(key, payload)| {
                            match declared.iter().position(|v| v == key) {
                                Some(index) => Ok((index, payload)),
                                None => Err(ValidationError::UnknownVariant {
                                    enum_name: enum_name.clone(),
                                    variant: key.clone(),
                                }),
                            }
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    match matches.len() {
                        0 => Err(ValidationError::NoVariantKey {
                            enum_name: enum_name.clone(),
                        }),
                        1 => {
                            let (index, payload) = matches[0];
                            Ok((index, payload.clone()))
                        }
                        _ => Err(ValidationError::AmbiguousVariant {
                            enum_name: enum_name.clone(),
                            matches: matches
                                .into_iter()
                                .map(|(ix, _)| declared[ix].to_string())
                                .collect(),
                        }),
                    }
                }
                other => Err(ValidationError::Mismatch {
                    expected: "variant",
                    actual: other.kind(),
                }),
            }
        }
    };

    let readers: Vec<_> = variants
        .iter()
        .map(|(v, s)| (*v, s.as_ref().map(BcsType::read_fn)))
        .collect();
    let writers: Vec<_> = variants
        .iter()
        .map(|(_, s)| s.as_ref().map(BcsType::write_fn))
        .collect();
    let validators: Vec<_> = variants
        .iter()
        .map(|(_, s)| s.as_ref().and_then(BcsType::validate_fn))
        .collect();
    let sizes: Vec<_> = variants
        .iter()
        .map(|(_, s)| s.as_ref().map(BcsType::size_fn))
        .collect();

    let for_type = enum_name.clone();
    BcsType::new(
        name,
        move |r: &mut Reader<'_>| {
            let tag = r.take_uleb128()?;
            let (variant, payload_read) =
                readers
                    .get(tag as usize)
                    .ok_or_else(|| TokenError::InvalidTag {
                        tag,
                        for_type: for_type.clone(),
                    })?;
            let payload = match payload_read {
                Some(read) => read(r)?,
                None => Value::Unit,
            };
            Ok(Value::variant(*variant, payload))
        },
        {
            let select = select.clone();
            move |value: &Value, w: &mut Writer| {
                let (index, payload) = select(value)?;
                w.put_uleb128(index as u32)?;
                match &writers[index] {
                    Some(write) => write(&payload, w),
                    None => Ok(()),
                }
            }
        },
    )
    .with_validate({
        let select = select.clone();
        move |value: &Value| {
            let (index, payload) = select(value)?;
            match &validators[index] {
                Some(validate) => validate(&payload),
                None => Ok(()),
            }
        }
    })
    .with_serialized_size(move |value: &Value| {
        let (index, payload) = select(value).ok()?;
        let tag_width = uleb128::encoded_width(index as u32);
        match &sizes[index] {
            // unit variant: the discriminant is the whole encoding
            None => Some(tag_width),
            // payload schema without a size oracle
            Some(None) => None,
            Some(Some(size)) => Some(tag_width + size(&payload)?),
        }
    })
}

/// [`Value`]-level map schema: the wire shape of
/// [`map`](crate::schema::seq::map) over erased key and value
/// schemas, carried as a [`Value::Map`] pair list.
///
/// Caller-supplied entry ordering is preserved on the wire; parsing
/// yields entries in wire order.
#[must_use]
pub fn dyn_map(key: DynSchema, value: DynSchema) -> DynSchema {
    let name = format!("map<{}, {}>", key.name(), value.name());
    let key_read = key.read_fn();
    let key_write = key.write_fn();
    let key_validate = key.validate_fn();
    let key_size = key.size_fn();
    let value_read = value.read_fn();
    let value_write = value.write_fn();
    let value_validate = value.validate_fn();
    let value_size = value.size_fn();

    let expect_map = |value: &Value| -> Result<Vec<(Value, Value)>, ValidationError> {
        match value {
            Value::Map(pairs) => Ok(pairs.clone()),
            other => Err(ValidationError::Mismatch {
                expected: "map",
                actual: other.kind(),
            }),
        }
    };

    BcsType::new(
        name,
        move |r: &mut Reader<'_>| {
            let count = r.take_uleb128()? as usize;
            let mut pairs = Vec::with_capacity(count.min(r.remainder().max(1)));
            for _ in 0..count {
                let k = key_read(r)?;
                let v = value_read(r)?;
                pairs.push((k, v));
            }
            Ok(Value::Map(pairs))
        },
        move |value: &Value, w: &mut Writer| {
            let pairs = expect_map(value)?;
            w.put_uleb128(pairs.len() as u32)?;
            for (k, v) in &pairs {
                key_write(k, w)?;
                value_write(v, w)?;
            }
            Ok(())
        },
    )
    .with_validate(move |value: &Value| {
        let pairs = expect_map(value)?;
        if pairs.len() > u32::MAX as usize {
            return Err(LengthError::TooLong {
                limit: u32::MAX as usize,
                actual: pairs.len(),
            }
            .into());
        }
        for (k, v) in &pairs {
            if let Some(validate) = &key_validate {
                validate(k)?;
            }
            if let Some(validate) = &value_validate {
                validate(v)?;
            }
        }
        Ok(())
    })
    .with_serialized_size(move |value: &Value| {
        let pairs = expect_map(value).ok()?;
        let key_size = key_size.as_ref()?;
        let value_size = value_size.as_ref()?;
        let mut total = uleb128::encoded_width(pairs.len() as u32);
        for (k, v) in &pairs {
            total += key_size(k)? + value_size(v)?;
        }
        Some(total)
    })
}

#[cfg(test)]
mod test {
    use crate::error::{BcsError, ValidationError};
    use crate::hex;
    use crate::value::{Fields, Value};

    fn coin() -> crate::DynSchema {
        crate::record(
            "Coin",
            vec![
                ("value", crate::u64().to_dynamic()),
                ("owner", crate::string().to_dynamic()),
                ("is_locked", crate::bool().to_dynamic()),
            ],
        )
    }

    fn coin_input() -> Value {
        let mut fields = Fields::new();
        fields.insert("value".into(), Value::U64(412412400000));
        fields.insert("owner".into(), Value::Text("Big Wallet Guy".into()));
        fields.insert("is_locked".into(), Value::Bool(false));
        Value::Record(fields)
    }

    #[test]
    fn option_tags() {
        let schema = crate::option(crate::u8());
        assert_eq!(schema.to_bytes(&None).unwrap(), hex!("00"));
        assert_eq!(schema.to_bytes(&Some(0)).unwrap(), hex!("0100"));
        assert_eq!(schema.parse(&hex!("012a")).unwrap(), Some(42));
        assert_eq!(schema.parse(&hex!("00")).unwrap(), None);
    }

    #[test]
    fn nested_options_round_trip() {
        let schema = crate::option(crate::vector(crate::option(crate::u8())));
        let value = Some(vec![Some(1u8), None, Some(3)]);
        let env = schema.serialize(&value).unwrap();
        assert_eq!(env.to_bytes(), hex!("01030101000103"));
        assert_eq!(env.parse().unwrap(), value);
    }

    #[test]
    fn fixed_array_of_options_reference_vector() {
        let schema = crate::fixed_array(3, crate::option(crate::u8()));
        let bytes = schema
            .to_bytes(&vec![Some(1u8), None, Some(3)])
            .unwrap();
        assert_eq!(bytes, hex!("0101000103"));
    }

    #[test]
    fn tuple_of_options_reference_vector() {
        let schema = crate::tuple(vec![
            crate::option(crate::u8().to_dynamic()).to_dynamic(),
            crate::option(crate::u8().to_dynamic()).to_dynamic(),
        ]);
        let bytes = schema
            .to_bytes(&Value::Seq(vec![Value::Unit, Value::U8(1)]))
            .unwrap();
        assert_eq!(bytes, hex!("000101"));
    }

    #[test]
    fn tuple_arity_is_enforced() {
        let schema = crate::tuple(vec![
            crate::u8().to_dynamic(),
            crate::u8().to_dynamic(),
        ]);
        assert!(matches!(
            schema.serialize(&Value::Seq(vec![Value::U8(1)])),
            Err(BcsError::Validation(ValidationError::Length(_)))
        ));
    }

    #[test]
    fn record_reference_vector() {
        let env = coin().serialize(&coin_input()).unwrap();
        assert_eq!(
            env.to_hex(),
            "80d1b105600000000e4269672057616c6c65742047757900"
        );
        let parsed = env.parse().unwrap();
        let Value::Record(fields) = parsed else {
            panic!("record parse did not yield a record");
        };
        assert_eq!(
            fields.keys().collect::<Vec<_>>(),
            vec!["value", "owner", "is_locked"]
        );
        assert_eq!(fields["value"], Value::U64(412412400000));
        assert_eq!(fields["owner"], Value::Text("Big Wallet Guy".into()));
        assert_eq!(fields["is_locked"], Value::Bool(false));
    }

    #[test]
    fn record_field_order_is_declaration_order() {
        let mut shuffled = Fields::new();
        shuffled.insert("is_locked".into(), Value::Bool(false));
        shuffled.insert("owner".into(), Value::Text("Big Wallet Guy".into()));
        shuffled.insert("value".into(), Value::U64(412412400000));
        // an extra field is ignored
        shuffled.insert("memo".into(), Value::Text("ignored".into()));
        assert_eq!(
            coin().to_bytes(&Value::Record(shuffled)).unwrap(),
            coin().to_bytes(&coin_input()).unwrap()
        );
    }

    #[test]
    fn record_missing_field_is_fatal() {
        let mut fields = Fields::new();
        fields.insert("value".into(), Value::U64(1));
        fields.insert("owner".into(), Value::Text("x".into()));
        assert!(matches!(
            coin().serialize(&Value::Record(fields)),
            Err(BcsError::Validation(ValidationError::MissingField {
                field: "is_locked",
                ..
            }))
        ));
    }

    fn three_way() -> crate::DynSchema {
        crate::enumeration(
            "E",
            vec![
                ("Variant0", Some(crate::u16().to_dynamic())),
                ("Variant1", Some(crate::u8().to_dynamic())),
                ("Variant2", Some(crate::string().to_dynamic())),
            ],
        )
    }

    #[test]
    fn enumeration_reference_vector() {
        let mut input = Fields::new();
        input.insert("Variant2".into(), Value::Text("hello".into()));
        let env = three_way().serialize(&Value::Record(input)).unwrap();
        assert_eq!(env.to_bytes(), hex!("020568656c6c6f"));
        assert_eq!(
            env.parse().unwrap(),
            Value::variant("Variant2", Value::Text("hello".into()))
        );
    }

    #[test]
    fn enumeration_accepts_native_variants_and_ignores_kind_marker() {
        let direct = three_way()
            .to_bytes(&Value::variant("Variant1", Value::U8(9)))
            .unwrap();
        assert_eq!(direct, hex!("0109"));

        let mut keyed = Fields::new();
        keyed.insert(super::KIND_MARKER.into(), Value::Text("Variant1".into()));
        keyed.insert("Variant1".into(), Value::U8(9));
        assert_eq!(three_way().to_bytes(&Value::Record(keyed)).unwrap(), direct);
    }

    #[test]
    fn enumeration_rejects_bad_variant_objects() {
        let unknown = three_way().serialize(&Value::variant("Variant9", Value::Unit));
        assert!(matches!(
            unknown,
            Err(BcsError::Validation(ValidationError::UnknownVariant { .. }))
        ));

        let empty = three_way().serialize(&Value::Record(Fields::new()));
        assert!(matches!(
            empty,
            Err(BcsError::Validation(ValidationError::NoVariantKey { .. }))
        ));

        let mut twice = Fields::new();
        twice.insert("Variant0".into(), Value::U16(1));
        twice.insert("Variant1".into(), Value::U8(1));
        assert!(matches!(
            three_way().serialize(&Value::Record(twice)),
            Err(BcsError::Validation(ValidationError::AmbiguousVariant { .. }))
        ));
    }

    #[test]
    fn unit_variant_writes_only_its_discriminant() {
        let schema = crate::enumeration(
            "Status",
            vec![("Idle", None), ("Busy", Some(crate::u32().to_dynamic()))],
        );
        assert_eq!(
            schema.to_bytes(&Value::unit_variant("Idle")).unwrap(),
            hex!("00")
        );
        assert_eq!(
            schema
                .to_bytes(&Value::variant("Busy", Value::U32(7)))
                .unwrap(),
            hex!("0107000000")
        );
        assert_eq!(
            schema.parse(&hex!("00")).unwrap(),
            Value::unit_variant("Idle")
        );
    }

    #[test]
    fn unknown_discriminant_is_a_parse_error() {
        let err = three_way().parse(&hex!("05")).unwrap_err();
        assert!(matches!(
            err,
            BcsError::Parse(crate::parse::error::ParseError::Token(
                crate::parse::error::TokenError::InvalidTag { tag: 5, .. }
            ))
        ));
    }

    #[test]
    fn dyn_map_round_trips() {
        let schema = crate::dyn_map(crate::string().to_dynamic(), crate::u8().to_dynamic());
        let pairs = Value::Map(vec![
            (Value::Text("a".into()), Value::U8(1)),
            (Value::Text("b".into()), Value::U8(2)),
        ]);
        let env = schema.serialize(&pairs).unwrap();
        assert_eq!(env.to_bytes(), hex!("02016101016202"));
        assert_eq!(env.parse().unwrap(), pairs);
    }
}
