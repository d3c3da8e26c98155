//! Homogeneous collection schemas
//!
//! Combinators over a single element schema: length-prefixed
//! [`vector`], unprefixed [`fixed_array`], and [`map`], which shares
//! the vector wire shape over key/value pairs.

use std::hash::Hash;

use indexmap::IndexMap;

use crate::error::LengthError;
use crate::parse::Reader;
use crate::schema::BcsType;
use crate::uleb128;
use crate::write::Writer;

/// Schema for a length-prefixed sequence: `ULEB128(len)` followed by
/// `len` encodings of the element schema.
///
/// A vector of length 0 encodes as exactly one `0x00` byte. The
/// element count must fit the 32-bit range of length prefixes.
#[must_use]
pub fn vector<T, I>(element: BcsType<T, I>) -> BcsType<Vec<T>, Vec<I>>
where
    T: 'static,
    I: 'static,
{
    let name = format!("vector<{}>", element.name());
    let elem_read = element.read_fn();
    let elem_write = element.write_fn();
    let elem_validate = element.validate_fn();
    let elem_size = element.size_fn();

    BcsType::new(
        name,
        move |r: &mut Reader<'_>| r.take_vec(|r| elem_read(r)),
        move |values: &Vec<I>, w: &mut Writer| {
            w.put_uleb128(values.len() as u32)?;
            for value in values {
                elem_write(value, w)?;
            }
            Ok(())
        },
    )
    .with_validate(move |values: &Vec<I>| {
        if values.len() > u32::MAX as usize {
            return Err(LengthError::TooLong {
                limit: u32::MAX as usize,
                actual: values.len(),
            }
            .into());
        }
        if let Some(validate) = &elem_validate {
            for value in values {
                validate(value)?;
            }
        }
        Ok(())
    })
    .with_serialized_size(move |values: &Vec<I>| {
        let size = elem_size.as_ref()?;
        let mut total = uleb128::encoded_width(values.len() as u32);
        for value in values {
            total += size(value)?;
        }
        Some(total)
    })
}

/// Schema for a fixed-length sequence: exactly `len` encodings of the
/// element schema, with no length prefix.
///
/// Input of any other length (longer as well as shorter) is
/// rejected by the validator; nothing is ever truncated to fit.
#[must_use]
pub fn fixed_array<T, I>(len: usize, element: BcsType<T, I>) -> BcsType<Vec<T>, Vec<I>>
where
    T: 'static,
    I: 'static,
{
    let name = format!("[{}; {len}]", element.name());
    let elem_read = element.read_fn();
    let elem_write = element.write_fn();
    let elem_validate = element.validate_fn();
    let elem_size = element.size_fn();

    BcsType::new(
        name,
        move |r: &mut Reader<'_>| r.take_fixed_seq(len, |r| elem_read(r)),
        move |values: &Vec<I>, w: &mut Writer| {
            // the validator runs first on the public paths, but a raw
            // write must not quietly drop or invent elements either
            if values.len() != len {
                return Err(LengthError::WrongLength {
                    exact: len,
                    actual: values.len(),
                }
                .into());
            }
            for value in values {
                elem_write(value, w)?;
            }
            Ok(())
        },
    )
    .with_validate(move |values: &Vec<I>| {
        if values.len() != len {
            return Err(LengthError::WrongLength {
                exact: len,
                actual: values.len(),
            }
            .into());
        }
        if let Some(validate) = &elem_validate {
            for value in values {
                validate(value)?;
            }
        }
        Ok(())
    })
    .with_serialized_size(move |values: &Vec<I>| {
        let size = elem_size.as_ref()?;
        values.iter().try_fold(0usize, |acc, v| Some(acc + size(v)?))
    })
}

/// Schema for an ordered map, laid out on the wire exactly as a
/// vector of key/value tuples: `ULEB128(count)` followed by `count`
/// concatenated key-then-value encodings.
///
/// The codec imposes no ordering of its own; entries are written in
/// the iteration order of the input map and parsed back in wire
/// order.
#[must_use]
pub fn map<K, V, KI, VI>(
    key: BcsType<K, KI>,
    value: BcsType<V, VI>,
) -> BcsType<IndexMap<K, V>, IndexMap<KI, VI>>
where
    K: Eq + Hash + 'static,
    V: 'static,
    KI: Eq + Hash + 'static,
    VI: 'static,
{
    let name = format!("map<{}, {}>", key.name(), value.name());
    let key_read = key.read_fn();
    let key_write = key.write_fn();
    let key_validate = key.validate_fn();
    let key_size = key.size_fn();
    let value_read = value.read_fn();
    let value_write = value.write_fn();
    let value_validate = value.validate_fn();
    let value_size = value.size_fn();

    BcsType::new(
        name,
        move |r: &mut Reader<'_>| {
            let count = r.take_uleb128()? as usize;
            let mut out = IndexMap::with_capacity(count.min(r.remainder().max(1)));
            for _ in 0..count {
                let k = key_read(r)?;
                let v = value_read(r)?;
                out.insert(k, v);
            }
            Ok(out)
        },
        move |entries: &IndexMap<KI, VI>, w: &mut Writer| {
            w.put_uleb128(entries.len() as u32)?;
            for (k, v) in entries {
                key_write(k, w)?;
                value_write(v, w)?;
            }
            Ok(())
        },
    )
    .with_validate(move |entries: &IndexMap<KI, VI>| {
        if entries.len() > u32::MAX as usize {
            return Err(LengthError::TooLong {
                limit: u32::MAX as usize,
                actual: entries.len(),
            }
            .into());
        }
        for (k, v) in entries {
            if let Some(validate) = &key_validate {
                validate(k)?;
            }
            if let Some(validate) = &value_validate {
                validate(v)?;
            }
        }
        Ok(())
    })
    .with_serialized_size(move |entries: &IndexMap<KI, VI>| {
        let key_size = key_size.as_ref()?;
        let value_size = value_size.as_ref()?;
        let mut total = uleb128::encoded_width(entries.len() as u32);
        for (k, v) in entries {
            total += key_size(k)? + value_size(v)?;
        }
        Some(total)
    })
}

#[cfg(test)]
mod test {
    use indexmap::IndexMap;

    use crate::error::{BcsError, ValidationError};
    use crate::hex;

    #[test]
    fn empty_vector_is_one_byte() {
        assert_eq!(
            crate::vector(crate::u8()).to_bytes(&Vec::new()).unwrap(),
            hex!("00")
        );
    }

    #[test]
    fn thousand_element_vector() {
        let values = vec![0xffu8; 1000];
        let env = crate::vector(crate::u8()).serialize(&values).unwrap();
        let bytes = env.to_bytes();
        assert_eq!(bytes.len(), 1002);
        assert_eq!(&bytes[..2], &hex!("e807")[..]);
        assert!(bytes[2..].iter().all(|&b| b == 0xff));
        assert_eq!(env.parse().unwrap(), values);
    }

    #[test]
    fn vector_of_strings_round_trips() {
        let schema = crate::vector(crate::string());
        let values = vec!["one".to_string(), String::new(), "três".to_string()];
        let env = schema.serialize(&values).unwrap();
        assert_eq!(env.parse().unwrap(), values);
    }

    #[test]
    fn fixed_array_has_no_prefix() {
        let schema = crate::fixed_array(3, crate::u16());
        let bytes = schema.to_bytes(&vec![1u16, 2, 3]).unwrap();
        assert_eq!(bytes, hex!("010002000300"));
        assert_eq!(schema.parse(&bytes).unwrap(), vec![1u16, 2, 3]);
    }

    #[test]
    fn fixed_array_rejects_wrong_lengths() {
        let schema = crate::fixed_array(3, crate::u8());
        for values in [vec![1u8, 2], vec![1u8, 2, 3, 4]] {
            assert!(matches!(
                schema.serialize(&values),
                Err(BcsError::Validation(ValidationError::Length(_)))
            ));
        }
    }

    #[test]
    fn map_is_a_vector_of_pairs() {
        let schema = crate::map(crate::string(), crate::u8());
        let mut entries = IndexMap::new();
        entries.insert("a".to_string(), 1u8);
        entries.insert("b".to_string(), 2u8);
        let env = schema.serialize(&entries).unwrap();
        assert_eq!(env.to_bytes(), hex!("02016101016202"));
        assert_eq!(env.parse().unwrap(), entries);
    }

    #[test]
    fn map_preserves_caller_ordering() {
        let schema = crate::map(crate::u8(), crate::u8());
        let mut entries = IndexMap::new();
        entries.insert(9u8, 0u8);
        entries.insert(1u8, 0u8);
        let bytes = schema.to_bytes(&entries).unwrap();
        // 9 before 1, exactly as supplied
        assert_eq!(bytes, hex!("0209000100"));
    }
}
