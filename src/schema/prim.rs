//! Primitive schemas
//!
//! Leaf combinators covering the scalar shapes of the wire format:
//! booleans, fixed-width unsigned integers from 8 to 256 bits,
//! variable-length (ULEB128) unsigned integers, fixed-size byte
//! blobs, and UTF-8 strings.
//!
//! The machine-word integers (`u8`/`u16`/`u32`/`u64`/`u128`) take
//! their native Rust types on both ends, so the range invariant of
//! the wire format is enforced by the type system rather than a
//! runtime validator. `u256` is backed by [`BigUint`] and validated
//! against its 256-bit ceiling before any byte is written.

use num_bigint::BigUint;

use crate::error::{LengthError, ValidationError};
use crate::parse::Reader;
use crate::schema::BcsType;
use crate::uleb128 as uleb128_mod;
use crate::write::Writer;

/// Schema for `bool`: a single byte, `0x00` for `false` and `0x01`
/// for `true`.
///
/// Any other byte is rejected on parse.
#[must_use]
pub fn bool() -> BcsType<bool> {
    BcsType::new(
        "bool",
        |r: &mut Reader<'_>| r.take_bool(),
        |v: &bool, w: &mut Writer| {
            w.put_bool(*v)?;
            Ok(())
        },
    )
    .with_serialized_size(|_| Some(1))
}

macro_rules! word_schema {
    ( $( $(#[$meta:meta])* $fname:ident : $t:ty, $take:ident, $put:ident, $width:expr );+ $(;)? ) => {
        $(
            $(#[$meta])*
            #[must_use]
            pub fn $fname() -> BcsType<$t> {
                BcsType::new(
                    stringify!($fname),
                    |r: &mut Reader<'_>| r.$take(),
                    |v: &$t, w: &mut Writer| {
                        w.$put(*v)?;
                        Ok(())
                    },
                )
                .with_serialized_size(|_| Some($width))
            }
        )+
    };
}

word_schema! {
    /// Schema for `u8`: one byte.
    u8: u8, take_u8, put_u8, 1;
    /// Schema for `u16`: two bytes, little-endian.
    u16: u16, take_u16, put_u16, 2;
    /// Schema for `u32`: four bytes, little-endian.
    u32: u32, take_u32, put_u32, 4;
    /// Schema for `u64`: eight bytes, little-endian.
    u64: u64, take_u64, put_u64, 8;
    /// Schema for `u128`: sixteen bytes, little-endian.
    u128: u128, take_u128, put_u128, 16;
}

/// Schema for `u256`: thirty-two bytes, little-endian, backed by
/// [`BigUint`].
///
/// Inputs wider than 256 bits are rejected by the validator before
/// any byte is written.
#[must_use]
pub fn u256() -> BcsType<BigUint> {
    BcsType::new(
        "u256",
        |r: &mut Reader<'_>| r.take_u256(),
        |v: &BigUint, w: &mut Writer| {
            w.put_u256(v)?;
            Ok(())
        },
    )
    .with_validate(|v: &BigUint| {
        if v.bits() <= 256 {
            Ok(())
        } else {
            Err(ValidationError::IntegerOverflow {
                name: "u256",
                bits: 256,
                value: v.to_string(),
            })
        }
    })
    .with_serialized_size(|_| Some(32))
}

/// Schema for a bare ULEB128-encoded unsigned integer.
///
/// Lengths and discriminants embed this encoding implicitly; this
/// combinator exposes it as a first-class value type.
#[must_use]
pub fn uleb128() -> BcsType<u32> {
    BcsType::new(
        "uleb128",
        |r: &mut Reader<'_>| r.take_uleb128(),
        |v: &u32, w: &mut Writer| {
            w.put_uleb128(*v)?;
            Ok(())
        },
    )
    .with_serialized_size(|v: &u32| Some(uleb128_mod::encoded_width(*v)))
}

/// Schema for a fixed-size byte blob: exactly `size` raw bytes with
/// no length prefix.
///
/// The validator requires the input to hold exactly `size` bytes.
#[must_use]
pub fn bytes(size: usize) -> BcsType<Vec<u8>> {
    BcsType::new(
        format!("bytes[{size}]"),
        move |r: &mut Reader<'_>| Ok(r.take_bytes(size)?.to_vec()),
        |v: &Vec<u8>, w: &mut Writer| {
            w.put_bytes(v)?;
            Ok(())
        },
    )
    .with_validate(move |v: &Vec<u8>| {
        if v.len() == size {
            Ok(())
        } else {
            Err(LengthError::WrongLength {
                exact: size,
                actual: v.len(),
            }
            .into())
        }
    })
    .with_serialized_size(move |_| Some(size))
}

/// Schema for a UTF-8 string: `ULEB128(byte_len)` followed by the
/// UTF-8 bytes of the value.
///
/// Parsing rejects byte-sequences that are not valid UTF-8.
#[must_use]
pub fn string() -> BcsType<String> {
    BcsType::new(
        "string",
        |r: &mut Reader<'_>| {
            let len = r.take_uleb128()? as usize;
            let bytes = r.take_bytes(len)?.to_vec();
            Ok(String::from_utf8(bytes)?)
        },
        |v: &String, w: &mut Writer| {
            w.put_uleb128(v.len() as u32)?.put_bytes(v.as_bytes())?;
            Ok(())
        },
    )
    .with_validate(|v: &String| {
        if v.len() <= u32::MAX as usize {
            Ok(())
        } else {
            Err(LengthError::TooLong {
                limit: u32::MAX as usize,
                actual: v.len(),
            }
            .into())
        }
    })
    .with_serialized_size(|v: &String| Some(uleb128_mod::encoded_width(v.len() as u32) + v.len()))
}

#[cfg(test)]
mod test {
    use num_bigint::BigUint;

    use crate::error::{BcsError, ValidationError};
    use crate::hex;
    use crate::parse::{error::ParseError, error::TokenError};

    #[test]
    fn word_boundaries() {
        assert_eq!(crate::u8().to_bytes(&0).unwrap(), hex!("00"));
        assert_eq!(crate::u8().to_bytes(&255).unwrap(), hex!("ff"));
        assert_eq!(crate::u64().to_bytes(&0).unwrap(), hex!("0000000000000000"));
        assert_eq!(
            crate::u64().to_bytes(&u64::MAX).unwrap(),
            hex!("ffffffffffffffff")
        );
        assert_eq!(
            crate::u128().parse(&hex!("ffffffffffffffffffffffffffffffff")).unwrap(),
            u128::MAX
        );
    }

    #[test]
    fn u64_reference_vector() {
        let env = crate::u64().serialize(&1311768467750121216u64).unwrap();
        assert_eq!(env.to_hex(), "00efcdab78563412");
        assert_eq!(env.parse().unwrap(), 1311768467750121216u64);
    }

    #[test]
    fn u256_ceiling() {
        let max = (BigUint::from(1u8) << 256u32) - 1u8;
        let env = crate::u256().serialize(&max).unwrap();
        assert_eq!(env.to_bytes(), vec![0xff; 32]);
        assert_eq!(env.parse().unwrap(), max);

        let over = BigUint::from(1u8) << 256u32;
        assert!(matches!(
            crate::u256().serialize(&over),
            Err(BcsError::Validation(ValidationError::IntegerOverflow {
                name: "u256",
                ..
            }))
        ));
    }

    #[test]
    fn bytes_requires_exact_width() {
        let schema = crate::bytes(4);
        assert_eq!(schema.to_bytes(&vec![1, 2, 3, 4]).unwrap(), hex!("01020304"));
        assert!(matches!(
            schema.serialize(&vec![1, 2, 3]),
            Err(BcsError::Validation(ValidationError::Length(_)))
        ));
    }

    #[test]
    fn string_is_uleb_prefixed_utf8() {
        let schema = crate::string();
        assert_eq!(schema.to_bytes(&String::new()).unwrap(), hex!("00"));
        assert_eq!(
            schema.to_bytes(&"hello".to_string()).unwrap(),
            hex!("0568656c6c6f")
        );

        let multibyte = "çå∞≠¢õß∂ƒ∫".to_string();
        let env = schema.serialize(&multibyte).unwrap();
        assert_eq!(env.parse().unwrap(), multibyte);
        assert_eq!(env.to_bytes()[0] as usize, multibyte.len());
    }

    #[test]
    fn uleb128_schema_round_trips_boundaries() {
        let schema = crate::uleb128();
        for (value, encoding) in [
            (0u32, "00"),
            (127, "7f"),
            (128, "8001"),
            (16384, "808001"),
            (u32::MAX, "ffffffff0f"),
        ] {
            let env = schema.serialize(&value).unwrap();
            assert_eq!(env.to_hex(), encoding);
            assert_eq!(env.parse().unwrap(), value);
        }
    }

    #[test]
    fn invalid_utf8_is_a_parse_error() {
        // length prefix of 2, then an orphaned continuation byte
        let err = crate::string().parse(&hex!("02ff80")).unwrap_err();
        assert!(matches!(
            err,
            BcsError::Parse(ParseError::Token(TokenError::Utf8(_)))
        ));
    }
}
