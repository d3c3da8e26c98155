//! Byte-level parsing model
//!
//! This module provides the fundamental definitions related to the
//! abstract task of processing raw sequences of binary data into the
//! low-level fragments at the leaf nodes of an arbitrarily complex
//! schema.
//!
//! The central type is [`Reader`], a non-backtracking, zero-lookahead
//! cursor over an immutable byte-slice: a byte can only be viewed by
//! consuming it, only after all preceding indices have been consumed,
//! and never more than once. A `Reader` is owned by exactly one caller
//! for the duration of one parse operation and holds a borrow of the
//! input buffer for its entire lifetime.
//!
//! All multi-byte integers are interpreted little-endian, in keeping
//! with the wire format this crate targets. For type-aware parsing,
//! in other words parsing schema-defined values directly rather than
//! as an unstructured sequence of primitives, see the
//! [`BcsType`](crate::schema::BcsType) read half, which is built
//! entirely on the operations defined here.

pub mod error;

pub use error::{ParseError, ParseResult};

use error::TokenError;
use num_bigint::BigUint;

use crate::uleb128;

/// Stateful parse-cursor over an immutable byte-slice.
///
/// # Model
///
/// * The `Reader` is constructed over a borrowed byte-buffer.
/// * The cursor position is monotonically non-decreasing and never
///   exceeds the buffer length.
/// * Any attempt to consume bytes beyond the end of the buffer fails
///   with [`ParseError::OutOfBounds`] and leaves the cursor unmoved.
#[derive(Debug)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Constructs an initialized `Reader` over a byte-slice.
    ///
    /// The resulting cursor is positioned at offset 0.
    #[inline]
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the total length of the underlying buffer.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` when the underlying buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the current value of the offset into the buffer.
    #[inline]
    #[must_use]
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Computes the number of bytes that can still be consumed.
    #[inline]
    #[must_use]
    pub fn remainder(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns `true` once every byte of the buffer has been consumed.
    #[inline]
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.pos == self.data.len()
    }

    /// Advances the cursor by `n` if doing so stays within bounds,
    /// returning the pre-increment offset.
    fn advance(&mut self, n: usize) -> ParseResult<usize> {
        if self.remainder() >= n {
            let ix = self.pos;
            self.pos += n;
            Ok(ix)
        } else {
            Err(ParseError::OutOfBounds {
                offset: self.pos,
                requested: n,
                limit: self.data.len(),
            })
        }
    }

    /// Consumes and returns a single byte.
    #[inline]
    pub fn take_byte(&mut self) -> ParseResult<u8> {
        let ix = self.advance(1)?;
        Ok(self.data[ix])
    }

    /// Attempts to consume and return a view of `n` bytes, starting
    /// from the first unconsumed byte in the buffer.
    ///
    /// The returned slice borrows from the original input and remains
    /// valid after the `Reader` itself is dropped.
    pub fn take_bytes(&mut self, n: usize) -> ParseResult<&'a [u8]> {
        let ix = self.advance(n)?;
        Ok(&self.data[ix..ix + n])
    }

    /// Consumes `N` bytes and returns them in array form.
    pub fn take_array<const N: usize>(&mut self) -> ParseResult<[u8; N]> {
        let ix = self.advance(N)?;
        let mut arr = [0u8; N];
        arr.copy_from_slice(&self.data[ix..ix + N]);
        Ok(arr)
    }

    /// Consumes one byte and returns it as a `u8` value.
    #[inline]
    pub fn take_u8(&mut self) -> ParseResult<u8> {
        self.take_byte()
    }

    /// Consumes two bytes and returns the corresponding `u16` value.
    ///
    /// As with all fixed-width multi-byte `take_X` methods, this
    /// method performs a little-endian conversion with respect to the
    /// individual bytes consumed.
    #[inline]
    pub fn take_u16(&mut self) -> ParseResult<u16> {
        self.take_array::<2>().map(u16::from_le_bytes)
    }

    /// Consumes four bytes and returns the corresponding `u32` value.
    #[inline]
    pub fn take_u32(&mut self) -> ParseResult<u32> {
        self.take_array::<4>().map(u32::from_le_bytes)
    }

    /// Consumes eight bytes and returns the corresponding `u64` value.
    #[inline]
    pub fn take_u64(&mut self) -> ParseResult<u64> {
        self.take_array::<8>().map(u64::from_le_bytes)
    }

    /// Consumes sixteen bytes and returns the corresponding `u128` value.
    #[inline]
    pub fn take_u128(&mut self) -> ParseResult<u128> {
        self.take_array::<16>().map(u128::from_le_bytes)
    }

    /// Consumes thirty-two bytes and returns the corresponding 256-bit
    /// unsigned value.
    ///
    /// The value is assembled from two 128-bit halves, low half first,
    /// as `high << 128 | low`.
    pub fn take_u256(&mut self) -> ParseResult<BigUint> {
        let low = self.take_u128()?;
        let high = self.take_u128()?;
        Ok((BigUint::from(high) << 128u32) | BigUint::from(low))
    }

    /// Consumes a single byte and returns the boolean value it
    /// represents.
    ///
    /// The only valid boolean encodings are `0x01` for `true` and
    /// `0x00` for `false`.
    ///
    /// # Errors
    ///
    /// Returns a [`TokenError::InvalidBoolean`] carrying the offending
    /// byte, suitably wrapped, for any other value.
    #[inline]
    pub fn take_bool(&mut self) -> ParseResult<bool> {
        match self.take_byte()? {
            0x01 => Ok(true),
            0x00 => Ok(false),
            byte => Err(ParseError::Token(TokenError::InvalidBoolean(byte))),
        }
    }

    /// Consumes a ULEB128-encoded unsigned integer.
    ///
    /// Values at use sites of this method (lengths, discriminants) are
    /// bounded by the 32-bit range; encodings wider than
    /// [`uleb128::MAX_WIDTH`] bytes, or whose value exceeds that
    /// range, are malformed.
    #[inline]
    pub fn take_uleb128(&mut self) -> ParseResult<u32> {
        uleb128::read(self)
    }

    /// Consumes a ULEB128 length prefix followed by that many
    /// invocations of `cb`, returning the collected results.
    ///
    /// # Errors
    ///
    /// Propagates any failure of the length prefix or of `cb` itself.
    pub fn take_vec<T, F>(&mut self, mut cb: F) -> ParseResult<Vec<T>>
    where
        F: FnMut(&mut Self) -> ParseResult<T>,
    {
        let count = self.take_uleb128()? as usize;
        // A hostile length prefix can dwarf the actual input; cap the
        // pre-allocation at what the buffer could possibly hold.
        let mut out = Vec::with_capacity(count.min(self.remainder().max(1)));
        for _ in 0..count {
            out.push(cb(self)?);
        }
        Ok(out)
    }

    /// Invokes `cb` exactly `n` times with no length prefix,
    /// returning the collected results.
    pub fn take_fixed_seq<T, F>(&mut self, n: usize, mut cb: F) -> ParseResult<Vec<T>>
    where
        F: FnMut(&mut Self) -> ParseResult<T>,
    {
        let mut out = Vec::with_capacity(n.min(self.remainder().max(1)));
        for _ in 0..n {
            out.push(cb(self)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn cursor_advances_and_stops_at_end() {
        let buf = [0x01u8, 0x02, 0x03];
        let mut r = Reader::new(&buf);
        assert_eq!(r.take_u8().unwrap(), 0x01);
        assert_eq!(r.offset(), 1);
        assert_eq!(r.take_bytes(2).unwrap(), &[0x02, 0x03]);
        assert!(r.is_exhausted());
        assert!(matches!(
            r.take_u8(),
            Err(ParseError::OutOfBounds {
                offset: 3,
                requested: 1,
                limit: 3
            })
        ));
    }

    #[test]
    fn failed_consume_leaves_cursor_unmoved() {
        let buf = [0xffu8; 4];
        let mut r = Reader::new(&buf);
        assert!(r.take_u64().is_err());
        assert_eq!(r.offset(), 0);
        assert_eq!(r.take_u32().unwrap(), u32::MAX);
    }

    #[test]
    fn words_are_little_endian() {
        let buf = crate::hex!("3412");
        assert_eq!(Reader::new(&buf).take_u16().unwrap(), 0x1234);
        let buf = crate::hex!("00efcdab78563412");
        assert_eq!(
            Reader::new(&buf).take_u64().unwrap(),
            1311768467750121216u64
        );
    }

    #[test]
    fn u256_concatenates_halves() {
        let mut buf = vec![0x2au8];
        buf.resize(32, 0);
        assert_eq!(
            Reader::new(&buf).take_u256().unwrap(),
            BigUint::from(42u32)
        );

        let buf = [0xffu8; 32];
        let expected = (BigUint::from(1u8) << 256u32) - 1u8;
        assert_eq!(Reader::new(&buf).take_u256().unwrap(), expected);
    }

    #[test]
    fn bool_tokens() {
        assert!(!Reader::new(&[0x00]).take_bool().unwrap());
        assert!(Reader::new(&[0x01]).take_bool().unwrap());
        assert!(matches!(
            Reader::new(&[0xff]).take_bool(),
            Err(ParseError::Token(TokenError::InvalidBoolean(0xff)))
        ));
    }

    #[test]
    fn take_vec_reads_its_own_length() {
        let buf = crate::hex!("03010203");
        let got = Reader::new(&buf).take_vec(|r| r.take_u8()).unwrap();
        assert_eq!(got, vec![1, 2, 3]);
    }
}
