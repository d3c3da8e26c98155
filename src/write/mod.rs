//! Byte-level serialization model
//!
//! The dual of the [`parse`](crate::parse) module: where a
//! [`Reader`](crate::parse::Reader) consumes an immutable buffer, a
//! [`Writer`] appends to a mutable one, under an explicit growth
//! policy configured through [`WriterOptions`].
//!
//! A `Writer` is owned by exactly one caller for the duration of one
//! serialize operation. Its buffer grows monotonically and never
//! shrinks until the `Writer` is dropped or finalized with
//! [`into_bytes`](Writer::into_bytes); exceeding the configured
//! maximum size is a hard failure, never a truncation.
//!
//! All multi-byte integers are emitted little-endian. The `put_X`
//! methods are chainable, each returning the receiver on success.

pub mod error;

pub use error::{CapacityError, WriteResult};

use num_bigint::BigUint;

use crate::uleb128;

/// Size parameters governing the buffer of a [`Writer`].
///
/// Growth happens in increments of `grow_chunk`, up to `max_size`.
/// By default the buffer is not permitted to grow at all: callers
/// serializing values without a known serialized size should raise
/// `max_size` explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterOptions {
    /// Number of bytes the buffer starts out with
    pub initial_size: usize,
    /// Hard upper bound the buffer may grow to
    pub max_size: usize,
    /// Increment by which the buffer grows when a write outruns it
    pub grow_chunk: usize,
}

impl Default for WriterOptions {
    /// Returns the standard parameters: a 1024-byte buffer with
    /// `max_size` equal to `initial_size` and a 1024-byte growth
    /// increment.
    fn default() -> Self {
        Self {
            initial_size: 1024,
            max_size: 1024,
            grow_chunk: 1024,
        }
    }
}

impl WriterOptions {
    /// Returns options for an exact-size buffer: `initial_size` and
    /// `max_size` both equal to `size`.
    ///
    /// This is the shape used when a schema can predict the
    /// serialized size of its input.
    #[must_use]
    pub fn exact(size: usize) -> Self {
        Self {
            initial_size: size,
            max_size: size,
            grow_chunk: 1024,
        }
    }

    /// Returns a copy of `self` with the given `max_size`.
    #[must_use]
    pub fn with_max_size(self, max_size: usize) -> Self {
        Self { max_size, ..self }
    }
}

/// Append-only serialization cursor over a growable byte-buffer.
#[derive(Debug)]
pub struct Writer {
    buf: Vec<u8>,
    pos: usize,
    max_size: usize,
    grow_chunk: usize,
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer {
    /// Constructs a `Writer` with the default [`WriterOptions`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(WriterOptions::default())
    }

    /// Constructs a `Writer` with explicit size parameters.
    ///
    /// The buffer is allocated at `initial_size` immediately; an
    /// `initial_size` greater than `max_size` is clamped down to it.
    #[must_use]
    pub fn with_options(options: WriterOptions) -> Self {
        let initial = options.initial_size.min(options.max_size);
        Self {
            buf: vec![0u8; initial],
            pos: 0,
            max_size: options.max_size,
            grow_chunk: options.grow_chunk,
        }
    }

    /// Returns the number of bytes written so far.
    #[inline]
    #[must_use]
    pub fn written(&self) -> usize {
        self.pos
    }

    /// Returns the current size of the underlying buffer, which may
    /// exceed the number of bytes actually written.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.buf.len()
    }

    /// Returns the configured maximum buffer size.
    #[inline]
    #[must_use]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Returns a view of the bytes written so far.
    #[must_use]
    pub fn as_written(&self) -> &[u8] {
        &self.buf[..self.pos]
    }

    /// Finalizes the `Writer`, returning the written bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        let mut buf = self.buf;
        buf.truncate(self.pos);
        buf
    }

    /// Guarantees room for `extra` more bytes at the cursor, growing
    /// the buffer in `grow_chunk` increments as needed.
    ///
    /// # Errors
    ///
    /// Fails with [`CapacityError`] if satisfying the request would
    /// push the buffer past `max_size`. The buffer is not grown at
    /// all in that case.
    pub fn ensure(&mut self, extra: usize) -> WriteResult<()> {
        let needed = self.pos + extra;
        if needed > self.max_size {
            return Err(CapacityError {
                needed,
                limit: self.max_size,
            });
        }
        while needed > self.buf.len() {
            // grow_chunk of 0 must still make progress toward max_size
            let step = self.grow_chunk.max(1);
            let grown = self.buf.len().saturating_add(step).min(self.max_size);
            self.buf.resize(grown, 0);
        }
        Ok(())
    }

    /// Appends a raw byte-slice at the cursor.
    pub fn put_bytes(&mut self, bytes: &[u8]) -> WriteResult<&mut Self> {
        self.ensure(bytes.len())?;
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(self)
    }

    /// Appends a single byte at the cursor.
    #[inline]
    pub fn put_u8(&mut self, value: u8) -> WriteResult<&mut Self> {
        self.put_bytes(&[value])
    }

    /// Appends a `u16` in little-endian byte order.
    #[inline]
    pub fn put_u16(&mut self, value: u16) -> WriteResult<&mut Self> {
        self.put_bytes(&value.to_le_bytes())
    }

    /// Appends a `u32` in little-endian byte order.
    #[inline]
    pub fn put_u32(&mut self, value: u32) -> WriteResult<&mut Self> {
        self.put_bytes(&value.to_le_bytes())
    }

    /// Appends a `u64` in little-endian byte order.
    #[inline]
    pub fn put_u64(&mut self, value: u64) -> WriteResult<&mut Self> {
        self.put_bytes(&value.to_le_bytes())
    }

    /// Appends a `u128` in little-endian byte order.
    #[inline]
    pub fn put_u128(&mut self, value: u128) -> WriteResult<&mut Self> {
        self.put_bytes(&value.to_le_bytes())
    }

    /// Appends a 256-bit unsigned value as exactly 32 little-endian
    /// bytes, zero-padded above the most significant digit.
    ///
    /// The value must fit into 256 bits; the schema layer validates
    /// this before the write path is reached.
    pub fn put_u256(&mut self, value: &BigUint) -> WriteResult<&mut Self> {
        debug_assert!(value.bits() <= 256, "put_u256 given a value wider than 256 bits");
        let digits = value.to_bytes_le();
        let mut bytes = [0u8; 32];
        bytes[..digits.len().min(32)].copy_from_slice(&digits[..digits.len().min(32)]);
        self.put_bytes(&bytes)
    }

    /// Appends a boolean as one byte: `0x01` for `true`, `0x00` for
    /// `false`.
    #[inline]
    pub fn put_bool(&mut self, value: bool) -> WriteResult<&mut Self> {
        self.put_u8(u8::from(value))
    }

    /// Appends a ULEB128-encoded unsigned integer.
    #[inline]
    pub fn put_uleb128(&mut self, value: u32) -> WriteResult<&mut Self> {
        uleb128::write(self, value)
    }

    /// Appends a ULEB128 length prefix, then invokes
    /// `cb(writer, element, index, len)` for each element of `values`
    /// in order.
    ///
    /// The element count must fit the 32-bit range of length
    /// prefixes; the schema layer validates this before the write
    /// path is reached.
    pub fn put_vec<T, F>(&mut self, values: &[T], mut cb: F) -> WriteResult<&mut Self>
    where
        F: FnMut(&mut Self, &T, usize, usize) -> WriteResult<()>,
    {
        debug_assert!(values.len() <= u32::MAX as usize);
        let len = values.len();
        self.put_uleb128(len as u32)?;
        for (ix, value) in values.iter().enumerate() {
            cb(self, value, ix, len)?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn writes_chain_and_land_little_endian() {
        let mut w = Writer::new();
        w.put_u8(0x01)
            .and_then(|w| w.put_u16(0x1234))
            .and_then(|w| w.put_u32(0xdeadbeef))
            .unwrap();
        assert_eq!(w.as_written(), crate::hex!("013412efbeadde").as_slice());
    }

    #[test]
    fn grows_in_chunks_up_to_max() {
        let mut w = Writer::with_options(WriterOptions {
            initial_size: 2,
            max_size: 8,
            grow_chunk: 3,
        });
        assert_eq!(w.size(), 2);
        w.put_bytes(&[0u8; 4]).unwrap();
        assert_eq!(w.size(), 5);
        w.put_bytes(&[0u8; 4]).unwrap();
        assert_eq!(w.size(), 8);
        assert_eq!(w.written(), 8);
    }

    #[test]
    fn refuses_to_grow_past_max() {
        let mut w = Writer::with_options(WriterOptions {
            initial_size: 4,
            max_size: 6,
            grow_chunk: 4,
        });
        w.put_u32(7).unwrap();
        let err = w.put_u32(8).unwrap_err();
        assert_eq!(err, CapacityError { needed: 8, limit: 6 });
        // the failed write must not have moved the cursor
        assert_eq!(w.written(), 4);
        w.put_u16(0xffff).unwrap();
        assert_eq!(w.into_bytes(), crate::hex!("07000000ffff"));
    }

    #[test]
    fn put_vec_prefixes_the_count() {
        let mut w = Writer::new();
        w.put_vec(&[5u8, 6, 7], |w, b, _, _| w.put_u8(*b).map(|_| ()))
            .unwrap();
        assert_eq!(w.into_bytes(), crate::hex!("03050607"));
    }

    #[test]
    fn u256_pads_to_thirty_two_bytes() {
        let mut w = Writer::new();
        w.put_u256(&num_bigint::BigUint::from(1u8)).unwrap();
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), 32);
        assert_eq!(bytes[0], 1);
        assert!(bytes[1..].iter().all(|&b| b == 0));
    }
}
