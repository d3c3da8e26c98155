//! Serialized envelope
//!
//! The result of a successful serialize is not a bare byte-vector but
//! a [`Serialized`] envelope: the produced bytes bound to the schema
//! that produced them. Binding the two guarantees that re-parsing an
//! envelope always goes through the same schema that wrote it, and
//! lets the envelope offer string re-encodings without the caller
//! having to thread codecs around.
//!
//! The byte-to-string adapters themselves (hex, base58, base64) are
//! external concerns, imported rather than reimplemented.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::error::BcsResult;
use crate::schema::BcsType;

/// Immutable pair of a schema and the bytes it serialized.
///
/// Constructed only by the schema layer, and only after the write
/// path has completed cleanly; a failed serialize never produces a
/// partially written envelope.
pub struct Serialized<T, I = T> {
    schema: BcsType<T, I>,
    bytes: Vec<u8>,
}

impl<T, I> Clone for Serialized<T, I> {
    fn clone(&self) -> Self {
        Self {
            schema: self.schema.clone(),
            bytes: self.bytes.clone(),
        }
    }
}

impl<T, I> Serialized<T, I> {
    pub(crate) fn new(schema: BcsType<T, I>, bytes: Vec<u8>) -> Self {
        Self { schema, bytes }
    }

    /// Returns the schema these bytes were produced by.
    #[must_use]
    pub fn schema(&self) -> &BcsType<T, I> {
        &self.schema
    }

    /// Returns the serialized bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    /// Extracts the serialized bytes, consuming the envelope.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Returns a view of the serialized bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the number of serialized bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` when the encoding is zero bytes wide.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Re-encodes the bytes as a lowercase hex string.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Re-encodes the bytes as a base58 string (Bitcoin alphabet).
    #[must_use]
    pub fn to_base58(&self) -> String {
        bs58::encode(&self.bytes).into_string()
    }

    /// Re-encodes the bytes as a standard base64 string with padding.
    #[must_use]
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }

    /// Parses the bytes back through the embedded schema.
    ///
    /// Because the envelope delegates to the schema that produced it,
    /// a round-trip within one envelope cannot be defeated by passing
    /// the wrong schema.
    pub fn parse(&self) -> BcsResult<T> {
        self.schema.parse(&self.bytes)
    }
}

impl<T, I> AsRef<[u8]> for Serialized<T, I> {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl<T, I> std::fmt::Debug for Serialized<T, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Serialized")
            .field("schema", &self.schema.name())
            .field("bytes", &self.to_hex())
            .finish()
    }
}

impl<T, I> std::fmt::LowerHex for Serialized<T, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in &self.bytes {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl<T, I> std::fmt::Display for Serialized<T, I> {
    /// Displays as `name:hex`, mirroring the debug form without the
    /// struct scaffolding.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.schema.name(), self.to_hex())
    }
}

#[cfg(feature = "serde_impls")]
impl<T, I> serde::Serialize for Serialized<T, I> {
    /// Serializes as the hex rendition of the bytes.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}
