//! # Integer Codec
//!
//! Stores an arbitrary byte sequence as a signed arbitrary-precision integer without losing its
//! exact length.
//!
//! ```text
//! [PAYLOAD(N)][LEN(4, big-endian)]  read as one signed big-endian integer
//! ```
//!
//! Signed integer representations drop redundant leading `0x00` bytes (non-negative values)
//! and `0xFF` bytes (negative values), so the payload length cannot be recovered from the value
//! alone. The trailing length tag restores it: decoding left-pads the payload with the sign
//! byte until it is `LEN` bytes long.
//!
//! A length tag is untrusted input, so decoding refuses lengths above a ceiling instead of
//! allocating whatever the tag asks for. The ceiling is a fixed [`DEFAULT_MAX_DECODED_LEN`]
//! rather than a bound derived from available memory, and can be changed per codec with
//! [`IntegerCodec::with_limit`].

use crate::error::CryptError;
use num_bigint::{BigInt, Sign};

/// Length of the trailing length tag.
const LEN_TAG: usize = 4;

/// Default ceiling for a decoded payload (256 MiB).
pub const DEFAULT_MAX_DECODED_LEN: usize = 256 * 1024 * 1024;

/// Byte sequence ⇄ [`BigInt`] codec with a bounded decoded length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerCodec {
    max_len: usize,
}

impl Default for IntegerCodec {
    fn default() -> Self {
        Self { max_len: DEFAULT_MAX_DECODED_LEN }
    }
}

impl IntegerCodec {
    /// Creates a codec that refuses to decode payloads longer than `max_len` bytes.
    #[must_use]
    pub const fn with_limit(max_len: usize) -> Self {
        Self { max_len }
    }

    #[must_use]
    pub const fn max_len(&self) -> usize {
        self.max_len
    }

    /// Appends the length tag and reads the result as a signed big-endian integer.
    ///
    /// # Errors
    /// [`CryptError::OperationNotPossible`] if `bytes` is longer than `i32::MAX`.
    pub fn encode(&self, bytes: &[u8]) -> Result<BigInt, CryptError> {
        let len = i32::try_from(bytes.len()).map_err(|_| CryptError::OperationNotPossible)?;

        let mut tagged = Vec::with_capacity(bytes.len() + LEN_TAG);
        tagged.extend_from_slice(bytes);
        tagged.extend_from_slice(&len.to_be_bytes());

        Ok(BigInt::from_signed_bytes_be(&tagged))
    }

    /// Recovers the exact byte sequence passed to [`IntegerCodec::encode`].
    ///
    /// # Errors
    /// [`CryptError::OperationNotPossible`] if the length tag is negative, exceeds the ceiling,
    /// or is shorter than the payload actually present.
    pub fn decode(&self, value: &BigInt) -> Result<Vec<u8>, CryptError> {
        let fill = if value.sign() == Sign::Minus { 0xFF } else { 0x00 };

        let mut raw = value.to_signed_bytes_be();
        if raw.len() < LEN_TAG {
            let mut padded = vec![fill; LEN_TAG - raw.len()];
            padded.append(&mut raw);
            raw = padded;
        }

        let (payload, tag) = raw.split_at(raw.len() - LEN_TAG);
        let tag: [u8; LEN_TAG] = tag.try_into().map_err(|_| CryptError::OperationNotPossible)?;
        let expected = usize::try_from(i32::from_be_bytes(tag))
            .map_err(|_| CryptError::OperationNotPossible)?;

        if expected > self.max_len || payload.len() > expected {
            return Err(CryptError::OperationNotPossible);
        }

        let mut out = Vec::with_capacity(expected);
        out.resize(expected - payload.len(), fill);
        out.extend_from_slice(payload);
        Ok(out)
    }
}
