//! # Secret Buffer
//!
//! Password material is held in a [`SecretBuffer`]: an owned byte buffer that can be cleared
//! explicitly and is zeroized when dropped.

use crate::error::CryptError;
use serde::{Deserialize, Deserializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// An owned, clearable password buffer.
///
/// Once [`SecretBuffer::clear`] has been called the bytes are overwritten with zeros and every
/// subsequent read fails with [`CryptError::SecretAlreadyCleared`].
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct SecretBuffer {
    bytes: Vec<u8>,
    #[zeroize(skip)]
    cleared: bool,
}

impl SecretBuffer {
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self { bytes: bytes.into(), cleared: false }
    }

    /// Returns the password bytes.
    ///
    /// # Errors
    /// [`CryptError::SecretAlreadyCleared`] after [`SecretBuffer::clear`].
    pub fn expose(&self) -> Result<&[u8], CryptError> {
        if self.cleared {
            return Err(CryptError::SecretAlreadyCleared);
        }
        Ok(&self.bytes)
    }

    /// Overwrites the password with zeros and marks the buffer as cleared. Idempotent.
    pub fn clear(&mut self) {
        self.bytes.zeroize();
        self.cleared = true;
    }

    #[must_use]
    pub const fn is_cleared(&self) -> bool {
        self.cleared
    }

    /// Returns `true` if the buffer holds no bytes. A cleared buffer is always empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for SecretBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretBuffer")
            .field("bytes", &"[REDACTED]")
            .field("cleared", &self.cleared)
            .finish()
    }
}

impl From<&str> for SecretBuffer {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl From<String> for SecretBuffer {
    fn from(value: String) -> Self {
        Self::new(value.into_bytes())
    }
}

impl From<&[u8]> for SecretBuffer {
    fn from(value: &[u8]) -> Self {
        Self::new(value)
    }
}

impl From<Vec<u8>> for SecretBuffer {
    fn from(value: Vec<u8>) -> Self {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for SecretBuffer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_is_idempotent_and_blocks_reads() {
        let mut secret = SecretBuffer::from("hunter2");
        assert_eq!(secret.expose().unwrap(), b"hunter2");

        secret.clear();
        secret.clear();

        assert!(secret.is_cleared());
        assert!(secret.is_empty());
        assert_eq!(secret.expose(), Err(CryptError::SecretAlreadyCleared));
    }

    #[test]
    fn test_clear_drops_length_of_long_password() {
        let mut secret = SecretBuffer::from(vec![0x5A; 64]);
        secret.clear();

        assert!(secret.is_empty());
        assert_eq!(secret.expose(), Err(CryptError::SecretAlreadyCleared));
    }

    #[test]
    fn test_debug_redacts_bytes() {
        let secret = SecretBuffer::from("top-secret");
        let rendered = format!("{secret:?}");
        assert!(!rendered.contains("top-secret"));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original = SecretBuffer::from("shared");
        let copy = original.clone();
        original.clear();

        assert_eq!(copy.expose().unwrap(), b"shared");
    }
}
