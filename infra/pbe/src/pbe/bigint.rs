use super::engine::{ByteEncryptor, StandardPbeEncryptor};
use crate::codec::IntegerCodec;
use crate::error::CryptError;
use num_bigint::BigInt;

/// Encrypts arbitrary-precision integers into arbitrary-precision integers.
///
/// The message is encrypted as its minimal signed big-endian form; the result is packed with
/// the [`IntegerCodec`] so leading `0x00` / `0xFF` bytes of the ciphertext survive.
#[derive(Debug)]
pub struct PbeBigIntEncryptor<E: ByteEncryptor = StandardPbeEncryptor> {
    encryptor: E,
    codec: IntegerCodec,
}

impl<E: ByteEncryptor> PbeBigIntEncryptor<E> {
    #[must_use]
    pub fn new(encryptor: E) -> Self {
        Self { encryptor, codec: IntegerCodec::default() }
    }

    /// Uses `codec` (and its decoded length ceiling) instead of the default one.
    #[must_use]
    pub const fn with_codec(encryptor: E, codec: IntegerCodec) -> Self {
        Self { encryptor, codec }
    }

    #[must_use]
    pub const fn encryptor(&self) -> &E {
        &self.encryptor
    }

    /// # Errors
    /// See [`StandardPbeEncryptor::encrypt`].
    pub fn encrypt(&self, message: &BigInt) -> Result<BigInt, CryptError> {
        let encrypted = self.encryptor.encrypt(&message.to_signed_bytes_be())?;
        self.codec.encode(&encrypted)
    }

    /// # Errors
    /// See [`StandardPbeEncryptor::decrypt`].
    pub fn decrypt(&self, encrypted: &BigInt) -> Result<BigInt, CryptError> {
        let bytes = self.codec.decode(encrypted)?;
        let decrypted = self.encryptor.decrypt(&bytes)?;
        Ok(BigInt::from_signed_bytes_be(&decrypted))
    }
}
