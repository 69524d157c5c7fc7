use super::engine::{ByteEncryptor, StandardPbeEncryptor};
use crate::encoding::StringOutputType;
use crate::error::CryptError;

/// Encrypts UTF-8 text into base64 or hexadecimal text.
///
/// Decryption output that is not valid UTF-8 is reported as
/// [`CryptError::OperationNotPossible`], like any other decryption failure.
#[derive(Debug)]
pub struct PbeStringEncryptor<E: ByteEncryptor = StandardPbeEncryptor> {
    encryptor: E,
    output: StringOutputType,
}

impl<E: ByteEncryptor> PbeStringEncryptor<E> {
    #[must_use]
    pub const fn new(encryptor: E, output: StringOutputType) -> Self {
        Self { encryptor, output }
    }

    /// The underlying byte encryptor, for configuration.
    #[must_use]
    pub const fn encryptor(&self) -> &E {
        &self.encryptor
    }

    #[must_use]
    pub const fn output_type(&self) -> StringOutputType {
        self.output
    }

    /// # Errors
    /// See [`StandardPbeEncryptor::encrypt`].
    pub fn encrypt(&self, message: &str) -> Result<String, CryptError> {
        let encrypted = self.encryptor.encrypt(message.as_bytes())?;
        Ok(self.output.encode(&encrypted))
    }

    /// # Errors
    /// See [`StandardPbeEncryptor::decrypt`].
    pub fn decrypt(&self, encrypted: &str) -> Result<String, CryptError> {
        let bytes = self.output.decode(encrypted.trim())?;
        let decrypted = self.encryptor.decrypt(&bytes)?;
        String::from_utf8(decrypted).map_err(|_| CryptError::OperationNotPossible)
    }
}

impl<E: ByteEncryptor + Default> Default for PbeStringEncryptor<E> {
    fn default() -> Self {
        Self::new(E::default(), StringOutputType::default())
    }
}
