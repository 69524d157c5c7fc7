//! # Errors
//!
//! [`CryptError`] is the only error type that crosses the engine boundary. Failures of the
//! underlying primitives are reported by providers as
//! [`ProviderError`](crate::provider::ProviderError) and re-signaled here, either as
//! [`CryptError::Initialization`] while a configuration is being resolved, or as the opaque
//! [`CryptError::OperationNotPossible`] once the engine is running.

use std::borrow::Cow;

/// Error kinds reported by encryptors, digesters and the integer codec.
#[pbecrypt_derive::crypt_error]
#[derive(Clone, PartialEq, Eq)]
pub enum CryptError {
    /// Configuration could not be resolved (missing password, unknown algorithm, provider or
    /// salt generator, invalid counts). Fatal; reconfigure before retrying.
    #[error("Initialization error{}: {message}", format_context(.context))]
    Initialization { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A configuration mutator was called after the engine was initialized.
    #[error("Already initialized{}: {message}", format_context(.context))]
    AlreadyInitialized { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Encryption, decryption, digesting or decoding failed.
    ///
    /// Deliberately carries no cause: wrong passwords, tampered input and provider failures
    /// must be indistinguishable to the caller.
    #[error("Encryption operation not possible")]
    OperationNotPossible,

    /// Password material was read after it had been explicitly cleared.
    #[error("Password has already been cleared")]
    SecretAlreadyCleared,
}

impl CryptError {
    pub(crate) fn initialization(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Initialization { message: message.into(), context: None }
    }

    pub(crate) fn already_initialized() -> Self {
        Self::AlreadyInitialized {
            message: "Configuration cannot be modified once the engine is initialized".into(),
            context: None,
        }
    }
}
