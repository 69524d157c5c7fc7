use std::borrow::Cow;

/// Failures reported by providers and salt generators.
///
/// Engines never hand these to callers; see [`CryptError`](crate::CryptError).
#[pbecrypt_derive::crypt_error]
pub enum ProviderError {
    /// The provider does not implement the requested algorithm.
    #[error("Unsupported algorithm{}: {message}", format_context(.context))]
    UnsupportedAlgorithm { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Key derivation, encryption or decryption failed.
    #[error("Cipher failure{}: {message}", format_context(.context))]
    Cipher { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The operating system random source is unavailable.
    #[error("Random source failure{}: {source}", format_context(.context))]
    Random { source: getrandom::Error, context: Option<Cow<'static, str>> },

    /// A salt of the requested length cannot be produced.
    #[error("Salt generation failed{}: {message}", format_context(.context))]
    Salt { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
