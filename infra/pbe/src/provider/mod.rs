//! # Cryptographic Providers
//!
//! The engines never touch block ciphers or hash functions directly. They ask a
//! [`CryptoProvider`] for a [`PbeCipher`] (password-based key derivation plus encryption) or a
//! [`MessageDigest`] by algorithm name, and only handle configuration, salts and encoding
//! themselves.
//!
//! [`RustCryptoProvider`] is registered by default under [`RUST_CRYPTO`]. Additional providers
//! are made available by name through a [`Registry`](crate::Registry), or passed to an engine
//! as an instance.

mod error;
mod rustcrypto;

pub use error::{ProviderError, ProviderErrorExt};
pub use rustcrypto::RustCryptoProvider;

use std::fmt;
use std::sync::Arc;

/// Name of the built-in provider.
pub const RUST_CRYPTO: &str = "RustCrypto";

/// Algorithm names understood by [`RustCryptoProvider`]. Lookup is case-insensitive.
pub mod algorithms {
    /// PBKDF2-HMAC-SHA256 key derivation, AES-256-GCM.
    pub const PBE_HMAC_SHA256_AES_256_GCM: &str = "PBEWithHMACSHA256AndAES_256_GCM";
    /// PBKDF2-HMAC-SHA512 key derivation, AES-256-GCM.
    pub const PBE_HMAC_SHA512_AES_256_GCM: &str = "PBEWithHMACSHA512AndAES_256_GCM";
    /// PBKDF2-HMAC-SHA256 key derivation, ChaCha20-Poly1305.
    pub const PBE_HMAC_SHA256_CHACHA20_POLY1305: &str = "PBEWithHMACSHA256AndCHACHA20_POLY1305";

    pub const MD5: &str = "MD5";
    pub const SHA_1: &str = "SHA-1";
    pub const SHA_256: &str = "SHA-256";
    pub const SHA_384: &str = "SHA-384";
    pub const SHA_512: &str = "SHA-512";
}

/// A source of password-based ciphers and message digests.
pub trait CryptoProvider: Send + Sync + fmt::Debug {
    /// Name under which the provider is registered.
    fn name(&self) -> &str;

    /// Creates a cipher instance for `algorithm`.
    ///
    /// # Errors
    /// [`ProviderError::UnsupportedAlgorithm`] if the algorithm is unknown.
    fn cipher(&self, algorithm: &str) -> Result<Box<dyn PbeCipher>, ProviderError>;

    /// Creates a digest instance for `algorithm`.
    ///
    /// # Errors
    /// [`ProviderError::UnsupportedAlgorithm`] if the algorithm is unknown.
    fn digest(&self, algorithm: &str) -> Result<Box<dyn MessageDigest>, ProviderError>;
}

/// Password-based cipher: derives a key from `(password, salt, iterations)` and runs the
/// cipher with it.
pub trait PbeCipher: Send + Sync + fmt::Debug {
    /// Salt length in bytes mandated by the algorithm.
    fn salt_size(&self) -> usize;

    /// # Errors
    /// [`ProviderError::Cipher`] if key derivation or encryption fails.
    fn encrypt(
        &self,
        password: &[u8],
        salt: &[u8],
        iterations: u32,
        plaintext: &[u8],
    ) -> Result<Vec<u8>, ProviderError>;

    /// # Errors
    /// [`ProviderError::Cipher`] if the input is malformed or does not authenticate.
    fn decrypt(
        &self,
        password: &[u8],
        salt: &[u8],
        iterations: u32,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, ProviderError>;
}

/// One-way hash function.
pub trait MessageDigest: Send + Sync + fmt::Debug {
    fn output_size(&self) -> usize;

    /// Hashes the concatenation of `parts`.
    fn digest(&self, parts: &[&[u8]]) -> Vec<u8>;
}

/// How an engine selects its provider: by registered name or by instance.
#[derive(Clone, Debug)]
pub enum ProviderSelector {
    Named(String),
    Instance(Arc<dyn CryptoProvider>),
}

impl ProviderSelector {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    #[must_use]
    pub fn instance(provider: impl CryptoProvider + 'static) -> Self {
        Self::Instance(Arc::new(provider))
    }
}

impl Default for ProviderSelector {
    fn default() -> Self {
        Self::Named(RUST_CRYPTO.to_owned())
    }
}
