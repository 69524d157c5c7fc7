//! # Configuration Objects
//!
//! Engines take their settings from three tiers, highest priority first:
//!
//! 1. values set explicitly on the engine through its setters,
//! 2. non-empty values returned by a configuration object ([`PbeConfig`] / [`DigesterConfig`]),
//! 3. built-in defaults (see [`defaults`]).
//!
//! Configuration objects are read exactly once, when the engine initializes. The
//! [`SimplePbeConfig`] and [`SimpleDigesterConfig`] implementations deserialize from any serde
//! format; providers and salt generators are referred to by registered name there and can be
//! attached as instances programmatically.

mod resolver;

pub(crate) use resolver::{
    ConfigResolver, DigestSettings, PbeSettings, ResolvedDigest, ResolvedPbe,
};
pub use resolver::{DigestParameters, PbeParameters};

use crate::error::CryptError;
use crate::provider::{CryptoProvider, ProviderSelector};
use crate::salt::SaltGeneratorKind;
use crate::secret::SecretBuffer;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

/// Built-in defaults, used when neither an explicit setting nor the configuration object
/// supplies a value.
pub mod defaults {
    use crate::provider::algorithms;

    pub const PBE_ALGORITHM: &str = algorithms::PBE_HMAC_SHA256_AES_256_GCM;
    pub const KEY_OBTENTION_ITERATIONS: u32 = 1000;

    pub const DIGEST_ALGORITHM: &str = algorithms::SHA_256;
    pub const DIGEST_ITERATIONS: u32 = 1000;
    pub const DIGEST_SALT_SIZE_BYTES: usize = 8;
}

/// Source of PBE settings. Every getter defaults to "not set".
pub trait PbeConfig: Send + Sync + fmt::Debug {
    fn algorithm(&self) -> Option<String> {
        None
    }

    /// # Errors
    /// [`CryptError::SecretAlreadyCleared`] if the password was handed out and cleared before.
    fn password(&self) -> Result<Option<SecretBuffer>, CryptError> {
        Ok(None)
    }

    fn key_obtention_iterations(&self) -> Option<u32> {
        None
    }

    fn salt_generator(&self) -> Option<SaltGeneratorKind> {
        None
    }

    fn provider(&self) -> Option<ProviderSelector> {
        None
    }

    /// Only consulted by pooled encryptors.
    fn pool_size(&self) -> Option<usize> {
        None
    }

    fn invert_salt_in_output(&self) -> Option<bool> {
        None
    }

    /// Called once the engine holds its own copy of the password.
    fn clear_password(&mut self) {}
}

/// Source of digest settings. Every getter defaults to "not set".
pub trait DigesterConfig: Send + Sync + fmt::Debug {
    fn algorithm(&self) -> Option<String> {
        None
    }

    fn iterations(&self) -> Option<u32> {
        None
    }

    fn salt_size_bytes(&self) -> Option<usize> {
        None
    }

    fn salt_generator(&self) -> Option<SaltGeneratorKind> {
        None
    }

    fn provider(&self) -> Option<ProviderSelector> {
        None
    }

    /// Hash `message || salt` instead of `salt || message`.
    fn invert_salt_position(&self) -> Option<bool> {
        None
    }

    /// Embed the salt after the digest instead of before it.
    fn invert_salt_in_output(&self) -> Option<bool> {
        None
    }
}

/// Plain-data [`PbeConfig`].
///
/// ```rust
/// use pbecrypt::config::SimplePbeConfig;
///
/// let config: SimplePbeConfig = serde_json::from_str(
///     r#"{ "password": "s3cr3t", "key_obtention_iterations": 2000, "salt_generator": "random" }"#,
/// ).unwrap();
/// assert_eq!(config.key_obtention_iterations, Some(2000));
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimplePbeConfig {
    pub algorithm: Option<String>,
    pub password: Option<SecretBuffer>,
    pub key_obtention_iterations: Option<u32>,
    /// Registered salt generator name.
    pub salt_generator: Option<String>,
    /// Registered provider name.
    pub provider_name: Option<String>,
    pub pool_size: Option<usize>,
    pub invert_salt_in_output: Option<bool>,
    #[serde(skip)]
    salt_generator_instance: Option<SaltGeneratorKind>,
    #[serde(skip)]
    provider_instance: Option<Arc<dyn CryptoProvider>>,
}

impl SimplePbeConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_password(mut self, password: impl Into<SecretBuffer>) -> Self {
        self.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn with_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = Some(algorithm.into());
        self
    }

    #[must_use]
    pub const fn with_key_obtention_iterations(mut self, iterations: u32) -> Self {
        self.key_obtention_iterations = Some(iterations);
        self
    }

    #[must_use]
    pub const fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = Some(pool_size);
        self
    }

    /// Takes precedence over [`SimplePbeConfig::salt_generator`].
    #[must_use]
    pub fn with_salt_generator(mut self, generator: SaltGeneratorKind) -> Self {
        self.salt_generator_instance = Some(generator);
        self
    }

    /// Takes precedence over [`SimplePbeConfig::provider_name`].
    #[must_use]
    pub fn with_provider(mut self, provider: impl CryptoProvider + 'static) -> Self {
        self.provider_instance = Some(Arc::new(provider));
        self
    }
}

impl PbeConfig for SimplePbeConfig {
    fn algorithm(&self) -> Option<String> {
        self.algorithm.clone()
    }

    fn password(&self) -> Result<Option<SecretBuffer>, CryptError> {
        match &self.password {
            Some(secret) if secret.is_cleared() => Err(CryptError::SecretAlreadyCleared),
            other => Ok(other.clone()),
        }
    }

    fn key_obtention_iterations(&self) -> Option<u32> {
        self.key_obtention_iterations
    }

    fn salt_generator(&self) -> Option<SaltGeneratorKind> {
        self.salt_generator_instance
            .clone()
            .or_else(|| self.salt_generator.clone().map(SaltGeneratorKind::Named))
    }

    fn provider(&self) -> Option<ProviderSelector> {
        self.provider_instance
            .clone()
            .map(ProviderSelector::Instance)
            .or_else(|| self.provider_name.clone().map(ProviderSelector::Named))
    }

    fn pool_size(&self) -> Option<usize> {
        self.pool_size
    }

    fn invert_salt_in_output(&self) -> Option<bool> {
        self.invert_salt_in_output
    }

    fn clear_password(&mut self) {
        if let Some(secret) = self.password.as_mut() {
            secret.clear();
        }
    }
}

/// Plain-data [`DigesterConfig`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimpleDigesterConfig {
    pub algorithm: Option<String>,
    pub iterations: Option<u32>,
    pub salt_size_bytes: Option<usize>,
    /// Registered salt generator name.
    pub salt_generator: Option<String>,
    /// Registered provider name.
    pub provider_name: Option<String>,
    pub invert_salt_position: Option<bool>,
    pub invert_salt_in_output: Option<bool>,
    #[serde(skip)]
    salt_generator_instance: Option<SaltGeneratorKind>,
    #[serde(skip)]
    provider_instance: Option<Arc<dyn CryptoProvider>>,
}

impl SimpleDigesterConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = Some(algorithm.into());
        self
    }

    #[must_use]
    pub const fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = Some(iterations);
        self
    }

    #[must_use]
    pub const fn with_salt_size_bytes(mut self, salt_size: usize) -> Self {
        self.salt_size_bytes = Some(salt_size);
        self
    }

    /// Takes precedence over [`SimpleDigesterConfig::salt_generator`].
    #[must_use]
    pub fn with_salt_generator(mut self, generator: SaltGeneratorKind) -> Self {
        self.salt_generator_instance = Some(generator);
        self
    }

    /// Takes precedence over [`SimpleDigesterConfig::provider_name`].
    #[must_use]
    pub fn with_provider(mut self, provider: impl CryptoProvider + 'static) -> Self {
        self.provider_instance = Some(Arc::new(provider));
        self
    }
}

impl DigesterConfig for SimpleDigesterConfig {
    fn algorithm(&self) -> Option<String> {
        self.algorithm.clone()
    }

    fn iterations(&self) -> Option<u32> {
        self.iterations
    }

    fn salt_size_bytes(&self) -> Option<usize> {
        self.salt_size_bytes
    }

    fn salt_generator(&self) -> Option<SaltGeneratorKind> {
        self.salt_generator_instance
            .clone()
            .or_else(|| self.salt_generator.clone().map(SaltGeneratorKind::Named))
    }

    fn provider(&self) -> Option<ProviderSelector> {
        self.provider_instance
            .clone()
            .map(ProviderSelector::Instance)
            .or_else(|| self.provider_name.clone().map(ProviderSelector::Named))
    }

    fn invert_salt_position(&self) -> Option<bool> {
        self.invert_salt_position
    }

    fn invert_salt_in_output(&self) -> Option<bool> {
        self.invert_salt_in_output
    }
}
