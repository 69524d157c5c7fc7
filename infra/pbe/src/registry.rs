//! # Registry
//!
//! Explicit name lookup for providers and salt generators. A configuration that refers to
//! `"RustCrypto"` or `"random"` by name is resolved against the [`Registry`] owned by the engine,
//! never against process-wide state. Names are matched case-insensitively.

use crate::provider::{CryptoProvider, RUST_CRYPTO, RustCryptoProvider};
use crate::salt::{RandomSaltGenerator, SaltGenerator, ZeroSaltGenerator};
use fxhash::FxHashMap;
use std::fmt;
use std::sync::Arc;

/// Builds a fresh salt generator for a registered name.
pub type SaltGeneratorFactory = Arc<dyn Fn() -> Arc<dyn SaltGenerator> + Send + Sync>;

/// Name-to-instance lookup for providers and salt generators.
///
/// The default registry knows the [`RustCryptoProvider`] plus the `random` and `zero` salt
/// generators.
#[derive(Clone)]
pub struct Registry {
    providers: FxHashMap<String, Arc<dyn CryptoProvider>>,
    salt_generators: FxHashMap<String, SaltGeneratorFactory>,
}

impl Registry {
    /// Creates a registry with no entries at all.
    #[must_use]
    pub fn empty() -> Self {
        Self { providers: FxHashMap::default(), salt_generators: FxHashMap::default() }
    }

    /// Registers `provider` under its own [`CryptoProvider::name`], replacing any previous
    /// provider of that name.
    #[must_use]
    pub fn with_provider(mut self, provider: impl CryptoProvider + 'static) -> Self {
        self.register_provider(Arc::new(provider));
        self
    }

    pub fn register_provider(&mut self, provider: Arc<dyn CryptoProvider>) {
        self.providers.insert(provider.name().to_ascii_lowercase(), provider);
    }

    /// Registers a salt generator factory under `name`.
    #[must_use]
    pub fn with_salt_generator<F>(mut self, name: &str, factory: F) -> Self
    where
        F: Fn() -> Arc<dyn SaltGenerator> + Send + Sync + 'static,
    {
        self.salt_generators.insert(name.to_ascii_lowercase(), Arc::new(factory));
        self
    }

    #[must_use]
    pub fn provider(&self, name: &str) -> Option<Arc<dyn CryptoProvider>> {
        self.providers.get(&name.to_ascii_lowercase()).cloned()
    }

    #[must_use]
    pub fn salt_generator(&self, name: &str) -> Option<Arc<dyn SaltGenerator>> {
        self.salt_generators.get(&name.to_ascii_lowercase()).map(|factory| factory())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::empty()
            .with_provider(RustCryptoProvider)
            .with_salt_generator("random", || Arc::new(RandomSaltGenerator))
            .with_salt_generator("zero", || Arc::new(ZeroSaltGenerator))
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut providers: Vec<_> = self.providers.keys().collect();
        let mut salt_generators: Vec<_> = self.salt_generators.keys().collect();
        providers.sort();
        salt_generators.sort();

        f.debug_struct("Registry")
            .field("providers", &providers)
            .field("salt_generators", &salt_generators)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::salt::FixedSaltGenerator;

    #[test]
    fn test_default_registry_contents() {
        let registry = Registry::default();

        assert!(registry.provider(RUST_CRYPTO).is_some());
        assert!(registry.provider("rustcrypto").is_some());
        assert!(registry.salt_generator("Random").unwrap().includes_plain_salt());
        assert!(!registry.salt_generator("zero").unwrap().includes_plain_salt());
        assert!(registry.salt_generator("fixed").is_none());
    }

    #[test]
    fn test_custom_salt_generator_registration() {
        let registry = Registry::default()
            .with_salt_generator("pepper", || Arc::new(FixedSaltGenerator::new(*b"pepperpepper")));

        let generator = registry.salt_generator("PEPPER").unwrap();
        assert_eq!(generator.generate_salt(6).unwrap(), b"pepper");
    }

    #[test]
    fn test_empty_registry_has_nothing() {
        let registry = Registry::empty();
        assert!(registry.provider(RUST_CRYPTO).is_none());
        assert!(registry.salt_generator("random").is_none());
    }
}
