use super::{DigesterConfig, PbeConfig, defaults};
use crate::error::{CryptError, CryptErrorExt};
use crate::provider::{
    CryptoProvider, MessageDigest, PbeCipher, ProviderError, ProviderSelector,
};
use crate::registry::Registry;
use crate::salt::{
    FixedSaltGenerator, RandomSaltGenerator, SaltGenerator, SaltGeneratorKind, ZeroSaltGenerator,
};
use crate::secret::SecretBuffer;
use std::sync::Arc;

/// Frozen PBE settings of an initialized engine. Holds no secret material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PbeParameters {
    pub algorithm: String,
    pub key_obtention_iterations: u32,
    /// Salt length mandated by the algorithm.
    pub salt_size: usize,
    pub provider: String,
    /// Whether the salt is embedded in results at all.
    pub embeds_salt: bool,
    pub invert_salt_in_output: bool,
    pub pool_size: Option<usize>,
}

/// Frozen digest settings of an initialized engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestParameters {
    pub algorithm: String,
    /// Total number of hash passes, at least one.
    pub iterations: u32,
    pub salt_size: usize,
    pub provider: String,
    pub embeds_salt: bool,
    pub invert_salt_position: bool,
    pub invert_salt_in_output: bool,
    pub digest_size: usize,
}

/// Pending PBE configuration: explicit overrides plus an optional configuration object.
#[derive(Debug, Default)]
pub(crate) struct PbeSettings {
    pub(crate) config: Option<Box<dyn PbeConfig>>,
    pub(crate) algorithm: Option<String>,
    pub(crate) password: Option<SecretBuffer>,
    pub(crate) key_obtention_iterations: Option<u32>,
    pub(crate) salt_generator: Option<SaltGeneratorKind>,
    pub(crate) provider: Option<ProviderSelector>,
    pub(crate) pool_size: Option<usize>,
    pub(crate) invert_salt_in_output: Option<bool>,
    pub(crate) registry: Registry,
}

/// Pending digest configuration.
#[derive(Debug, Default)]
pub(crate) struct DigestSettings {
    pub(crate) config: Option<Box<dyn DigesterConfig>>,
    pub(crate) algorithm: Option<String>,
    pub(crate) iterations: Option<u32>,
    pub(crate) salt_size_bytes: Option<usize>,
    pub(crate) salt_generator: Option<SaltGeneratorKind>,
    pub(crate) provider: Option<ProviderSelector>,
    pub(crate) invert_salt_position: Option<bool>,
    pub(crate) invert_salt_in_output: Option<bool>,
    pub(crate) registry: Registry,
}

impl PbeSettings {
    /// Pool size as resolution would see it: explicit value, else the configuration object's.
    pub(crate) fn pool_size(&self) -> Option<usize> {
        self.pool_size.or_else(|| self.config.as_deref().and_then(PbeConfig::pool_size))
    }
}

pub(crate) struct ResolvedPbe {
    pub(crate) params: PbeParameters,
    pub(crate) password: SecretBuffer,
    pub(crate) salt_generator: Arc<dyn SaltGenerator>,
    pub(crate) provider: Arc<dyn CryptoProvider>,
    pub(crate) cipher: Box<dyn PbeCipher>,
}

pub(crate) struct ResolvedDigest {
    pub(crate) params: DigestParameters,
    pub(crate) salt_generator: Arc<dyn SaltGenerator>,
    pub(crate) digest: Box<dyn MessageDigest>,
}

/// Merges explicit settings, configuration objects and defaults into resolved engine state.
pub(crate) struct ConfigResolver;

impl ConfigResolver {
    /// Explicit value, else the configured one, else the default.
    pub(crate) fn pick<T>(
        explicit: Option<T>,
        configured: Option<T>,
        default: impl FnOnce() -> T,
    ) -> T {
        explicit.or(configured).unwrap_or_else(default)
    }

    /// Resolves `settings` into a ready-to-use PBE state.
    ///
    /// The password is read last, so a failed resolution leaves every pending value in place.
    /// On success the pending password is dropped and the configuration object is asked to
    /// clear its own copy.
    ///
    /// # Errors
    /// * [`CryptError::Initialization`] for a missing or empty password, zero iterations or
    ///   pool size, or an unknown provider, algorithm or salt generator.
    /// * [`CryptError::SecretAlreadyCleared`] if the configuration object's password was cleared.
    pub(crate) fn resolve_pbe(settings: &mut PbeSettings) -> Result<ResolvedPbe, CryptError> {
        let config = settings.config.as_deref();

        let algorithm = Self::pick(
            settings.algorithm.clone(),
            config.and_then(|c| non_empty(c.algorithm())),
            || defaults::PBE_ALGORITHM.to_owned(),
        );
        let iterations = Self::pick(
            settings.key_obtention_iterations,
            config.and_then(PbeConfig::key_obtention_iterations),
            || defaults::KEY_OBTENTION_ITERATIONS,
        );
        if iterations == 0 {
            return Err(CryptError::initialization("Key obtention iterations must be positive"));
        }

        let pool_size = settings.pool_size();
        if pool_size == Some(0) {
            return Err(CryptError::initialization("Pool size must be positive"));
        }

        let invert_salt_in_output = Self::pick(
            settings.invert_salt_in_output,
            config.and_then(PbeConfig::invert_salt_in_output),
            || false,
        );

        let provider = provider(
            &settings.registry,
            Self::pick(
                settings.provider.clone(),
                config.and_then(PbeConfig::provider),
                ProviderSelector::default,
            ),
        )?;
        let cipher = provider
            .cipher(&algorithm)
            .map_err(initialization)
            .context("PBE algorithm")?;

        let salt_generator = salt_generator(
            &settings.registry,
            Self::pick(
                settings.salt_generator.clone(),
                config.and_then(PbeConfig::salt_generator),
                SaltGeneratorKind::default,
            ),
            cipher.salt_size(),
        )?;

        let password = match (&settings.password, config) {
            (Some(explicit), _) => explicit.clone(),
            (None, Some(config)) => config.password()?.unwrap_or_default(),
            (None, None) => SecretBuffer::default(),
        };
        if password.expose()?.is_empty() {
            return Err(CryptError::initialization("A password must be set"));
        }

        let params = PbeParameters {
            algorithm,
            key_obtention_iterations: iterations,
            salt_size: cipher.salt_size(),
            provider: provider.name().to_owned(),
            embeds_salt: salt_generator.includes_plain_salt(),
            invert_salt_in_output,
            pool_size,
        };

        settings.password = None;
        if let Some(config) = settings.config.as_deref_mut() {
            config.clear_password();
        }

        Ok(ResolvedPbe { params, password, salt_generator, provider, cipher })
    }

    /// Resolves `settings` into a ready-to-use digest state.
    ///
    /// # Errors
    /// [`CryptError::Initialization`] for an unknown provider, algorithm or salt generator, or
    /// a fixed salt shorter than the salt size.
    pub(crate) fn resolve_digest(settings: &DigestSettings) -> Result<ResolvedDigest, CryptError> {
        let config = settings.config.as_deref();

        let algorithm = Self::pick(
            settings.algorithm.clone(),
            config.and_then(|c| non_empty(c.algorithm())),
            || defaults::DIGEST_ALGORITHM.to_owned(),
        );
        // Zero and one both mean a single pass.
        let iterations = Self::pick(
            settings.iterations,
            config.and_then(DigesterConfig::iterations),
            || defaults::DIGEST_ITERATIONS,
        )
        .max(1);
        let salt_size = Self::pick(
            settings.salt_size_bytes,
            config.and_then(DigesterConfig::salt_size_bytes),
            || defaults::DIGEST_SALT_SIZE_BYTES,
        );
        let invert_salt_position = Self::pick(
            settings.invert_salt_position,
            config.and_then(DigesterConfig::invert_salt_position),
            || false,
        );
        let invert_salt_in_output = Self::pick(
            settings.invert_salt_in_output,
            config.and_then(DigesterConfig::invert_salt_in_output),
            || false,
        );

        let provider = provider(
            &settings.registry,
            Self::pick(
                settings.provider.clone(),
                config.and_then(DigesterConfig::provider),
                ProviderSelector::default,
            ),
        )?;
        let digest = provider
            .digest(&algorithm)
            .map_err(initialization)
            .context("Digest algorithm")?;

        let salt_generator = salt_generator(
            &settings.registry,
            Self::pick(
                settings.salt_generator.clone(),
                config.and_then(DigesterConfig::salt_generator),
                SaltGeneratorKind::default,
            ),
            salt_size,
        )?;

        let params = DigestParameters {
            algorithm,
            iterations,
            salt_size,
            provider: provider.name().to_owned(),
            embeds_salt: salt_generator.includes_plain_salt() && salt_size > 0,
            invert_salt_position,
            invert_salt_in_output,
            digest_size: digest.output_size(),
        };

        Ok(ResolvedDigest { params, salt_generator, digest })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn initialization(err: ProviderError) -> CryptError {
    CryptError::initialization(err.to_string())
}

fn provider(
    registry: &Registry,
    selector: ProviderSelector,
) -> Result<Arc<dyn CryptoProvider>, CryptError> {
    match selector {
        ProviderSelector::Instance(provider) => Ok(provider),
        ProviderSelector::Named(name) => registry
            .provider(&name)
            .ok_or_else(|| CryptError::initialization(format!("Unknown provider '{name}'"))),
    }
}

/// Instantiates the generator and, for non-embedding ones, checks up front that it can
/// produce a salt of `salt_size` bytes.
fn salt_generator(
    registry: &Registry,
    kind: SaltGeneratorKind,
    salt_size: usize,
) -> Result<Arc<dyn SaltGenerator>, CryptError> {
    let generator: Arc<dyn SaltGenerator> = match kind {
        SaltGeneratorKind::Random => Arc::new(RandomSaltGenerator),
        SaltGeneratorKind::Zero => Arc::new(ZeroSaltGenerator),
        SaltGeneratorKind::Fixed(bytes) => Arc::new(FixedSaltGenerator::new(bytes)),
        SaltGeneratorKind::Custom(generator) => generator,
        SaltGeneratorKind::Named(name) => registry.salt_generator(&name).ok_or_else(|| {
            CryptError::initialization(format!("Unknown salt generator '{name}'"))
        })?,
    };

    if !generator.includes_plain_salt() {
        generator.generate_salt(salt_size).map_err(initialization).context("Salt generator")?;
    }
    Ok(generator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimplePbeConfig;

    fn settings_with(config: SimplePbeConfig) -> PbeSettings {
        PbeSettings { config: Some(Box::new(config)), ..PbeSettings::default() }
    }

    #[test]
    fn test_pick_precedence() {
        assert_eq!(ConfigResolver::pick(Some(500), Some(2000), || 1000), 500);
        assert_eq!(ConfigResolver::pick(None, Some(2000), || 1000), 2000);
        assert_eq!(ConfigResolver::pick(None, None, || 1000), 1000);
    }

    #[test]
    fn test_explicit_beats_config_beats_default() {
        let mut settings = settings_with(
            SimplePbeConfig::new().with_password("pw").with_key_obtention_iterations(2000),
        );
        let resolved = ConfigResolver::resolve_pbe(&mut settings).unwrap();
        assert_eq!(resolved.params.key_obtention_iterations, 2000);

        let mut settings = settings_with(
            SimplePbeConfig::new().with_password("pw").with_key_obtention_iterations(2000),
        );
        settings.key_obtention_iterations = Some(500);
        let resolved = ConfigResolver::resolve_pbe(&mut settings).unwrap();
        assert_eq!(resolved.params.key_obtention_iterations, 500);

        let mut settings = settings_with(SimplePbeConfig::new().with_password("pw"));
        let resolved = ConfigResolver::resolve_pbe(&mut settings).unwrap();
        assert_eq!(resolved.params.key_obtention_iterations, defaults::KEY_OBTENTION_ITERATIONS);
        assert_eq!(resolved.params.algorithm, defaults::PBE_ALGORITHM);
    }

    #[test]
    fn test_empty_config_algorithm_falls_back_to_default() {
        let mut settings =
            settings_with(SimplePbeConfig::new().with_password("pw").with_algorithm("  "));
        let resolved = ConfigResolver::resolve_pbe(&mut settings).unwrap();
        assert_eq!(resolved.params.algorithm, defaults::PBE_ALGORITHM);
    }

    #[test]
    fn test_missing_password_keeps_pending_state() {
        let mut settings =
            PbeSettings { algorithm: Some("bogus".into()), ..PbeSettings::default() };
        assert!(matches!(
            ConfigResolver::resolve_pbe(&mut settings),
            Err(CryptError::Initialization { .. })
        ));

        settings.algorithm = None;
        assert!(matches!(
            ConfigResolver::resolve_pbe(&mut settings),
            Err(CryptError::Initialization { .. })
        ));

        settings.password = Some("late".into());
        assert!(ConfigResolver::resolve_pbe(&mut settings).is_ok());
        assert!(settings.password.is_none());
    }

    #[test]
    fn test_unknown_names_fail() {
        let mut settings = PbeSettings {
            password: Some("pw".into()),
            provider: Some(ProviderSelector::named("BouncyCastle")),
            ..PbeSettings::default()
        };
        assert!(matches!(
            ConfigResolver::resolve_pbe(&mut settings),
            Err(CryptError::Initialization { .. })
        ));

        settings.provider = None;
        settings.salt_generator = Some(SaltGeneratorKind::Named("lava-lamp".into()));
        assert!(matches!(
            ConfigResolver::resolve_pbe(&mut settings),
            Err(CryptError::Initialization { .. })
        ));
    }

    #[test]
    fn test_short_fixed_salt_fails_at_resolution() {
        let settings = DigestSettings {
            salt_size_bytes: Some(8),
            salt_generator: Some(SaltGeneratorKind::Fixed(b"tiny".to_vec())),
            ..DigestSettings::default()
        };
        assert!(matches!(
            ConfigResolver::resolve_digest(&settings),
            Err(CryptError::Initialization { .. })
        ));
    }

    #[test]
    fn test_digest_iterations_floor_at_one() {
        let settings = DigestSettings { iterations: Some(0), ..DigestSettings::default() };
        let resolved = ConfigResolver::resolve_digest(&settings).unwrap();
        assert_eq!(resolved.params.iterations, 1);
        assert_eq!(resolved.params.salt_size, defaults::DIGEST_SALT_SIZE_BYTES);
        assert_eq!(resolved.params.digest_size, 32);
    }

    #[test]
    fn test_zero_pool_size_is_rejected() {
        let mut settings = PbeSettings {
            password: Some("pw".into()),
            pool_size: Some(0),
            ..PbeSettings::default()
        };
        assert!(matches!(
            ConfigResolver::resolve_pbe(&mut settings),
            Err(CryptError::Initialization { .. })
        ));
    }
}
